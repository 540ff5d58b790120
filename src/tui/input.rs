// Single-line input editor
//
// Cursor position is a character index, not a byte index, so multi-byte
// input behaves. Rendering uses display width to place the terminal cursor
// correctly for wide glyphs.

use unicode_width::UnicodeWidthStr;

#[derive(Debug, Default, Clone)]
pub struct InputLine {
    text: String,
    /// Character index of the cursor (0..=char count)
    cursor: usize,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Columns from the left edge to the cursor, for terminal cursor placement
    pub fn cursor_column(&self) -> u16 {
        let prefix: String = self.text.chars().take(self.cursor).collect();
        prefix.width() as u16
    }

    pub fn insert(&mut self, c: char) {
        let byte_idx = self.byte_index(self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_index(self.cursor - 1);
        let end = self.byte_index(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.char_count() {
            return;
        }
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Ctrl+U
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Take the line for submission and reset the editor
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> InputLine {
        let mut input = InputLine::new();
        for c in s.chars() {
            input.insert(c);
        }
        input
    }

    #[test]
    fn test_insert_and_take() {
        let mut input = typed("hello");
        assert_eq!(input.text(), "hello");
        assert_eq!(input.take(), "hello");
        assert!(input.is_empty());
        assert_eq!(input.cursor_column(), 0);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut input = typed("hllo");
        input.move_home();
        input.move_right();
        input.insert('e');
        assert_eq!(input.text(), "hello");
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut input = typed("naïve");
        input.move_left();
        input.move_left();
        input.backspace(); // removes the ï
        assert_eq!(input.text(), "nave");
    }

    #[test]
    fn test_delete_at_cursor() {
        let mut input = typed("abc");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "bc");
    }

    #[test]
    fn test_cursor_column_counts_wide_chars() {
        let input = typed("日本");
        // Two double-width glyphs
        assert_eq!(input.cursor_column(), 4);
    }

    #[test]
    fn test_clear() {
        let mut input = typed("something");
        input.clear();
        assert!(input.is_empty());
        input.insert('x');
        assert_eq!(input.text(), "x");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = typed("ab");
        input.move_right(); // already at end
        assert_eq!(input.cursor_column(), 2);
        input.move_home();
        input.move_left(); // already at start
        assert_eq!(input.cursor_column(), 0);
    }
}
