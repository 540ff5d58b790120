// Scroll state for the transcript viewport
//
// Owns offset, content size, and viewport size. Auto-follow keeps the view
// pinned to the newest line until the user scrolls up; scrolling back to the
// bottom re-engages it.

#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Line index at the top of the viewport
    offset: usize,
    total: usize,
    viewport: usize,
    pub auto_follow: bool,
}

impl ScrollState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            total: 0,
            viewport: 0,
            auto_follow: true,
        }
    }

    /// Call each render frame with current sizes
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        if self.auto_follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// Scroll up one line; the user took control, stop following
    pub fn scroll_up(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
            self.auto_follow = false;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.offset < self.max_offset() {
            self.offset += 1;
        }
        if self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
    }

    pub fn page_up(&mut self) {
        let page = self.viewport.max(1);
        self.offset = self.offset.saturating_sub(page);
        self.auto_follow = false;
    }

    pub fn page_down(&mut self) {
        let page = self.viewport.max(1);
        self.offset = (self.offset + page).min(self.max_offset());
        if self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.auto_follow = true;
    }

    /// Visible (start, end) line range
    pub fn visible_range(&self) -> (usize, usize) {
        let start = self.offset;
        let end = (self.offset + self.viewport).min(self.total);
        (start, end)
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}
