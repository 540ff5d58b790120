// Channel navigation - pure functions over the joined-channel ordering
//
// All functions are total: any combination of current name and joined list
// yields a defined result, never a panic. Navigation operates on a snapshot
// of the joined list taken at call time; the session is single-threaded so
// the snapshot cannot be mutated mid-call.

/// Position of `current` in the joined list, if present
fn position(current: &str, joined: &[String]) -> Option<usize> {
    joined.iter().position(|name| name == current)
}

/// The next channel after `current`, wrapping circularly.
///
/// If `current` is not in the list (empty string, just-parted channel),
/// falls back to the first element. With 0 or 1 entries, returns `current`
/// unchanged - the caller treats that as nothing to do.
pub fn next(current: &str, joined: &[String]) -> String {
    if joined.len() <= 1 {
        return current.to_string();
    }
    match position(current, joined) {
        Some(idx) => joined[(idx + 1) % joined.len()].clone(),
        None => joined[0].clone(),
    }
}

/// The previous channel before `current`, wrapping circularly.
/// Same fallback rules as [`next`].
pub fn previous(current: &str, joined: &[String]) -> String {
    if joined.len() <= 1 {
        return current.to_string();
    }
    match position(current, joined) {
        Some(idx) => joined[(idx + joined.len() - 1) % joined.len()].clone(),
        None => joined[0].clone(),
    }
}

/// The channel at a zero-based position, for jump-by-number shortcuts.
/// Out-of-range indexes are a no-op for the caller, not an error.
pub fn by_index(joined: &[String], index: usize) -> Option<&str> {
    joined.get(index).map(|s| s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let joined = list(&["#a", "#b", "#c"]);
        assert_eq!(next("#b", &joined), "#c");
        assert_eq!(next("#c", &joined), "#a");
        assert_eq!(previous("#a", &joined), "#c");
        assert_eq!(previous("#b", &joined), "#a");
    }

    #[test]
    fn test_single_channel_is_identity() {
        let joined = list(&["#a"]);
        assert_eq!(next("#a", &joined), "#a");
        assert_eq!(previous("#a", &joined), "#a");
    }

    #[test]
    fn test_empty_list_is_identity() {
        let joined: Vec<String> = Vec::new();
        assert_eq!(next("#a", &joined), "#a");
        assert_eq!(previous("", &joined), "");
    }

    #[test]
    fn test_unknown_current_falls_back_to_first() {
        let joined = list(&["#a", "#b"]);
        assert_eq!(next("", &joined), "#a");
        assert_eq!(next("#gone", &joined), "#a");
        assert_eq!(previous("#gone", &joined), "#a");
    }

    #[test]
    fn test_by_index() {
        let joined = list(&["#a", "#b"]);
        assert_eq!(by_index(&joined, 0), Some("#a"));
        assert_eq!(by_index(&joined, 1), Some("#b"));
        assert_eq!(by_index(&joined, 2), None);
    }
}
