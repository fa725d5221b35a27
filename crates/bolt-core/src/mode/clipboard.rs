use std::collections::VecDeque;

/// Maximum number of remembered clipboard entries.
pub const HISTORY_LIMIT: usize = 100;

/// Clipboard text history, newest first.
#[derive(Debug, Clone, Default)]
pub struct ClipboardHistory {
    entries: VecDeque<String>,
}

impl ClipboardHistory {
    /// Record new clipboard text. Empty text and a repeat of the newest entry
    /// are ignored. Returns `true` if the history changed.
    pub fn push(&mut self, text: &str) -> bool {
        if text.is_empty() || self.entries.front().is_some_and(|newest| newest == text) {
            return false;
        }

        self.entries.push_front(text.to_string());
        self.entries.truncate(HISTORY_LIMIT);
        true
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Entries containing `query`, case-insensitively. A blank query matches all.
    #[must_use]
    pub fn filtered(&self, query: &str) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        self.entries()
            .filter(|entry| needle.is_empty() || entry.to_lowercase().contains(&needle))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut history = ClipboardHistory::default();
        history.push("one");
        history.push("two");
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["two", "one"]);
    }

    #[test]
    fn test_consecutive_duplicate_skipped() {
        let mut history = ClipboardHistory::default();
        assert!(history.push("same"));
        assert!(!history.push("same"));
        assert!(history.push("other"));
        assert!(history.push("same"));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_empty_text_ignored() {
        let mut history = ClipboardHistory::default();
        assert!(!history.push(""));
        assert!(history.is_empty());
    }

    #[test]
    fn test_capped_at_limit() {
        let mut history = ClipboardHistory::default();
        for i in 0..(HISTORY_LIMIT + 20) {
            history.push(&format!("entry {i}"));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(
            history.entries().next(),
            Some(format!("entry {}", HISTORY_LIMIT + 19).as_str())
        );
    }

    #[test]
    fn test_filter_case_insensitive() {
        let mut history = ClipboardHistory::default();
        history.push("Hello World");
        history.push("goodbye");
        assert_eq!(history.filtered("WORLD"), vec!["Hello World"]);
        assert_eq!(history.filtered("").len(), 2);
    }
}
