//! Application launcher state: filtering, result limit and keyboard selection.

use std::sync::LazyLock;

use regex::Regex;

static FIELD_CODES: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r" ?%[a-zA-Z]").ok());

/// One launchable application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// Desktop file id, e.g. `firefox.desktop`
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    /// Raw `Exec` line
    pub command: Option<String>,
}

/// Strip desktop-entry field codes (`%f`, `%U`, ...) from an `Exec` line.
#[must_use]
pub fn clean_exec(exec: &str) -> String {
    match FIELD_CODES.as_ref() {
        Some(codes) => codes.replace_all(exec, "").trim().to_string(),
        None => exec.trim().to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LauncherState {
    entries: Vec<AppEntry>,
    query: String,
    max_results: usize,
    selected: Option<usize>,
}

impl LauncherState {
    #[must_use]
    pub fn new(max_results: usize) -> Self {
        Self {
            entries: Vec::new(),
            query: String::new(),
            max_results,
            selected: None,
        }
    }

    /// Replace the indexed applications. Entries are kept sorted by name.
    pub fn set_entries(&mut self, mut entries: Vec<AppEntry>) {
        entries.sort_by_key(|entry| entry.name.to_lowercase());
        self.entries = entries;
        self.selected = None;
    }

    #[must_use]
    pub fn entries(&self) -> &[AppEntry] {
        &self.entries
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_string();
            self.selected = None;
        }
    }

    /// Clear the query. Returns `true` if there was anything to clear.
    pub fn clear_query(&mut self) -> bool {
        if self.query.is_empty() {
            return false;
        }
        self.set_query("");
        true
    }

    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn set_max_results(&mut self, max_results: usize) {
        self.max_results = max_results;
        if self.selected.is_some_and(|i| i >= max_results) {
            self.selected = None;
        }
    }

    /// Entries matching the query (case-insensitive substring of the name),
    /// limited to `max_results`.
    #[must_use]
    pub fn visible(&self) -> Vec<&AppEntry> {
        let needle = self.query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
            .take(self.max_results)
            .collect()
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Move the selection down. With nothing selected the first entry is picked.
    pub fn select_next(&mut self) -> Option<usize> {
        let last = self.visible().len().checked_sub(1)?;
        self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
        self.selected
    }

    /// Move the selection up. With nothing selected the last entry is picked.
    pub fn select_previous(&mut self) -> Option<usize> {
        let last = self.visible().len().checked_sub(1)?;
        self.selected = Some(self.selected.map_or(last, |i| i.saturating_sub(1)));
        self.selected
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|i| *i < self.visible().len());
    }

    /// Entry to launch on Enter: the selection, or the first visible entry.
    #[must_use]
    pub fn activation_target(&self) -> Option<&AppEntry> {
        let visible = self.visible();
        let index = self.selected.unwrap_or(0);
        visible.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> AppEntry {
        AppEntry {
            id: format!("{}.desktop", name.to_lowercase()),
            name: name.to_string(),
            icon: None,
            command: Some(name.to_lowercase()),
        }
    }

    fn state(names: &[&str], max_results: usize) -> LauncherState {
        let mut state = LauncherState::new(max_results);
        state.set_entries(names.iter().map(|n| entry(n)).collect());
        state
    }

    fn visible_names(state: &LauncherState) -> Vec<&str> {
        state.visible().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_clean_exec_strips_field_codes() {
        assert_eq!(clean_exec("firefox %u"), "firefox");
        assert_eq!(clean_exec("code --new-window %F"), "code --new-window");
        assert_eq!(clean_exec("gimp-2.10 %U --no-splash"), "gimp-2.10 --no-splash");
        assert_eq!(clean_exec("htop"), "htop");
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut s = state(&["Firefox", "Files", "Terminal"], 10);
        s.set_query("FI");
        assert_eq!(visible_names(&s), vec!["Files", "Firefox"]);
        s.set_query("minal");
        assert_eq!(visible_names(&s), vec!["Terminal"]);
    }

    #[test]
    fn test_empty_query_lists_everything_up_to_limit() {
        let s = state(&["a", "b", "c", "d"], 3);
        assert_eq!(s.visible().len(), 3);
    }

    #[test]
    fn test_set_max_results_applies_immediately() {
        let mut s = state(&["a", "b", "c", "d"], 3);
        s.set_max_results(1);
        assert_eq!(s.visible().len(), 1);
    }

    #[test]
    fn test_selection_navigation() {
        let mut s = state(&["a", "b", "c"], 10);
        assert_eq!(s.select_previous(), Some(2));

        s.select(None);
        assert_eq!(s.select_next(), Some(0));
        assert_eq!(s.select_next(), Some(1));
        assert_eq!(s.select_next(), Some(2));
        assert_eq!(s.select_next(), Some(2));
        assert_eq!(s.select_previous(), Some(1));
    }

    #[test]
    fn test_navigation_on_empty_results() {
        let mut s = state(&["a"], 10);
        s.set_query("zzz");
        assert_eq!(s.select_next(), None);
        assert!(s.activation_target().is_none());
    }

    #[test]
    fn test_activation_target_defaults_to_first() {
        let mut s = state(&["Beta", "Alpha"], 10);
        assert_eq!(s.activation_target().unwrap().name, "Alpha");
        s.select_next();
        s.select_next();
        assert_eq!(s.activation_target().unwrap().name, "Beta");
    }

    #[test]
    fn test_query_change_resets_selection() {
        let mut s = state(&["a", "b"], 10);
        s.select_next();
        s.set_query("b");
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_clear_query_reports_whether_anything_changed() {
        let mut s = state(&["a"], 10);
        assert!(!s.clear_query());
        s.set_query("a");
        assert!(s.clear_query());
        assert_eq!(s.query(), "");
    }
}
