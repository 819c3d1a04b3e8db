use std::time::Duration;

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::source::DisplayItem;
use crate::stories::StoryPage;

pub struct App {
    /// Current page, ascending by id.
    pub stories: Vec<DisplayItem>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last poll status message.
    pub status: String,
    /// Title shown on the list border.
    pub title: String,
    /// Entries in the shared cache after the last page.
    pub cached: usize,
    /// When the current page was produced.
    pub fetched_at: Option<DateTime<Utc>>,
    refresh_requested: bool,
}

impl App {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            stories: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            title: title.into(),
            cached: 0,
            fetched_at: None,
            refresh_requested: false,
        }
    }

    /// Replace the list with a freshly fetched page.
    ///
    /// The selection is kept where it was, clamped to the new length.
    pub fn apply_page(&mut self, page: StoryPage) {
        self.status = format!(
            "Fetched {} stories in {}",
            page.stories.len(),
            format_elapsed(page.elapsed)
        );
        self.fetched_at = Some(page.fetched_at);
        self.stories = page.stories;

        let selected = match (self.list_state.selected(), self.stories.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => None,
        };
        self.list_state.select(selected);
    }

    /// Record a failed fetch.  The current page stays visible.
    pub fn apply_error(&mut self, message: &str) {
        self.status = format!("Error: {message}");
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
        self.status = "Refreshing…".into();
    }

    /// Returns whether a refresh was requested since the last call.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.stories.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.stories.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.stories.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.stories.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.stories.is_empty() {
            self.list_state.select(Some(self.stories.len() - 1));
        }
    }
}

/// `412ms` below a second, `1.3s` above.
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::source::make_raw;
    use crate::stories::FetchStats;

    pub fn make_page(ids: &[u64], elapsed: Duration) -> StoryPage {
        StoryPage {
            stories: ids
                .iter()
                .map(|&id| DisplayItem::from_raw(make_raw(id, "story", Some("https://www.example.com/a"))))
                .collect(),
            elapsed,
            fetched_at: Utc::now(),
            stats: FetchStats::default(),
        }
    }

    fn app_with_three() -> App {
        let mut app = App::new("test");
        app.apply_page(make_page(&[1, 2, 3], Duration::from_millis(5)));
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new("test");
        assert!(app.stories.is_empty());
        assert!(!app.quit);
        assert!(app.list_state.selected().is_none());
        assert!(app.fetched_at.is_none());
    }

    // -- pages ---------------------------------------------------------------

    #[test]
    fn apply_page_replaces_stories_and_reports_latency() {
        let mut app = App::new("test");
        app.apply_page(make_page(&[1, 2, 3], Duration::from_millis(412)));
        assert_eq!(app.stories.len(), 3);
        assert_eq!(app.status, "Fetched 3 stories in 412ms");
        assert!(app.fetched_at.is_some());

        app.apply_page(make_page(&[4], Duration::from_millis(1500)));
        assert_eq!(app.stories.len(), 1);
        assert_eq!(app.stories[0].id(), 4);
        assert_eq!(app.status, "Fetched 1 stories in 1.5s");
    }

    #[test]
    fn apply_page_clamps_selection() {
        let mut app = app_with_three();
        app.select_last();
        app.apply_page(make_page(&[7, 8], Duration::ZERO));
        assert_eq!(app.list_state.selected(), Some(1));

        app.apply_page(make_page(&[], Duration::ZERO));
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn apply_error_keeps_current_page() {
        let mut app = app_with_three();
        app.apply_error("failed to load top stories: timeout");
        assert_eq!(app.stories.len(), 3);
        assert!(app.status.starts_with("Error: failed to load"));
    }

    #[test]
    fn refresh_request_is_taken_once() {
        let mut app = App::new("test");
        assert!(!app.take_refresh_request());
        app.request_refresh();
        assert!(app.take_refresh_request());
        assert!(!app.take_refresh_request());
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new("test");
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_advances() {
        let mut app = app_with_three();

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(0));

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_next_clamps_at_last_item() {
        let mut app = app_with_three();
        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = app_with_three();
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn select_previous_moves_up() {
        let mut app = app_with_three();
        app.select_last(); // index 2
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn select_first_jumps_to_zero() {
        let mut app = app_with_three();
        app.select_last();
        app.select_first();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn format_elapsed_switches_units() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "0ms");
        assert_eq!(format_elapsed(Duration::from_millis(999)), "999ms");
        assert_eq!(format_elapsed(Duration::from_millis(2300)), "2.3s");
    }
}
