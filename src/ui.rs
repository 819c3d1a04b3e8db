//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching business logic.
//!
//! ## For contributors
//!
//! * The layout is a two-row split: a scrollable story list on top and a
//!   one-line status bar at the bottom.
//! * [`story_line`] and [`plain_line`] share the same fields; keep them in
//!   step when adding a column.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::source::DisplayItem;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_story_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

/// Render the scrollable story list.
fn draw_story_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let now = Utc::now();
    let list_items: Vec<ListItem> = app
        .stories
        .iter()
        .enumerate()
        .map(|(i, story)| ListItem::new(story_line(i + 1, story, now)))
        .collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(format!(" {} ", app.title))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// One styled row: rank, title, host, then score / author / age.
fn story_line(rank: usize, story: &DisplayItem, now: DateTime<Utc>) -> Line<'_> {
    let mut spans = vec![
        Span::styled(format!("{rank:>3}. "), Style::default().fg(Color::DarkGray)),
        Span::styled(story.title(), Style::default().fg(Color::White)),
    ];
    if !story.host.is_empty() {
        spans.push(Span::styled(
            format!(" ({})", story.host),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::styled(
        format!("  {}", byline(story, now)),
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let updated = app
        .fetched_at
        .map(|t| format!("updated {}", t.format("%H:%M:%S")))
        .unwrap_or_else(|| "not loaded".into());

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(updated, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(
            format!("{} cached", app.cached),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  r: refresh  ↑/↓: scroll  Home/End: jump"),
    ]));
    frame.render_widget(status, area);
}

/// `"123 points by pg 3h ago | 40 comments"`; missing parts are left out.
pub fn byline(story: &DisplayItem, now: DateTime<Utc>) -> String {
    let mut parts = Vec::new();
    if let Some(score) = story.item.score {
        parts.push(format!("{score} points"));
    }
    if let Some(by) = &story.item.by {
        parts.push(format!("by {by}"));
    }
    if let Some(time) = story.item.time {
        parts.push(age(time, now));
    }
    let mut line = parts.join(" ");
    if let Some(comments) = story.item.descendants {
        if !line.is_empty() {
            line.push_str(" | ");
        }
        line.push_str(&format!("{comments} comments"));
    }
    line
}

/// Coarse relative age: `just now`, `5m ago`, `3h ago`, `2d ago`.
pub fn age(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - time).num_seconds();
    match secs {
        s if s < 60 => "just now".into(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

/// Unstyled row for `--once` output.
pub fn plain_line(rank: usize, story: &DisplayItem, now: DateTime<Utc>) -> String {
    let mut line = format!("{rank:>3}. {}", story.title());
    if !story.host.is_empty() {
        line.push_str(&format!(" ({})", story.host));
    }
    let byline = byline(story, now);
    if !byline.is_empty() {
        line.push_str("  ");
        line.push_str(&byline);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::make_page;
    use crate::source::make_raw;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn full_story() -> DisplayItem {
        let mut raw = make_raw(1, "story", Some("https://www.example.com/post"));
        raw.title = Some("A post".into());
        raw.score = Some(42);
        raw.by = Some("pg".into());
        raw.time = Some(now() - ChronoDuration::hours(3));
        DisplayItem::from_raw(raw)
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[test]
    fn age_buckets() {
        let n = now();
        assert_eq!(age(n, n), "just now");
        assert_eq!(age(n - ChronoDuration::minutes(5), n), "5m ago");
        assert_eq!(age(n - ChronoDuration::hours(3), n), "3h ago");
        assert_eq!(age(n - ChronoDuration::days(2), n), "2d ago");
    }

    #[test]
    fn byline_includes_known_parts() {
        assert_eq!(byline(&full_story(), now()), "42 points by pg 3h ago");

        let bare = DisplayItem::from_raw(make_raw(2, "story", None));
        assert_eq!(byline(&bare, now()), "");

        let mut raw = make_raw(3, "story", None);
        raw.descendants = Some(7);
        assert_eq!(byline(&DisplayItem::from_raw(raw.clone()), now()), "7 comments");
        raw.score = Some(1);
        assert_eq!(byline(&DisplayItem::from_raw(raw), now()), "1 points | 7 comments");
    }

    #[test]
    fn plain_line_shows_rank_title_and_host() {
        assert_eq!(
            plain_line(1, &full_story(), now()),
            "  1. A post (example.com)  42 points by pg 3h ago"
        );
    }

    #[test]
    fn plain_line_omits_empty_host() {
        let mut raw = make_raw(3, "story", Some("::::"));
        raw.title = Some("Odd link".into());
        let story = DisplayItem::from_raw(raw);
        assert_eq!(plain_line(12, &story, now()), " 12. Odd link");
    }

    // -- rendering (smoke tests) ---------------------------------------------

    #[test]
    fn draw_does_not_panic_with_no_stories() {
        let mut app = App::new("Hacker News");
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();
    }

    #[test]
    fn draw_shows_titles_hosts_and_status() {
        let mut app = App::new("Hacker News");
        app.apply_page(make_page(&[1, 2, 3], Duration::from_millis(250)));
        app.cached = 3;
        app.select_first();

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Hacker News"));
        assert!(text.contains("Item 1"));
        assert!(text.contains("(example.com)"));
        assert!(text.contains("Fetched 3 stories in 250ms"));
        assert!(text.contains("3 cached"));
        assert!(text.contains("updated "));
    }
}
