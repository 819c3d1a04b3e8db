//! hn-top — a live list of the top Hacker News story links for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ fetch() ┌────────────┐  PollMsg   ┌──────────┐  draw()  ┌──────────┐
//! │ source/   │ ◄────── │ stories.rs │ ◄───────── │ poll.rs  │ ───────► │  app.rs  │ ──► ui.rs
//! │ (HN API)  │         │ + cache.rs │  (task)    │ (timer)  │ (channel)│ (state)  │
//! └───────────┘         └────────────┘            └──────────┘          └──────────┘
//!                                                                            ▲
//!                                                       handle_key_event()   │
//!                                                                       ┌──────────┐
//!                                                                       │ input.rs │
//!                                                                       └──────────┘
//! ```
//!
//! * **`source/`** — the `ItemResolver` trait, the item types, and the Hacker
//!   News API client.
//! * **`stories`** — concurrent fetch of one page: windowing, cache lookups,
//!   bounded resolution, sorting.
//! * **`cache`** — the story cache shared by every refresh.
//! * **`poll`** — background task that refreshes on a timer or on request.
//! * **`app`** — owns all UI state (stories, scroll position, status).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`config`** / **`logging`** — flags and tracing setup.
//! * **`main`** — wires everything together and runs the event loop.

mod app;
mod cache;
mod config;
mod error;
mod input;
mod logging;
mod poll;
mod source;
mod stories;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::{format_elapsed, App};
use cache::StoryCache;
use config::Config;
use poll::PollMsg;
use source::{HnClient, ItemResolver};
use stories::TopStories;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    logging::initialize_logging(&config)?;

    // -- wire the fetch pipeline ---------------------------------------------
    let fetch_config = config.fetch_config()?;
    let resolver: Arc<dyn ItemResolver> = Arc::new(HnClient::new(&config.api_url)?);
    let stories = Arc::new(TopStories::new(resolver, StoryCache::new(), fetch_config));
    info!(api = %config.api_url, num_stories = config.num_stories, "starting");

    if config.once {
        return print_once(&stories, config.num_stories).await;
    }

    install_panic_hook();

    // -- start background polling --------------------------------------------
    let (mut rx, refresh) = poll::spawn(
        Arc::clone(&stories),
        config.num_stories,
        config.refresh_interval(),
    );

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(format!("{} — top {}", stories.source_name(), config.num_stories));

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any messages from the poller.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process poll messages
        while let Ok(msg) = rx.try_recv() {
            match msg {
                PollMsg::Page(page) => app.apply_page(page),
                PollMsg::Error(e) => app.apply_error(&e),
            }
            app.cached = stories.cache().len();
        }

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.take_refresh_request() {
            refresh.request();
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

/// Fetch a single page and print it as plain text.
///
/// A failed id list is returned as an error; nothing is printed.
async fn print_once(stories: &TopStories, requested: usize) -> Result<()> {
    let page = stories.fetch(requested).await?;
    let now = Utc::now();
    for (i, story) in page.stories.iter().enumerate() {
        println!("{}", ui::plain_line(i + 1, story, now));
        if let Some(url) = &story.item.url {
            println!("     {url}");
        }
    }
    println!(
        "\n{} stories in {}",
        page.stories.len(),
        format_elapsed(page.elapsed)
    );
    Ok(())
}
