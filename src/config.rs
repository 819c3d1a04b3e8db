//! Command-line configuration.
//!
//! Every flag can also be set through an `HN_TOP_*` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::FetchError;
use crate::source::DEFAULT_BASE_URL;
use crate::stories::{FetchConfig, DEFAULT_NUM_STORIES, DEFAULT_OVER_FETCH};

#[derive(Debug, Clone, Parser)]
#[command(name = "hn-top", version, about = "Live list of the top Hacker News story links")]
pub struct Config {
    /// Number of stories to show.
    #[arg(short = 'n', long, env = "HN_TOP_NUM_STORIES", default_value_t = DEFAULT_NUM_STORIES)]
    pub num_stories: usize,

    /// Candidate multiplier compensating for filtered-out items.
    #[arg(long, env = "HN_TOP_OVER_FETCH", default_value_t = DEFAULT_OVER_FETCH)]
    pub over_fetch: f64,

    /// Maximum item lookups in flight at once.
    #[arg(long, env = "HN_TOP_MAX_IN_FLIGHT", default_value_t = 32)]
    pub max_in_flight: usize,

    /// Timeout for a single item lookup, in milliseconds.
    #[arg(long, env = "HN_TOP_ITEM_TIMEOUT_MS", default_value_t = 5_000)]
    pub item_timeout_ms: u64,

    /// Deadline for a whole refresh, in milliseconds.
    #[arg(long, env = "HN_TOP_DEADLINE_MS", default_value_t = 15_000)]
    pub deadline_ms: u64,

    /// Seconds between automatic refreshes.
    #[arg(long, env = "HN_TOP_REFRESH_SECS", default_value_t = 60)]
    pub refresh_secs: u64,

    /// Base URL of the Hacker News API.
    #[arg(long, env = "HN_TOP_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Write logs to this file (the terminal UI owns the screen).
    #[arg(long, env = "HN_TOP_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Fetch one page, print it to stdout and exit.
    #[arg(long)]
    pub once: bool,
}

impl Config {
    /// Validated orchestrator settings.
    pub fn fetch_config(&self) -> Result<FetchConfig, FetchError> {
        if self.num_stories == 0 {
            return Err(FetchError::InvalidConfig("--num-stories must be at least 1".into()));
        }
        let config = FetchConfig {
            over_fetch: self.over_fetch,
            max_in_flight: self.max_in_flight,
            item_timeout: Duration::from_millis(self.item_timeout_ms),
            request_deadline: Duration::from_millis(self.deadline_ms),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}
