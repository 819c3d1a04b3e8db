//! Request-level errors.
//!
//! Only two things can fail a request outright: the ranked id list could not
//! be loaded, or the fetch settings are unusable.  Everything else (a single
//! item failing to resolve, timing out, or being filtered out) shrinks the
//! page instead of failing it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// The upstream ranked list could not be obtained.  No partial page is
    /// produced.
    #[error("failed to load top stories: {0:#}")]
    TopIds(#[source] anyhow::Error),

    #[error("invalid fetch settings: {0}")]
    InvalidConfig(String),
}
