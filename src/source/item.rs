//! The item types shared between the resolver and the rest of the
//! application.
//!
//! [`RawItem`] is what the upstream API hands back for a single identifier.
//! [`DisplayItem`] is a `RawItem` enriched with the host of its link, ready
//! to be cached and rendered.
//!
//! ## For contributors
//!
//! If you are adding a new resolver you do **not** need to modify this file
//! unless the new upstream exposes extra fields the UI should show.  Just
//! produce `RawItem` values from your resolver's `item()` implementation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use url::Url;

/// Identifier assigned by the upstream ranking source.
pub type ItemId = u64;

/// The only category that is ever displayed.
pub const STORY: &str = "story";

/// A single upstream item, as resolved from its identifier.
///
/// Fields not listed here are ignored during decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawItem {
    /// Upstream identifier; also the sort key for results.
    pub id: ItemId,

    /// Category tag: `"story"`, `"comment"`, `"job"`, `"poll"`, ...
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Target link.  Ask HN / Show HN text posts have none.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Author's username.
    #[serde(default)]
    pub by: Option<String>,

    #[serde(default)]
    pub score: Option<i64>,

    /// Total comment count.
    #[serde(default)]
    pub descendants: Option<i64>,

    /// Creation time, sent as unix seconds.
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub time: Option<DateTime<Utc>>,

    /// Body of text posts (HTML).
    #[serde(default)]
    pub text: Option<String>,

    /// Flagged or killed by moderation.
    #[serde(default)]
    pub dead: bool,

    #[serde(default)]
    pub deleted: bool,
}

impl RawItem {
    /// Whether this item qualifies for display: a story with a non-empty
    /// link.
    pub fn is_story_link(&self) -> bool {
        self.kind == STORY && self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// A resolved item plus the normalised host of its link.
///
/// Built once per identifier by [`DisplayItem::from_raw`] and never mutated
/// afterwards, so cached copies can be handed out freely.
///
/// ## Sorting
///
/// `DisplayItem` implements [`Ord`] by identifier, ascending.  Results are
/// sorted with it after concurrent collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub item: RawItem,

    /// Hostname of the link without a leading `www.`; empty when the link is
    /// missing or does not parse.
    pub host: String,
}

impl DisplayItem {
    pub fn from_raw(item: RawItem) -> Self {
        let host = item.url.as_deref().map(derive_host).unwrap_or_default();
        Self { item, host }
    }

    pub fn id(&self) -> ItemId {
        self.item.id
    }

    pub fn is_eligible(&self) -> bool {
        self.item.is_story_link()
    }

    pub fn title(&self) -> &str {
        self.item.title.as_deref().unwrap_or("(untitled)")
    }
}

/// Derive the display host of a link.
///
/// Only a literal leading `www.` label is stripped; other subdomains are
/// kept.  A link that fails to parse, or has no host, yields `""`.
///
/// The host comes back in the parser's canonical form: lowercased, with
/// internationalised names in punycode.  IPv6 literals lose their brackets.
pub fn derive_host(link: &str) -> String {
    let Ok(parsed) = Url::parse(link) else {
        return String::new();
    };
    let host = parsed.host_str().unwrap_or_default();
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

// ---------------------------------------------------------------------------
// Ordering — ascending by identifier
// ---------------------------------------------------------------------------

impl Ord for DisplayItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl PartialOrd for DisplayItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
