//! Item resolver abstraction layer.
//!
//! This module defines the [`ItemResolver`] trait and the item types it
//! produces.  Concrete resolvers live in sub-modules (currently only [`hn`],
//! the Hacker News Firebase API).
//!
//! ## For contributors — adding a new resolver
//!
//! 1. Create a new file in this directory (e.g. `lobsters.rs`).
//! 2. Define a struct and implement [`ItemResolver`] for it.
//! 3. Add `mod lobsters;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of [`HnClient`].
//!
//! The orchestrator, cache and UI only see `RawItem` / `DisplayItem`.

mod hn;
mod item;

pub use hn::{HnClient, DEFAULT_BASE_URL};
pub use item::{DisplayItem, ItemId, RawItem};

#[cfg(test)]
pub use item::tests::make_raw;

use anyhow::Result;
use async_trait::async_trait;

/// The upstream that ranks and resolves items.
///
/// The orchestrator calls [`top_ids()`](ItemResolver::top_ids) once per
/// request and [`item()`](ItemResolver::item) concurrently for every cache
/// miss, so implementations must be [`Send`] + [`Sync`].
///
/// ## Implementing a new resolver
///
/// ```ignore
/// pub struct MyResolver { /* client, base url */ }
///
/// #[async_trait]
/// impl ItemResolver for MyResolver {
///     fn name(&self) -> &str { "my-upstream" }
///     async fn top_ids(&self) -> Result<Vec<ItemId>> { todo!() }
///     async fn item(&self, id: ItemId) -> Result<RawItem> { todo!() }
/// }
/// ```
#[async_trait]
pub trait ItemResolver: Send + Sync {
    /// Human-readable label shown in the UI title.
    fn name(&self) -> &str;

    /// The ranked identifiers, best first.
    ///
    /// A failure here fails the whole request.
    async fn top_ids(&self) -> Result<Vec<ItemId>>;

    /// Resolve a single identifier.
    ///
    /// A failure here only costs the request this one item.
    async fn item(&self, id: ItemId) -> Result<RawItem>;
}
