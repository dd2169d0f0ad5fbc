//! Core traits for shareview abstractions.
//!
//! Data providers implement [`SharedItemsProvider`]; the state engine depends
//! only on this trait, so the pipeline is identical whichever provider is
//! wired in at startup.

use async_trait::async_trait;

use crate::error::Result;
use crate::graph::DriveItem;
use crate::session::AccessToken;

/// Source of the raw "shared with me" item list.
#[async_trait]
pub trait SharedItemsProvider: Send + Sync {
    /// Short provider name for logs (e.g. `"graph"`, `"sample"`).
    fn name(&self) -> &str;

    /// Fetch every shared item visible to the token's owner.
    ///
    /// Providers may page internally; the result is the complete list in
    /// source order.
    async fn fetch_shared_items(&self, token: &AccessToken) -> Result<Vec<DriveItem>>;
}
