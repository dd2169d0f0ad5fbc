//! # shareview-core
//!
//! Core types, traits, and the shared-image pipeline for shareview.
//!
//! This crate provides the domain model (people, shared images, groupings),
//! the raw Microsoft Graph item shape, and the pure transformation pipeline:
//!
//! ```text
//! DriveItem list -> filter_images -> map_item -> group_by_sharer -> disambiguate
//! ```
//!
//! Data providers and the selection state engine live in sibling crates and
//! depend only on the types and traits defined here.

pub mod defaults;
pub mod error;
pub mod graph;
pub mod grouping;
pub mod mapping;
pub mod models;
pub mod session;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use graph::{
    DriveItem, FileFacet, Identity, IdentitySet, ItemReference, RemoteItem, SharedFacet,
    Thumbnail, ThumbnailSet,
};
pub use grouping::{build_gallery, disambiguate, group_by_sharer, GalleryBuild};
pub use mapping::{
    filter_images, is_image_mime, map_item, map_item_at, map_items, MappedItems, MappingError,
    MappingIssue,
};
pub use models::*;
pub use session::{AccessToken, AccountInfo, Session};
pub use traits::SharedItemsProvider;
