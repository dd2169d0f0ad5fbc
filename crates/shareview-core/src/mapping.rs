//! Filtering raw drive items down to images and mapping them into the domain model.
//!
//! Both steps are pure apart from the wall-clock fallback for missing share
//! timestamps; [`map_item_at`] takes the fallback time explicitly.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::defaults::IMAGE_MIME_PREFIX;
use crate::graph::DriveItem;
use crate::models::{ImagePreview, SharedImage, Sharer};

/// Why a drive item could not become a [`SharedImage`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum MappingError {
    #[error("item has no name")]
    MissingName,

    #[error("item has no MIME type")]
    MissingMimeType,

    #[error("item is not an image ({0})")]
    NotAnImage(String),

    #[error("item has no sharer identifier or display name")]
    MissingSharer,
}

/// A skipped item and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingIssue {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    pub error: MappingError,
}

/// Result of mapping a whole listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedItems {
    pub images: Vec<SharedImage>,
    pub issues: Vec<MappingIssue>,
    /// Items dropped by the image filter (non-image or no MIME type).
    pub excluded_non_images: usize,
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with(IMAGE_MIME_PREFIX)
}

/// Keep only items whose declared MIME type is `image/*`, in input order.
pub fn filter_images(items: &[DriveItem]) -> Vec<&DriveItem> {
    items
        .iter()
        .filter(|item| item.mime_type().is_some_and(is_image_mime))
        .collect()
}

/// Map one drive item, using the current time for a missing share timestamp.
pub fn map_item(item: &DriveItem) -> Result<SharedImage, MappingError> {
    map_item_at(item, Utc::now())
}

/// Map one drive item, using `now` for a missing share timestamp.
pub fn map_item_at(item: &DriveItem, now: DateTime<Utc>) -> Result<SharedImage, MappingError> {
    let name = item.effective_name().ok_or(MappingError::MissingName)?;

    let mime_type = item.mime_type().ok_or(MappingError::MissingMimeType)?;
    if !is_image_mime(mime_type) {
        return Err(MappingError::NotAnImage(mime_type.to_string()));
    }

    let shared_by = resolve_sharer(item).ok_or(MappingError::MissingSharer)?;

    let (date_shared, date_shared_defaulted) = match item.shared_date_time() {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => (parsed.with_timezone(&Utc), false),
            Err(e) => {
                warn!(
                    item_id = %item.id,
                    raw,
                    error = %e,
                    "Unparseable share timestamp, substituting current time"
                );
                (now, true)
            }
        },
        None => {
            warn!(item_id = %item.id, "Missing share timestamp, substituting current time");
            (now, true)
        }
    };

    Ok(SharedImage {
        id: item.id.clone(),
        name: name.to_string(),
        mime_type: mime_type.to_string(),
        shared_by,
        preview: ImagePreview {
            thumbnail_url: item.medium_thumbnail_url().map(str::to_string),
        },
        date_shared,
        date_shared_defaulted,
        web_url: item.effective_web_url().map(str::to_string),
    })
}

/// Email first, then account id; a missing display name falls back to the
/// identifier. `None` when neither identifier nor display name is present.
fn resolve_sharer(item: &DriveItem) -> Option<Sharer> {
    let user = item.sharer()?;
    let clean = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let identifier = clean(&user.email).or_else(|| clean(&user.id));
    let display_name = clean(&user.display_name);

    match (identifier, display_name) {
        (None, None) => None,
        (Some(identifier), None) => Some(Sharer {
            display_name: identifier.clone(),
            identifier,
        }),
        (identifier, Some(display_name)) => Some(Sharer {
            display_name,
            identifier: identifier.unwrap_or_default(),
        }),
    }
}

/// Filter then map a listing, collecting per-item failures instead of failing.
pub fn map_items(items: &[DriveItem]) -> MappedItems {
    let now = Utc::now();
    let candidates = filter_images(items);
    let excluded_non_images = items.len() - candidates.len();

    let mut images = Vec::with_capacity(candidates.len());
    let mut issues = Vec::new();

    for item in candidates {
        match map_item_at(item, now) {
            Ok(image) => {
                trace!(item_id = %image.id, sharer = %image.shared_by.identifier, "Mapped image");
                images.push(image);
            }
            Err(error) => {
                warn!(item_id = %item.id, error = %error, "Skipping shared item");
                issues.push(MappingIssue {
                    item_id: item.id.clone(),
                    item_name: item.effective_name().map(str::to_string),
                    error,
                });
            }
        }
    }

    debug!(
        item_count = items.len(),
        image_count = images.len(),
        skipped_count = issues.len(),
        excluded_non_images,
        "Mapped shared items"
    );

    MappedItems {
        images,
        issues,
        excluded_non_images,
    }
}
