//! Domain models for images shared with the signed-in user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults::{PLACEHOLDER_LABEL, PLACEHOLDER_MAX_LEN};

// =============================================================================
// PEOPLE
// =============================================================================

/// Snapshot of the sharer taken when an image is mapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sharer {
    pub display_name: String,
    /// Stable key: email when known, otherwise the account id. May be empty
    /// when the source only provided a display name.
    pub identifier: String,
}

/// A person who shared one or more images.
///
/// Two `Person` values with the same `identifier` are the same sharer even if
/// their display names differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub identifier: String,
    pub display_name: String,
    pub image_count: usize,
}

impl Person {
    /// Whether this person is the sharer recorded on `image`.
    pub fn shared(&self, image: &SharedImage) -> bool {
        image.shared_by.identifier == self.identifier
    }
}

// =============================================================================
// IMAGES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePreview {
    /// `None` when the source had no medium thumbnail.
    pub thumbnail_url: Option<String>,
}

/// One shared file known to be an image.
///
/// Only built by [`crate::mapping::map_item`], which guarantees `mime_type`
/// starts with `image/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedImage {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub shared_by: Sharer,
    pub preview: ImagePreview,
    pub date_shared: DateTime<Utc>,
    /// True when `date_shared` is the mapping time because the source had no
    /// usable share timestamp.
    #[serde(default)]
    pub date_shared_defaulted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

impl SharedImage {
    pub fn has_thumbnail(&self) -> bool {
        self.preview.thumbnail_url.is_some()
    }
}

// =============================================================================
// GROUPINGS
// =============================================================================

/// One sharer and the images they shared, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleGrouping {
    pub person: Person,
    pub images: Vec<SharedImage>,
}

// =============================================================================
// GALLERY VIEW MODEL
// =============================================================================

/// Render-ready view of a [`SharedImage`].
///
/// Always derived from the current image list, never edited on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub image: SharedImage,
    pub alt_text: String,
    pub has_thumbnail: bool,
    /// Short label shown in place of a missing thumbnail (e.g. `"JPG"`).
    pub placeholder: String,
}

impl GalleryItem {
    pub fn from_image(image: &SharedImage) -> Self {
        Self {
            alt_text: format!("{} shared by {}", image.name, image.shared_by.display_name),
            has_thumbnail: image.has_thumbnail(),
            placeholder: placeholder_label(&image.name),
            image: image.clone(),
        }
    }

    /// Derive gallery items for a whole image list, preserving order.
    pub fn from_images(images: &[SharedImage]) -> Vec<Self> {
        images.iter().map(Self::from_image).collect()
    }
}

/// Upper-cased file extension, or a generic label when there is none.
fn placeholder_label(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= PLACEHOLDER_MAX_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_uppercase()
        }
        _ => PLACEHOLDER_LABEL.to_string(),
    }
}
