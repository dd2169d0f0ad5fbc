//! Raw Microsoft Graph `driveItem` shape as returned by the shared-with-me listing.
//!
//! Only the facets the pipeline reads are modeled; unknown fields are ignored
//! on deserialization. Items shared from another drive carry their `file` and
//! `shared` facets on `remoteItem` instead of the top level, so the accessors
//! below resolve the top-level facet first and fall back to the remote one.

use serde::{Deserialize, Serialize};

/// A shared drive item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<SharedFacet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thumbnails: Vec<ThumbnailSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_reference: Option<ItemReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_item: Option<RemoteItem>,
}

/// The `remoteItem` facet: the item as it exists on the sharer's drive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<SharedFacet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thumbnails: Vec<ThumbnailSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_reference: Option<ItemReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFacet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<IdentitySet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<IdentitySet>,
    /// ISO-8601 timestamp, kept as text so a malformed value doesn't fail the
    /// whole page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_date_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentitySet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl DriveItem {
    /// Display file name, falling back to the remote item's name.
    pub fn effective_name(&self) -> Option<&str> {
        non_empty(self.name.as_ref())
            .or_else(|| self.remote_item.as_ref().and_then(|r| non_empty(r.name.as_ref())))
    }

    /// Declared MIME type, if any.
    pub fn mime_type(&self) -> Option<&str> {
        self.file
            .as_ref()
            .or_else(|| self.remote_item.as_ref().and_then(|r| r.file.as_ref()))
            .and_then(|f| non_empty(f.mime_type.as_ref()))
    }

    /// Sharing facet, if any.
    pub fn shared_facet(&self) -> Option<&SharedFacet> {
        self.shared
            .as_ref()
            .or_else(|| self.remote_item.as_ref().and_then(|r| r.shared.as_ref()))
    }

    /// The user who shared the item: `sharedBy`, then the item owner.
    pub fn sharer(&self) -> Option<&Identity> {
        let shared = self.shared_facet()?;
        shared
            .shared_by
            .as_ref()
            .and_then(|s| s.user.as_ref())
            .or_else(|| shared.owner.as_ref().and_then(|o| o.user.as_ref()))
    }

    /// Raw share timestamp text.
    pub fn shared_date_time(&self) -> Option<&str> {
        self.shared_facet()
            .and_then(|s| non_empty(s.shared_date_time.as_ref()))
    }

    /// URL of the first medium-size thumbnail.
    pub fn medium_thumbnail_url(&self) -> Option<&str> {
        let sets = if self.thumbnails.is_empty() {
            self.remote_item
                .as_ref()
                .map(|r| r.thumbnails.as_slice())
                .unwrap_or_default()
        } else {
            self.thumbnails.as_slice()
        };
        sets.iter()
            .find_map(|set| set.medium.as_ref().and_then(|t| non_empty(t.url.as_ref())))
    }

    pub fn effective_web_url(&self) -> Option<&str> {
        non_empty(self.web_url.as_ref())
            .or_else(|| self.remote_item.as_ref().and_then(|r| non_empty(r.web_url.as_ref())))
    }

    /// Drive and item IDs that address the item on the sharer's drive.
    ///
    /// Used to request thumbnails; `None` when the listing did not say which
    /// drive the item lives on.
    pub fn remote_address(&self) -> Option<(&str, &str)> {
        if let Some(remote) = &self.remote_item {
            let drive = remote
                .parent_reference
                .as_ref()
                .and_then(|p| non_empty(p.drive_id.as_ref()));
            let id = non_empty(remote.id.as_ref());
            if let (Some(drive), Some(id)) = (drive, id) {
                return Some((drive, id));
            }
        }
        let drive = self
            .parent_reference
            .as_ref()
            .and_then(|p| non_empty(p.drive_id.as_ref()))?;
        let id = self.id.trim();
        (!id.is_empty()).then_some((drive, id))
    }

    /// Whether the listing already carried thumbnail sets for this item.
    pub fn has_thumbnail_sets(&self) -> bool {
        !self.thumbnails.is_empty()
            || self
                .remote_item
                .as_ref()
                .is_some_and(|r| !r.thumbnails.is_empty())
    }
}
