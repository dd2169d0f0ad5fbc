//! Centralized default constants for shareview.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// MAPPING
// =============================================================================

/// MIME prefix an item must carry to be treated as an image.
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Placeholder label for images whose file name has no usable extension.
pub const PLACEHOLDER_LABEL: &str = "IMAGE";

/// Longest file extension shown as a placeholder label.
pub const PLACEHOLDER_MAX_LEN: usize = 5;

// =============================================================================
// GRAPH
// =============================================================================

/// Default Microsoft Graph API root.
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Path of the "shared with me" listing, relative to the Graph root.
pub const GRAPH_SHARED_WITH_ME_PATH: &str = "/me/drive/sharedWithMe";

/// Items requested per page (`$top`).
pub const GRAPH_PAGE_SIZE: u32 = 200;

/// Maximum number of `@odata.nextLink` pages followed per load.
pub const GRAPH_MAX_PAGES: u32 = 10;

/// Timeout for a single Graph HTTP request in seconds.
pub const GRAPH_TIMEOUT_SECS: u64 = 30;

/// Thumbnail requests allowed in flight at once during one load.
pub const GRAPH_MAX_CONCURRENT_THUMBNAILS: usize = 8;

// =============================================================================
// STATE ENGINE
// =============================================================================

/// Upper bound on a whole load (all pages plus thumbnails) in seconds.
pub const LOAD_TIMEOUT_SECS: u64 = 60;

/// Default state event broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_timeout_covers_single_request() {
        const {
            assert!(LOAD_TIMEOUT_SECS >= GRAPH_TIMEOUT_SECS);
        }
    }

    #[test]
    fn thumbnail_concurrency_is_bounded() {
        const {
            assert!(GRAPH_MAX_CONCURRENT_THUMBNAILS > 0);
            assert!(GRAPH_MAX_CONCURRENT_THUMBNAILS <= GRAPH_PAGE_SIZE as usize);
        }
    }

    #[test]
    fn image_prefix_ends_with_slash() {
        assert!(IMAGE_MIME_PREFIX.ends_with('/'));
    }
}
