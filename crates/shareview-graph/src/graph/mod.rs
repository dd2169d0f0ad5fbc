//! Microsoft Graph data provider.

pub mod backend;
pub mod error;
pub mod types;

pub use backend::GraphProvider;
pub use error::{to_shareview_error, GraphErrorCode};
pub use types::{DriveItemPage, GraphError, GraphErrorResponse, ThumbnailCollection};
