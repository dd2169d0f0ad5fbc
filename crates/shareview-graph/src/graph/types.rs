//! Graph response envelopes.

use serde::{Deserialize, Serialize};

use shareview_core::{DriveItem, ThumbnailSet};

/// One page of a Graph collection response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveItemPage {
    #[serde(default)]
    pub value: Vec<DriveItem>,
    #[serde(
        rename = "@odata.nextLink",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_link: Option<String>,
}

/// Response of `/drives/{drive-id}/items/{item-id}/thumbnails`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThumbnailCollection {
    #[serde(default)]
    pub value: Vec<ThumbnailSet>,
}

/// Graph error body: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphErrorResponse {
    pub error: GraphError,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_with_next_link() {
        let page: DriveItemPage = serde_json::from_str(
            r#"{
                "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#Collection(driveItem)",
                "value": [{ "id": "1", "name": "a.jpg" }],
                "@odata.nextLink": "https://graph.microsoft.com/v1.0/me/drive/sharedWithMe?$skiptoken=abc"
            }"#,
        )
        .unwrap();
        assert_eq!(page.value.len(), 1);
        assert!(page.next_link.unwrap().contains("skiptoken"));
    }

    #[test]
    fn test_last_page_has_no_next_link() {
        let page: DriveItemPage = serde_json::from_str(r#"{ "value": [] }"#).unwrap();
        assert!(page.value.is_empty());
        assert!(page.next_link.is_none());
    }

    #[test]
    fn test_error_body() {
        let body: GraphErrorResponse = serde_json::from_str(
            r#"{ "error": { "code": "InvalidAuthenticationToken", "message": "Access token has expired." } }"#,
        )
        .unwrap();
        assert_eq!(body.error.code, "InvalidAuthenticationToken");
    }
}
