//! Built-in sample provider.
//!
//! Serves a canned "shared with me" listing without contacting any service.
//! Selected through configuration (`backend = "sample"`), it exercises the
//! same pipeline as the Graph provider: the listing includes duplicate
//! display names, a non-image file, an image without a thumbnail, an item
//! without a sharer, and an item shared from another drive.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use shareview_core::{AccessToken, DriveItem, Error, Result, SharedItemsProvider};

/// Canned data provider.
#[derive(Clone)]
pub struct SampleProvider {
    inner: Arc<Mutex<SampleState>>,
}

#[derive(Debug, Clone)]
struct SampleState {
    items: Vec<DriveItem>,
    latency: Duration,
    failure: Option<String>,
    calls: usize,
}

impl SampleProvider {
    /// Create a provider serving [`sample_items`].
    pub fn new() -> Self {
        Self::with_items(sample_items())
    }

    /// Create a provider serving the given listing.
    pub fn with_items(items: Vec<DriveItem>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SampleState {
                items,
                latency: Duration::ZERO,
                failure: None,
                calls: 0,
            })),
        }
    }

    /// Set simulated latency for every fetch.
    pub fn with_latency_ms(self, latency_ms: u64) -> Self {
        self.state().latency = Duration::from_millis(latency_ms);
        self
    }

    /// Replace the listing served by later fetches.
    pub fn set_items(&self, items: Vec<DriveItem>) {
        self.state().items = items;
    }

    /// Make later fetches fail with a request error, or succeed again with `None`.
    pub fn set_failure(&self, message: Option<String>) {
        self.state().failure = message;
    }

    /// Number of fetches made so far.
    pub fn call_count(&self) -> usize {
        self.state().calls
    }

    fn state(&self) -> MutexGuard<'_, SampleState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SampleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedItemsProvider for SampleProvider {
    fn name(&self) -> &str {
        "sample"
    }

    async fn fetch_shared_items(&self, _token: &AccessToken) -> Result<Vec<DriveItem>> {
        let (latency, outcome) = {
            let mut state = self.state();
            state.calls += 1;
            let outcome = match &state.failure {
                Some(message) => Err(message.clone()),
                None => Ok(state.items.clone()),
            };
            (state.latency, outcome)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match outcome {
            Ok(items) => {
                debug!(item_count = items.len(), "Serving sample shared items");
                Ok(items)
            }
            Err(message) => Err(Error::Request(message)),
        }
    }
}

/// The demo listing served by [`SampleProvider::new`].
///
/// Panics if the embedded listing no longer matches the Graph item shape.
pub fn sample_items() -> Vec<DriveItem> {
    let raw = json!([
        {
            "id": "sample-01",
            "name": "harbor-sunrise.jpg",
            "file": { "mimeType": "image/jpeg" },
            "shared": {
                "sharedBy": { "user": { "displayName": "Ana Lopez", "id": "u-ana", "email": "ana@contoso.com" } },
                "sharedDateTime": "2024-06-02T07:15:00Z"
            },
            "thumbnails": [{ "medium": { "url": "https://example.com/thumbnails/sample-01.jpg" } }],
            "webUrl": "https://example.com/items/sample-01"
        },
        {
            "id": "sample-02",
            "name": "budget.pdf",
            "file": { "mimeType": "application/pdf" },
            "shared": {
                "sharedBy": { "user": { "displayName": "Ana Lopez", "id": "u-ana", "email": "ana@contoso.com" } },
                "sharedDateTime": "2024-06-03T09:00:00Z"
            }
        },
        {
            "id": "sample-03",
            "name": "IMG_2041.HEIC",
            "file": { "mimeType": "image/heic" },
            "shared": {
                "sharedBy": { "user": { "displayName": "Ana Lopez", "id": "u-ana", "email": "ana@contoso.com" } }
            },
            "webUrl": "https://example.com/items/sample-03"
        },
        {
            "id": "sample-04",
            "name": "team-offsite.png",
            "file": { "mimeType": "image/png" },
            "shared": {
                "sharedBy": { "user": { "displayName": "John Smith", "id": "u-js1", "email": "john.smith@contoso.com" } },
                "sharedDateTime": "2024-05-20T16:45:00Z"
            },
            "thumbnails": [{ "medium": { "url": "https://example.com/thumbnails/sample-04.png" } }]
        },
        {
            "id": "sample-05",
            "name": "garden.jpg",
            "file": { "mimeType": "image/jpeg" },
            "shared": {
                "sharedBy": { "user": { "displayName": "John Smith", "id": "u-js2", "email": "jsmith@fabrikam.com" } },
                "sharedDateTime": "2024-04-11T12:00:00Z"
            },
            "thumbnails": [{ "medium": { "url": "https://example.com/thumbnails/sample-05.jpg" } }]
        },
        {
            "id": "sample-06",
            "name": "Projects",
            "folder": { "childCount": 4 },
            "shared": {
                "sharedBy": { "user": { "displayName": "Kai Chen", "id": "u-kai" } }
            }
        },
        {
            "id": "sample-07",
            "name": "whiteboard.webp",
            "remoteItem": {
                "id": "remote-07",
                "file": { "mimeType": "image/webp" },
                "parentReference": { "driveId": "drive-kai" },
                "shared": {
                    "owner": { "user": { "displayName": "Kai Chen", "id": "u-kai" } },
                    "sharedDateTime": "2024-06-10T10:30:00Z"
                },
                "thumbnails": [{ "medium": { "url": "https://example.com/thumbnails/sample-07.webp" } }],
                "webUrl": "https://example.com/items/sample-07"
            }
        },
        {
            "id": "sample-08",
            "name": "orphan.gif",
            "file": { "mimeType": "image/gif" },
            "shared": { "sharedDateTime": "2024-01-01T00:00:00Z" }
        }
    ]);

    serde_json::from_value(raw).expect("sample listing is valid")
}
