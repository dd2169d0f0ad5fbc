//! Microsoft Graph `sharedWithMe` provider.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use shareview_core::defaults::GRAPH_SHARED_WITH_ME_PATH;
use shareview_core::{is_image_mime, AccessToken, DriveItem, Error, Result, SharedItemsProvider};

use super::error::{to_shareview_error, GraphErrorCode};
use super::types::{DriveItemPage, GraphErrorResponse, ThumbnailCollection};
use crate::config::{GraphConfig, ProviderConfig};

/// Lists items shared with the signed-in user through Microsoft Graph.
pub struct GraphProvider {
    client: Client,
    config: GraphConfig,
}

impl GraphProvider {
    /// Create a new Graph provider with the given configuration.
    pub fn new(config: GraphConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            page_size = config.page_size,
            max_pages = config.max_pages,
            fetch_thumbnails = config.fetch_thumbnails,
            max_concurrent_thumbnails = config.max_concurrent_thumbnails,
            "Initializing Graph provider"
        );

        Ok(Self { client, config })
    }

    /// Create from `SHAREVIEW_GRAPH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ProviderConfig::from_env().map_err(|e| Error::Config(e.to_string()))?;
        Self::new(config.graph)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn shared_with_me_url(&self) -> String {
        format!(
            "{}{}?$top={}",
            self.config.base_url.trim_end_matches('/'),
            GRAPH_SHARED_WITH_ME_PATH,
            self.config.page_size
        )
    }

    /// Whether `url` lives under the configured base URL. The access token
    /// is only ever sent to such URLs.
    fn is_under_base_url(&self, url: &str) -> bool {
        let base = self.config.base_url.trim_end_matches('/');
        url.strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
    }

    fn thumbnails_url(base_url: &str, drive_id: &str, item_id: &str) -> String {
        format!(
            "{}/drives/{}/items/{}/thumbnails",
            base_url.trim_end_matches('/'),
            drive_id,
            item_id
        )
    }

    /// Fetch every page of the listing, following `@odata.nextLink`.
    async fn fetch_pages(&self, token: &AccessToken) -> Result<Vec<DriveItem>> {
        let mut items = Vec::new();
        let mut next = Some(self.shared_with_me_url());
        let mut pages = 0u32;

        while let Some(url) = next.take() {
            if pages == self.config.max_pages {
                warn!(
                    max_pages = self.config.max_pages,
                    item_count = items.len(),
                    "Stopped following sharedWithMe pages at configured limit"
                );
                break;
            }

            let page: DriveItemPage = get_json(&self.client, &url, token).await?;
            pages += 1;
            debug!(page = pages, item_count = page.value.len(), "Fetched sharedWithMe page");

            items.extend(page.value);
            next = match page.next_link {
                Some(link) if !self.is_under_base_url(&link) => {
                    warn!(
                        next_link = %link,
                        base_url = %self.config.base_url,
                        item_count = items.len(),
                        "Ignoring nextLink outside the configured base URL"
                    );
                    None
                }
                link => link,
            };
        }

        Ok(items)
    }

    /// Fill in thumbnails for items the listing returned without any.
    ///
    /// At most `max_concurrent_thumbnails` requests run at once. Failures
    /// leave the item without a thumbnail; they never fail the load.
    async fn enrich_thumbnails(&self, items: &mut [DriveItem], token: &AccessToken) {
        let mut pending: VecDeque<(usize, String)> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                !item.has_thumbnail_sets() && item.mime_type().is_some_and(is_image_mime)
            })
            .filter_map(|(index, item)| {
                let (drive_id, item_id) = item.remote_address()?;
                Some((
                    index,
                    Self::thumbnails_url(&self.config.base_url, drive_id, item_id),
                ))
            })
            .collect();

        if pending.is_empty() {
            return;
        }
        debug!(
            count = pending.len(),
            max_concurrent = self.config.max_concurrent_thumbnails,
            "Fetching missing thumbnails"
        );

        let mut tasks = JoinSet::new();
        loop {
            while tasks.len() < self.config.max_concurrent_thumbnails {
                let Some((index, url)) = pending.pop_front() else {
                    break;
                };
                let client = self.client.clone();
                let token = token.clone();
                tasks.spawn(async move {
                    let result: Result<ThumbnailCollection> =
                        get_json(&client, &url, &token).await;
                    (index, result)
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            match joined {
                Ok((index, Ok(collection))) => {
                    items[index].thumbnails = collection.value;
                }
                Ok((index, Err(e))) => {
                    warn!(
                        item_id = %items[index].id,
                        error = %e,
                        "Thumbnail fetch failed, showing placeholder"
                    );
                }
                Err(e) => {
                    warn!(error = ?e, "Thumbnail task panicked");
                }
            }
        }
    }
}

#[async_trait]
impl SharedItemsProvider for GraphProvider {
    fn name(&self) -> &str {
        "graph"
    }

    async fn fetch_shared_items(&self, token: &AccessToken) -> Result<Vec<DriveItem>> {
        let start = Instant::now();
        let mut items = self.fetch_pages(token).await?;

        if self.config.fetch_thumbnails {
            self.enrich_thumbnails(&mut items, token).await;
        }

        info!(
            item_count = items.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched shared items from Graph"
        );
        Ok(items)
    }
}

/// Authenticated GET decoding a JSON body, mapping Graph error responses.
async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    token: &AccessToken,
) -> Result<T> {
    let response = client
        .get(url)
        .bearer_auth(token.secret())
        .header("Accept", "application/json")
        .send()
        .await?;

    let response = check_status(response).await?;
    response.json::<T>().await.map_err(Error::from)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .json::<GraphErrorResponse>()
        .await
        .map(|b| b.error)
        .unwrap_or_default();

    let code = GraphErrorCode::from_response(status.as_u16(), &body.code);
    let mut message = if body.message.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), body.message)
    };
    if let Some(seconds) = retry_after {
        message.push_str(&format!(" (retry after {}s)", seconds));
    }

    warn!(
        status = status.as_u16(),
        code = %body.code,
        retryable = code.is_retryable(),
        "Graph request failed"
    );
    Err(to_shareview_error(code, &message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> GraphProvider {
        GraphProvider::new(GraphConfig {
            base_url: base_url.to_string(),
            page_size: 50,
            ..GraphConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_shared_with_me_url_trims_trailing_slash() {
        let p = provider("https://graph.example.com/v1.0/");
        assert_eq!(
            p.shared_with_me_url(),
            "https://graph.example.com/v1.0/me/drive/sharedWithMe?$top=50"
        );
    }

    #[test]
    fn test_next_link_must_stay_under_base_url() {
        let p = provider("https://graph.example.com/v1.0/");
        assert!(p.is_under_base_url(
            "https://graph.example.com/v1.0/me/drive/sharedWithMe?$skiptoken=abc"
        ));
        assert!(!p.is_under_base_url("https://attacker.example.net/v1.0/me/drive/sharedWithMe"));
        assert!(!p.is_under_base_url("https://graph.example.com/v1.0.evil.net/page2"));
        assert!(!p.is_under_base_url("http://graph.example.com/v1.0/me/drive/sharedWithMe"));
    }

    #[test]
    fn test_thumbnails_url() {
        assert_eq!(
            GraphProvider::thumbnails_url("https://g/v1.0", "d1", "i1"),
            "https://g/v1.0/drives/d1/items/i1/thumbnails"
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = GraphProvider::new(GraphConfig {
            base_url: "not-a-url".to_string(),
            ..GraphConfig::default()
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider("https://g").name(), "graph");
    }
}
