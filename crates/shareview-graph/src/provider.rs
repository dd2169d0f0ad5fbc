//! Provider selection from configuration.
//!
//! The backend is chosen once at startup from [`ProviderConfig::backend`];
//! nothing downstream inspects tokens or data to switch providers.

use std::sync::Arc;

use tracing::info;

use shareview_core::{Result, SharedItemsProvider};

use crate::config::{ProviderConfig, ProviderKind};
use crate::graph::GraphProvider;
use crate::sample::SampleProvider;

/// Build the configured provider.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn SharedItemsProvider>> {
    info!(backend = %config.backend, "Selecting shared items provider");

    let provider: Arc<dyn SharedItemsProvider> = match config.backend {
        ProviderKind::Graph => Arc::new(GraphProvider::new(config.graph.clone())?),
        ProviderKind::Sample => {
            Arc::new(SampleProvider::new().with_latency_ms(config.sample.latency_ms))
        }
    };
    Ok(provider)
}

/// Whether the configured provider needs a real access token.
pub fn requires_token(config: &ProviderConfig) -> bool {
    config.backend == ProviderKind::Graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use shareview_core::Error;

    #[test]
    fn test_build_sample_provider() {
        let config = ProviderConfig {
            backend: ProviderKind::Sample,
            ..ProviderConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "sample");
        assert!(!requires_token(&config));
    }

    #[test]
    fn test_build_graph_provider() {
        let config = ProviderConfig::default();
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "graph");
        assert!(requires_token(&config));
    }

    #[test]
    fn test_build_graph_provider_invalid_config() {
        let config = ProviderConfig {
            graph: GraphConfig {
                max_pages: 0,
                ..GraphConfig::default()
            },
            ..ProviderConfig::default()
        };
        assert!(matches!(build_provider(&config), Err(Error::Config(_))));
    }
}
