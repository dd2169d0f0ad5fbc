//! # shareview-graph
//!
//! Shared-item data providers for shareview.
//!
//! This crate provides:
//! - [`GraphProvider`]: Microsoft Graph `sharedWithMe` listing with paging
//!   and thumbnail enrichment
//! - [`SampleProvider`]: canned demo listing, no account required
//! - [`ProviderConfig`]: TOML/environment configuration selecting the backend
//!
//! # Example
//!
//! ```rust,no_run
//! use shareview_core::{AccessToken, SharedItemsProvider};
//! use shareview_graph::{build_provider, ProviderConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ProviderConfig::load().expect("valid config");
//!     let provider = build_provider(&config).expect("provider");
//!     let items = provider
//!         .fetch_shared_items(&AccessToken::new("eyJ0..."))
//!         .await
//!         .unwrap();
//!     println!("{} shared items", items.len());
//! }
//! ```

pub mod config;
pub mod graph;
pub mod provider;
pub mod sample;

pub use config::{ConfigError, GraphConfig, ProviderConfig, ProviderKind, SampleConfig};
pub use graph::GraphProvider;
pub use provider::{build_provider, requires_token};
pub use sample::{sample_items, SampleProvider};
