//! Provider configuration.
//!
//! Selects which data provider backs the gallery and configures it.
//! Configuration can be loaded from:
//! - TOML files (default: ~/.config/shareview/shareview.toml, or `SHAREVIEW_CONFIG`)
//! - Environment variables (`SHAREVIEW_*` prefixed)
//!
//! # Example
//!
//! ```toml
//! [provider]
//! backend = "graph"
//!
//! [provider.graph]
//! base_url = "https://graph.microsoft.com/v1.0"
//! timeout_secs = 30
//! page_size = 200
//! max_pages = 10
//! fetch_thumbnails = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use shareview_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which provider supplies shared items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Microsoft Graph `sharedWithMe`.
    #[default]
    Graph,
    /// Built-in demo data; needs no account.
    Sample,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "graph" => Ok(Self::Graph),
            "sample" | "mock" | "demo" => Ok(Self::Sample),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph => write!(f, "graph"),
            Self::Sample => write!(f, "sample"),
        }
    }
}

/// Microsoft Graph provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Graph API root, without trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Items per page (`$top`).
    pub page_size: u32,
    /// Maximum `@odata.nextLink` pages followed.
    pub max_pages: u32,
    /// Request thumbnails for items the listing returned without any.
    pub fetch_thumbnails: bool,
    /// Thumbnail requests in flight at once.
    pub max_concurrent_thumbnails: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GRAPH_BASE_URL.to_string(),
            timeout_secs: defaults::GRAPH_TIMEOUT_SECS,
            page_size: defaults::GRAPH_PAGE_SIZE,
            max_pages: defaults::GRAPH_MAX_PAGES,
            fetch_thumbnails: true,
            max_concurrent_thumbnails: defaults::GRAPH_MAX_CONCURRENT_THUMBNAILS,
        }
    }
}

impl GraphConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "Graph base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "Graph base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "Graph timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.page_size == 0 || self.page_size > 999 {
            return Err(ConfigError::Validation(format!(
                "Graph page_size must be between 1 and 999, got: {}",
                self.page_size
            )));
        }

        if self.max_pages == 0 {
            return Err(ConfigError::Validation(
                "Graph max_pages must be greater than zero".to_string(),
            ));
        }

        if self.max_concurrent_thumbnails == 0 || self.max_concurrent_thumbnails > 64 {
            return Err(ConfigError::Validation(format!(
                "Graph max_concurrent_thumbnails must be between 1 and 64, got: {}",
                self.max_concurrent_thumbnails
            )));
        }

        Ok(())
    }
}

/// Sample provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Simulated response latency in milliseconds.
    pub latency_ms: u64,
}

/// Top-level provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub backend: ProviderKind,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub sample: SampleConfig,
}

impl ProviderConfig {
    /// Default config file location.
    pub fn default_config_path() -> PathBuf {
        if let Ok(path) = env::var("SHAREVIEW_CONFIG") {
            return PathBuf::from(path);
        }
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("shareview");
        path.push("shareview.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading provider config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            let config = Self::from_env()?;
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// `${VAR}` placeholders are replaced with environment values before parsing.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = Self::substitute_env_vars(&content);
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the `[provider]` table of a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            provider: ProviderConfig,
        }

        let root: TomlRoot = toml::from_str(content)?;
        Ok(root.provider)
    }

    /// Build configuration from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `SHAREVIEW_BACKEND` | `graph` | `graph` or `sample` |
    /// | `SHAREVIEW_GRAPH_URL` | `https://graph.microsoft.com/v1.0` | Graph API root |
    /// | `SHAREVIEW_GRAPH_TIMEOUT_SECS` | `30` | Per-request timeout |
    /// | `SHAREVIEW_GRAPH_PAGE_SIZE` | `200` | Items per page |
    /// | `SHAREVIEW_GRAPH_MAX_PAGES` | `10` | Pages followed per load |
    /// | `SHAREVIEW_GRAPH_FETCH_THUMBNAILS` | `true` | Fetch missing thumbnails |
    /// | `SHAREVIEW_GRAPH_MAX_CONCURRENT_THUMBNAILS` | `8` | Thumbnail requests in flight |
    /// | `SHAREVIEW_SAMPLE_LATENCY_MS` | `0` | Sample provider latency |
    pub fn from_env() -> ConfigResult<Self> {
        let backend = match env::var("SHAREVIEW_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => ProviderKind::default(),
        };

        let base = GraphConfig::default();
        let graph = GraphConfig {
            base_url: env::var("SHAREVIEW_GRAPH_URL").unwrap_or(base.base_url),
            timeout_secs: parse_env("SHAREVIEW_GRAPH_TIMEOUT_SECS").unwrap_or(base.timeout_secs),
            page_size: parse_env("SHAREVIEW_GRAPH_PAGE_SIZE").unwrap_or(base.page_size),
            max_pages: parse_env("SHAREVIEW_GRAPH_MAX_PAGES").unwrap_or(base.max_pages),
            fetch_thumbnails: env::var("SHAREVIEW_GRAPH_FETCH_THUMBNAILS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(base.fetch_thumbnails),
            max_concurrent_thumbnails: parse_env("SHAREVIEW_GRAPH_MAX_CONCURRENT_THUMBNAILS")
                .unwrap_or(base.max_concurrent_thumbnails),
        };

        let sample = SampleConfig {
            latency_ms: parse_env("SHAREVIEW_SAMPLE_LATENCY_MS").unwrap_or_default(),
        };

        Ok(Self {
            backend,
            graph,
            sample,
        })
    }

    /// Validate the section for the selected backend.
    pub fn validate(&self) -> ConfigResult<()> {
        match self.backend {
            ProviderKind::Graph => self.graph.validate(),
            ProviderKind::Sample => Ok(()),
        }
    }

    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex is valid");
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("graph".parse::<ProviderKind>().unwrap(), ProviderKind::Graph);
        assert_eq!("Sample".parse::<ProviderKind>().unwrap(), ProviderKind::Sample);
        assert_eq!("mock".parse::<ProviderKind>().unwrap(), ProviderKind::Sample);
        assert!("dropbox".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_backend_display_round_trips() {
        for kind in [ProviderKind::Graph, ProviderKind::Sample] {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ProviderConfig::default();
        assert_eq!(config.backend, ProviderKind::Graph);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_graph_validation_rejects_bad_url() {
        let config = GraphConfig {
            base_url: "graph.microsoft.com".to_string(),
            ..GraphConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_graph_validation_rejects_unbounded_thumbnail_concurrency() {
        for value in [0, 65] {
            let config = GraphConfig {
                max_concurrent_thumbnails: value,
                ..GraphConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_graph_validation_rejects_zero_page_size() {
        let config = GraphConfig {
            page_size: 0,
            ..GraphConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_backend_skips_graph_validation() {
        let config = ProviderConfig {
            backend: ProviderKind::Sample,
            graph: GraphConfig {
                base_url: String::new(),
                ..GraphConfig::default()
            },
            ..ProviderConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial_graph_section() {
        let config = ProviderConfig::from_toml_str(
            r#"
            [provider]
            backend = "graph"

            [provider.graph]
            page_size = 50
            fetch_thumbnails = false
            "#,
        )
        .unwrap();

        assert_eq!(config.graph.page_size, 50);
        assert!(!config.graph.fetch_thumbnails);
        assert_eq!(config.graph.base_url, defaults::GRAPH_BASE_URL);
    }

    #[test]
    fn test_from_toml_missing_provider_table_uses_defaults() {
        let config = ProviderConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_unknown_backend() {
        let result = ProviderConfig::from_toml_str("[provider]\nbackend = \"ftp\"\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_from_file_substitutes_env_vars() {
        env::set_var("SHAREVIEW_TEST_GRAPH_URL_SUB", "http://localhost:9999");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[provider.graph]\nbase_url = \"${{SHAREVIEW_TEST_GRAPH_URL_SUB}}\""
        )
        .unwrap();

        let config = ProviderConfig::from_file(file.path()).unwrap();
        env::remove_var("SHAREVIEW_TEST_GRAPH_URL_SUB");

        assert_eq!(config.graph.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_env_var_substitution_missing() {
        let content = "base_url = \"${NONEXISTENT_SHAREVIEW_VAR_12345}\"";
        let result = ProviderConfig::substitute_env_vars(content);
        assert_eq!(result, content);
    }

    #[test]
    fn test_serialize_provider_config() {
        let serialized = toml::to_string(&ProviderConfig::default()).unwrap();
        assert!(serialized.contains("backend = \"graph\""));
        assert!(serialized.contains("[graph]"));
    }
}
