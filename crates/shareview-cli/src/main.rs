//! shareview: list images other people have shared with you, grouped by sharer.
//!
//! Runs one load through the configured provider and prints the people list
//! and gallery, optionally filtered to a single sharer.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shareview_core::{AccessToken, AccountInfo, GalleryItem, Person, Session};
use shareview_graph::{build_provider, requires_token, ProviderConfig, ProviderKind};
use shareview_state::{EngineConfig, SelectionEngine, SelectionState};

#[derive(Parser)]
#[command(name = "shareview")]
#[command(author, version, about = "Browse images shared with you, grouped by who shared them")]
struct Cli {
    /// Provider config file (default: ~/.config/shareview/shareview.toml)
    #[arg(short, long, env = "SHAREVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured backend (graph or sample)
    #[arg(short, long)]
    backend: Option<ProviderKind>,

    /// Access token for the file-sharing API
    #[arg(long, env = "SHAREVIEW_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Account name shown in logs
    #[arg(long, env = "SHAREVIEW_ACCOUNT", default_value = "me")]
    account: String,

    /// Show only images from this sharer (identifier or display name)
    #[arg(short, long)]
    person: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Also write logs to this file (rotated daily)
    #[arg(long, env = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_format, cli.log_file.as_ref());

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Set up tracing. Logs go to stderr so stdout stays clean for output.
///
/// `RUST_LOG` overrides the default filter.
fn init_logging(
    format: LogFormat,
    log_file: Option<&PathBuf>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shareview=info,shareview_state=info,shareview_graph=warn".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("shareview.log");
        let appender = tracing_appender::rolling::daily(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        match format {
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init(),
            LogFormat::Text => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init(),
        }
        Some(guard)
    } else {
        match format {
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init(),
            LogFormat::Text => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init(),
        }
        None
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => ProviderConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ProviderConfig::load().context("failed to load provider config")?,
    };
    if let Some(backend) = cli.backend {
        config.backend = backend;
        config.validate().context("invalid provider config")?;
    }

    let token = match cli.token {
        Some(token) => AccessToken::new(token),
        None if requires_token(&config) => bail!(
            "the {} backend needs an access token; pass --token or set SHAREVIEW_ACCESS_TOKEN",
            config.backend
        ),
        None => AccessToken::new(""),
    };

    let provider = build_provider(&config)?;
    let session = Session::authenticated(
        AccountInfo {
            username: cli.account.clone(),
            name: None,
            home_account_id: None,
        },
        token,
    );
    let (_session_tx, session_rx) = watch::channel(session);
    let engine = SelectionEngine::new(Arc::clone(&provider), session_rx, EngineConfig::from_env());

    let loaded = engine.load().await;
    if let Err(e) = &loaded {
        warn!(error = %e, retryable = e.is_retryable(), "Load failed");
    }

    if let Some(query) = &cli.person {
        let people = engine.snapshot().available_people;
        match find_person(&people, query) {
            Some(person) => engine.select_person(Some(person.clone())),
            None if loaded.is_ok() => bail!("no one named '{}' has shared images with you", query),
            None => {}
        }
    }

    let state = engine.snapshot();
    let gallery = engine.gallery_items();
    info!(
        provider = provider.name(),
        people = state.available_people.len(),
        shown = gallery.len(),
        "Rendering"
    );

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "state": state, "gallery": gallery });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print!("{}", render_text(&state, &gallery)),
    }

    Ok(if loaded.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Match by exact identifier first, then by display name ignoring case.
fn find_person<'a>(people: &'a [Person], query: &str) -> Option<&'a Person> {
    people
        .iter()
        .find(|p| !p.identifier.is_empty() && p.identifier == query)
        .or_else(|| {
            people
                .iter()
                .find(|p| p.display_name.eq_ignore_ascii_case(query))
        })
}

fn render_text(state: &SelectionState, gallery: &[GalleryItem]) -> String {
    let mut out = String::new();

    if let Some(error) = &state.error {
        out.push_str(&format!("! {}\n", error));
        if !state.has_loaded {
            return out;
        }
        out.push('\n');
    }

    if !state.has_loaded {
        out.push_str(if state.is_loading {
            "Loading shared images...\n"
        } else {
            "Shared images have not been loaded.\n"
        });
        return out;
    }

    if state.is_empty() {
        out.push_str("Nothing has been shared with you yet.\n");
        return out;
    }

    out.push_str(&format!("People ({})\n", state.available_people.len()));
    for person in &state.available_people {
        let marker = match &state.selected_person {
            Some(selected) if selected.identifier == person.identifier => '*',
            _ => ' ',
        };
        out.push_str(&format!(
            " {} {} ({} image{})\n",
            marker,
            person.display_name,
            person.image_count,
            if person.image_count == 1 { "" } else { "s" }
        ));
    }

    let heading = match &state.selected_person {
        Some(person) => format!("Images shared by {}", person.display_name),
        None => "All images".to_string(),
    };
    out.push_str(&format!("\n{} ({})\n", heading, gallery.len()));
    for item in gallery {
        let preview = if item.has_thumbnail {
            "thumb".to_string()
        } else {
            format!("[{}]", item.placeholder)
        };
        let date = if item.image.date_shared_defaulted {
            "date unknown".to_string()
        } else {
            item.image.date_shared.format("%Y-%m-%d").to_string()
        };
        out.push_str(&format!("  {:<7} {}  ({})\n", preview, item.alt_text, date));
    }

    if !state.skipped.is_empty() {
        out.push_str(&format!(
            "\n{} shared item(s) could not be shown\n",
            state.skipped.len()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use shareview_core::GalleryBuild;
    use shareview_graph::SampleProvider;
    use shareview_state::{reduce, Action};

    fn person(identifier: &str, name: &str) -> Person {
        Person {
            identifier: identifier.to_string(),
            display_name: name.to_string(),
            image_count: 1,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_backend_and_format() {
        let cli = Cli::try_parse_from(["shareview", "--backend", "sample", "--format", "json"])
            .unwrap();
        assert_eq!(cli.backend, Some(ProviderKind::Sample));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_find_person_prefers_identifier() {
        let people = vec![person("sam@a.com", "Sam (sam@a.com)"), person("b", "Bo")];
        assert_eq!(find_person(&people, "sam@a.com").unwrap().display_name, "Sam (sam@a.com)");
        assert_eq!(find_person(&people, "bo").unwrap().identifier, "b");
        assert!(find_person(&people, "nobody").is_none());
    }

    #[test]
    fn test_find_person_ignores_empty_identifier() {
        let people = vec![person("", "Anonymous")];
        assert!(find_person(&people, "").is_none());
        assert!(find_person(&people, "anonymous").is_some());
    }

    #[tokio::test]
    async fn test_render_text_with_sample_data() {
        let (_tx, rx) = watch::channel(Session::authenticated(
            AccountInfo {
                username: "me".to_string(),
                name: None,
                home_account_id: None,
            },
            AccessToken::new(""),
        ));
        let engine =
            SelectionEngine::new(Arc::new(SampleProvider::new()), rx, EngineConfig::default());
        engine.load().await.unwrap();

        let text = render_text(&engine.snapshot(), &engine.gallery_items());
        assert!(text.starts_with("People (4)\n"));
        assert!(text.contains("John Smith (jsmith@fabrikam.com) (1 image)"));
        assert!(text.contains("All images (5)"));
        assert!(text.contains("[HEIC]"));
        assert!(text.contains("1 shared item(s) could not be shown"));
    }

    #[test]
    fn test_render_text_before_first_load() {
        let idle = render_text(&SelectionState::default(), &[]);
        assert_eq!(idle, "Shared images have not been loaded.\n");
        assert!(!idle.contains("People"));
        assert!(!idle.contains("All images"));

        let mut loading = SelectionState::default();
        loading.is_loading = true;
        assert_eq!(render_text(&loading, &[]), "Loading shared images...\n");
    }

    #[test]
    fn test_render_text_empty_and_error_states() {
        let mut empty = SelectionState::default();
        reduce(&mut empty, Action::LoadStarted { request: 1 });
        reduce(
            &mut empty,
            Action::LoadSucceeded {
                request: 1,
                build: GalleryBuild::default(),
            },
        );
        assert_eq!(render_text(&empty, &[]), "Nothing has been shared with you yet.\n");

        let mut failed = SelectionState::default();
        failed.error = Some("Couldn't reach the sharing service.".to_string());
        assert_eq!(render_text(&failed, &[]), "! Couldn't reach the sharing service.\n");
    }
}
