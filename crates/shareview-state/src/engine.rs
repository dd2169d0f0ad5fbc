//! Selection engine: loads shared items, runs the pipeline, and owns the
//! selection state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shareview_core::defaults::LOAD_TIMEOUT_SECS;
use shareview_core::{
    build_gallery, AccessToken, DriveItem, Error, GalleryItem, Person, Result, Session,
    SharedItemsProvider,
};

use crate::events::{EventBus, StateEvent};
use crate::state::{reduce, Action, SelectionState};

/// Configuration for the selection engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on a single provider fetch.
    pub load_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(LOAD_TIMEOUT_SECS),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `SHAREVIEW_LOAD_TIMEOUT_SECS` | `60` | Max wait for the data provider |
    pub fn from_env() -> Self {
        let secs = std::env::var("SHAREVIEW_LOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(LOAD_TIMEOUT_SECS)
            .max(1);

        Self {
            load_timeout: Duration::from_secs(secs),
        }
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }
}

/// Owns one [`SelectionState`] and drives it from provider results and
/// session changes.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct SelectionEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    provider: Arc<dyn SharedItemsProvider>,
    session: watch::Receiver<Session>,
    config: EngineConfig,
    state: RwLock<SelectionState>,
    next_request: AtomicU64,
    events: EventBus,
}

impl SelectionEngine {
    pub fn new(
        provider: Arc<dyn SharedItemsProvider>,
        session: watch::Receiver<Session>,
        config: EngineConfig,
    ) -> Self {
        info!(
            subsystem = "state",
            provider = provider.name(),
            load_timeout_secs = config.load_timeout.as_secs(),
            "Selection engine created"
        );
        Self {
            inner: Arc::new(EngineInner {
                provider,
                session,
                config,
                state: RwLock::new(SelectionState::default()),
                next_request: AtomicU64::new(0),
                events: EventBus::default(),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SelectionState {
        self.read().clone()
    }

    /// Gallery view of the currently displayed images.
    pub fn gallery_items(&self) -> Vec<GalleryItem> {
        GalleryItem::from_images(&self.read().display_images)
    }

    /// Loaded successfully with nothing shared, as opposed to failed.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.inner.events.subscribe()
    }

    /// Filter the displayed images to one sharer, or show all with `None`.
    ///
    /// Never calls the provider. A person not in `available_people` selects
    /// everyone.
    pub fn select_person(&self, person: Option<Person>) {
        let identifier = {
            let mut state = self.write();
            reduce(&mut state, Action::SelectPerson(person));
            state.selected_person.as_ref().map(|p| p.identifier.clone())
        };
        debug!(
            subsystem = "state",
            op = "select_person",
            sharer = identifier.as_deref().unwrap_or("<all>"),
            "Selection changed"
        );
        self.inner
            .events
            .emit(StateEvent::SelectionChanged { identifier });
    }

    /// Fetch shared items and replace the displayed data.
    ///
    /// Does nothing while signed out. When several loads overlap only the
    /// one started last is applied; earlier results are dropped. On failure
    /// the error is recorded in the state, previous data stays visible, and
    /// the error is also returned.
    pub async fn load(&self) -> Result<()> {
        self.run_load("load").await
    }

    /// Re-run [`load`](Self::load), e.g. from a retry action.
    pub async fn refresh(&self) -> Result<()> {
        self.run_load("refresh").await
    }

    async fn run_load(&self, op: &'static str) -> Result<()> {
        let session = self.inner.session.borrow().clone();
        if !session.is_authenticated {
            debug!(subsystem = "state", op, "Not signed in, skipping load");
            return Ok(());
        }

        let request = self.inner.next_request.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.dispatch(Action::LoadStarted { request }) {
            return Ok(());
        }
        self.inner.events.emit(StateEvent::LoadStarted { request });

        let start = Instant::now();
        let result = match session.usable_token() {
            Some(token) => self.fetch_with_timeout(token).await,
            None => Err(Error::Unauthorized(
                "session is authenticated but has no access token".to_string(),
            )),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(items) => {
                let build = build_gallery(&items);
                let image_count = build.images.len();
                let people_count = build.groupings.len();
                let skipped_count = build.issues.len();

                if !self.dispatch(Action::LoadSucceeded { request, build }) {
                    debug!(
                        subsystem = "state",
                        op,
                        request_seq = request,
                        "Discarding superseded load result"
                    );
                    return Ok(());
                }

                info!(
                    subsystem = "state",
                    op,
                    request_seq = request,
                    provider = self.inner.provider.name(),
                    item_count = items.len(),
                    image_count,
                    people_count,
                    skipped_count,
                    duration_ms,
                    "Shared images loaded"
                );
                self.inner.events.emit(StateEvent::LoadFinished {
                    request,
                    image_count,
                    people_count,
                    skipped_count,
                });
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                let applied = self.dispatch(Action::LoadFailed {
                    request,
                    message: message.clone(),
                });

                if applied {
                    warn!(
                        subsystem = "state",
                        op,
                        request_seq = request,
                        provider = self.inner.provider.name(),
                        retryable = e.is_retryable(),
                        duration_ms,
                        error = %e,
                        "Loading shared images failed"
                    );
                    self.inner.events.emit(StateEvent::LoadFailed {
                        request,
                        message,
                        retryable: e.is_retryable(),
                    });
                } else {
                    debug!(
                        subsystem = "state",
                        op,
                        request_seq = request,
                        error = %e,
                        "Discarding superseded load failure"
                    );
                }
                Err(e)
            }
        }
    }

    async fn fetch_with_timeout(&self, token: &AccessToken) -> Result<Vec<DriveItem>> {
        let timeout = self.inner.config.load_timeout;
        match tokio::time::timeout(timeout, self.inner.provider.fetch_shared_items(token)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "{} provider did not respond within {}s",
                self.inner.provider.name(),
                timeout.as_secs()
            ))),
        }
    }

    /// Clear all data and supersede any load in flight.
    pub fn sign_out(&self) {
        let request = self.inner.next_request.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch(Action::SignedOut { request });
        info!(subsystem = "state", op = "sign_out", "Session ended, state cleared");
        self.inner.events.emit(StateEvent::Reset);
    }

    /// Follow session changes: load when signed in, clear on sign-out.
    ///
    /// Loads immediately if the session is already authenticated. The task
    /// ends when the session sender is dropped.
    pub fn watch_session(&self) -> JoinHandle<()> {
        let engine = self.clone();
        let mut session = self.inner.session.clone();

        tokio::spawn(async move {
            let mut authenticated = session.borrow_and_update().is_authenticated;
            if authenticated {
                engine.spawn_load();
            }

            while session.changed().await.is_ok() {
                let current = session.borrow_and_update().clone();
                match (authenticated, current.is_authenticated) {
                    (_, true) => engine.spawn_load(),
                    (true, false) => engine.sign_out(),
                    (false, false) => {
                        if let Some(error) = &current.error {
                            debug!(subsystem = "state", error = %error, "Sign-in failed");
                        }
                    }
                }
                authenticated = current.is_authenticated;
            }

            debug!(subsystem = "state", "Session channel closed, watcher stopping");
        })
    }

    fn spawn_load(&self) {
        let engine = self.clone();
        tokio::spawn(async move {
            // Failures are already recorded in the state.
            let _ = engine.load().await;
        });
    }

    fn dispatch(&self, action: Action) -> bool {
        reduce(&mut self.write(), action)
    }

    fn read(&self) -> RwLockReadGuard<'_, SelectionState> {
        self.inner.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SelectionState> {
        self.inner.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LoadPhase;
    use shareview_core::AccountInfo;
    use shareview_graph::{sample_items, SampleProvider};

    fn signed_in() -> Session {
        Session::authenticated(
            AccountInfo {
                username: "me@example.com".to_string(),
                name: None,
                home_account_id: None,
            },
            AccessToken::new("token"),
        )
    }

    fn engine_with(
        provider: SampleProvider,
        session: Session,
    ) -> (SelectionEngine, watch::Sender<Session>) {
        let (tx, rx) = watch::channel(session);
        let engine = SelectionEngine::new(Arc::new(provider), rx, EngineConfig::default());
        (engine, tx)
    }

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.load_timeout, Duration::from_secs(LOAD_TIMEOUT_SECS));

        let config = config.with_load_timeout(Duration::from_secs(5));
        assert_eq!(config.load_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_signed_out_load_is_noop() {
        let provider = SampleProvider::new();
        let (engine, _tx) = engine_with(provider.clone(), Session::signed_out());

        engine.load().await.unwrap();

        let state = engine.snapshot();
        assert_eq!(state.phase, LoadPhase::Idle);
        assert!(state.error.is_none());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_authenticated_without_token_is_unauthorized() {
        let provider = SampleProvider::new();
        let session = Session {
            is_authenticated: true,
            ..Session::default()
        };
        let (engine, _tx) = engine_with(provider.clone(), session);

        let err = engine.load().await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(engine.snapshot().phase, LoadPhase::Error);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_load_populates_state() {
        let (engine, _tx) = engine_with(SampleProvider::new(), signed_in());

        engine.load().await.unwrap();

        let state = engine.snapshot();
        assert_eq!(state.phase, LoadPhase::Ready);
        assert_eq!(state.display_images.len(), 5);
        assert_eq!(state.available_people.len(), 4);
        assert_eq!(state.skipped.len(), 1);
        assert_eq!(engine.gallery_items().len(), 5);
        assert!(!engine.is_empty());
    }

    #[tokio::test]
    async fn test_select_person_does_not_fetch() {
        let provider = SampleProvider::new();
        let (engine, _tx) = engine_with(provider.clone(), signed_in());
        engine.load().await.unwrap();

        let kai = engine
            .snapshot()
            .available_people
            .into_iter()
            .find(|p| p.display_name == "Kai Chen")
            .unwrap();
        engine.select_person(Some(kai));

        assert_eq!(provider.call_count(), 1);
        let gallery = engine.gallery_items();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].alt_text, "whiteboard.webp shared by Kai Chen");
    }

    #[tokio::test]
    async fn test_events_follow_load_and_selection() {
        let (engine, _tx) = engine_with(SampleProvider::with_items(sample_items()), signed_in());
        let mut events = engine.subscribe();

        engine.load().await.unwrap();
        engine.select_person(None);

        assert_eq!(events.recv().await.unwrap(), StateEvent::LoadStarted { request: 1 });
        assert!(matches!(
            events.recv().await.unwrap(),
            StateEvent::LoadFinished {
                request: 1,
                image_count: 5,
                people_count: 4,
                skipped_count: 1,
            }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            StateEvent::SelectionChanged { identifier: None }
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_state() {
        let (engine, _tx) = engine_with(SampleProvider::new(), signed_in());
        engine.load().await.unwrap();

        engine.sign_out();

        let state = engine.snapshot();
        assert_eq!(state.phase, LoadPhase::Idle);
        assert!(state.display_images.is_empty());
        assert!(state.available_people.is_empty());
    }
}
