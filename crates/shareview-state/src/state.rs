//! Selection state and its pure transition function.
//!
//! Every mutation of [`SelectionState`] goes through [`reduce`]. The engine
//! owns the only instance and wraps each call in its lock.

use serde::Serialize;

use shareview_core::{GalleryBuild, MappingIssue, Person, SharedImage};

/// Where the engine is in its load cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// State exposed to the UI.
///
/// `display_images` is always the full image set filtered by
/// `selected_person`; nothing else writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub phase: LoadPhase,
    /// `None` means "show all".
    pub selected_person: Option<Person>,
    pub display_images: Vec<SharedImage>,
    pub available_people: Vec<Person>,
    pub is_loading: bool,
    /// User-facing message from the last failed load, cleared by the next success.
    pub error: Option<String>,
    /// Items dropped by mapping in the last successful load.
    pub skipped: Vec<MappingIssue>,
    pub excluded_non_images: usize,
    /// Whether any load has succeeded since the last sign-out.
    pub has_loaded: bool,
    #[serde(skip)]
    all_images: Vec<SharedImage>,
    #[serde(skip)]
    latest_request: u64,
}

impl SelectionState {
    /// Every image from the last successful load, unfiltered.
    pub fn all_images(&self) -> &[SharedImage] {
        &self.all_images
    }

    /// Request number of the most recently started load.
    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    /// Loaded successfully but nothing was shared. Distinct from an error.
    pub fn is_empty(&self) -> bool {
        self.has_loaded && self.all_images.is_empty()
    }
}

/// Transitions accepted by [`reduce`].
#[derive(Debug, Clone)]
pub enum Action {
    LoadStarted { request: u64 },
    LoadSucceeded { request: u64, build: GalleryBuild },
    LoadFailed { request: u64, message: String },
    SelectPerson(Option<Person>),
    /// Clears all data; `request` supersedes any load still in flight.
    SignedOut { request: u64 },
}

/// Apply `action` to `state`.
///
/// Returns `false` when the action was discarded: a load result for a
/// request other than the latest one started, or a start older than it.
pub fn reduce(state: &mut SelectionState, action: Action) -> bool {
    match action {
        Action::LoadStarted { request } => {
            if request <= state.latest_request {
                return false;
            }
            state.latest_request = request;
            state.phase = LoadPhase::Loading;
            state.is_loading = true;
            true
        }
        Action::LoadSucceeded { request, build } => {
            if request != state.latest_request || !state.is_loading {
                return false;
            }
            state.available_people = build.people();
            state.all_images = build.images;
            state.skipped = build.issues;
            state.excluded_non_images = build.excluded_non_images;

            // Keep the selection when the same sharer is still present,
            // picking up their refreshed name and count.
            state.selected_person = state.selected_person.take().and_then(|selected| {
                find_person(&state.available_people, &selected.identifier).cloned()
            });
            state.display_images = filter_for(&state.all_images, state.selected_person.as_ref());

            state.error = None;
            state.has_loaded = true;
            state.is_loading = false;
            state.phase = LoadPhase::Ready;
            true
        }
        Action::LoadFailed { request, message } => {
            if request != state.latest_request || !state.is_loading {
                return false;
            }
            state.error = Some(message);
            state.is_loading = false;
            state.phase = LoadPhase::Error;
            true
        }
        Action::SelectPerson(person) => {
            state.selected_person =
                person.and_then(|p| find_person(&state.available_people, &p.identifier).cloned());
            state.display_images = filter_for(&state.all_images, state.selected_person.as_ref());
            true
        }
        Action::SignedOut { request } => {
            *state = SelectionState {
                latest_request: request.max(state.latest_request),
                ..SelectionState::default()
            };
            true
        }
    }
}

fn find_person<'a>(people: &'a [Person], identifier: &str) -> Option<&'a Person> {
    people.iter().find(|p| p.identifier == identifier)
}

fn filter_for(images: &[SharedImage], person: Option<&Person>) -> Vec<SharedImage> {
    match person {
        Some(person) => images.iter().filter(|i| person.shared(i)).cloned().collect(),
        None => images.to_vec(),
    }
}
