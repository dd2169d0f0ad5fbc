//! # shareview-state
//!
//! Selection state engine for shareview.
//!
//! [`SelectionEngine`] loads shared items through an injected
//! [`SharedItemsProvider`](shareview_core::SharedItemsProvider), runs the
//! mapping and grouping pipeline, and exposes a filterable view:
//!
//! ```text
//! Idle -> Loading -> Ready | Error
//!            ^          |
//!            +- refresh +
//! ```
//!
//! All transitions are applied by the pure [`reduce`] function. Overlapping
//! loads resolve to the one started last.

pub mod engine;
pub mod events;
pub mod state;

pub use engine::{EngineConfig, SelectionEngine};
pub use events::{EventBus, StateEvent};
pub use state::{reduce, Action, LoadPhase, SelectionState};
