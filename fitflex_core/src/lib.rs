#![forbid(unsafe_code)]

//! Core domain model and business logic for the FitFlex workout tracker.
//!
//! This crate provides:
//! - Domain types (templates, sets, sessions, records, summaries)
//! - The live workout session state machine
//! - Progress aggregation over completed sessions
//! - Workout catalog
//! - Persistence (record store, suspended sessions, CSV export)
//! - An external clock driver for live sessions

pub mod types;
pub mod error;
pub mod set;
pub mod session;
pub mod record;
pub mod progress;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod snapshot;
pub mod export;
pub mod clock;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use set::ExerciseSet;
pub use session::{format_elapsed, WorkoutExercise, WorkoutSession};
pub use catalog::{build_default_catalog, get_default_catalog, Catalog, CatalogFilter};
pub use config::Config;
pub use progress::{build_report, recent_history, summarize, ProgressOptions, ProgressReport};
pub use store::{JsonlStore, MemoryStore, SessionStore};
pub use clock::{ClockDriver, SharedSession};
