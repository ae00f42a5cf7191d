//! Core types - pure abstractions shared across the codebase.

mod location;
mod state;

pub use location::{Location, PathRules, PathViolation};
pub use state::{is_shutdown, register_session, setup_shutdown_handler};
