//! Standard atmosphere toolkit.
//!
//! The model crate does the physics; this facade re-exports it alongside
//! configuration loading and profile export so front-ends (the CLI, or a future
//! drag-aware simulator) depend on one crate.

pub use atmo_config as config;
pub use atmo_core::{constants, units};
pub use atmo_export as export;
pub use atmo_model as model;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
