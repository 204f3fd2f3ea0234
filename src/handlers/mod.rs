//! HTTP API handlers - modular organization of the REST API
//!
//! Each submodule handles one domain of the surface. Routes are split into
//! public (no auth) and protected (bearer auth required).

// Core modules
pub mod router;
pub mod state;
pub mod types;

// Surface
pub mod ai;
pub mod health;
pub mod journal;

// Re-export commonly used items
pub use router::{AppState, build_protected_routes, build_public_routes, build_router};
pub use state::JournalHub;
pub use types::*;
