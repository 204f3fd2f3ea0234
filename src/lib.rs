//! Reverie Journal
//!
//! AI-assisted journaling server. Turns free-form entry text and aggregated
//! user context into confidence-scored life-tracking candidates and an
//! adaptive next prompt, with the safety valves (admission control, graceful
//! degradation) that keep the surface usable when the upstream analysis
//! engine is slow, rate-limited, or unavailable.
//!
//! # Design invariants
//! - Engine failures never surface: analysis degrades to a canonical
//!   default, prompt generation falls back to a fixed prompt, both as
//!   HTTP 200.
//! - Confirmed actions never degrade: persistence failures surface loudly.
//! - Rate-limit buckets are the only cross-request shared mutable state.

pub mod auth;
pub mod config;
pub mod constants;
pub mod context;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod extraction;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod persist;
pub mod preferences;
pub mod prompt;
pub mod rate_limit;
pub mod validation;

// Re-export dependencies to ensure tests use the same version
pub use chrono;
pub use uuid;
