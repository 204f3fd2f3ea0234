//! Documented constants for the journal pipeline
//!
//! This module contains all tunable parameters with justification for their
//! values. Centralizing constants prevents magic numbers and makes tuning
//! easier.

// =============================================================================
// RATE LIMIT WINDOWS
// Fixed-window admission control, differentiated by endpoint class. Windows
// are deliberately coarse: the point is to shed retry storms and runaway
// clients, not to meter normal usage.
// =============================================================================

/// Real-time analysis: 30 requests per minute
///
/// Analysis calls fan out to the external engine and are the most expensive
/// operation in the system. Only failed requests are charged against this
/// window, so a client hammering a broken payload gets cut off quickly while
/// a legitimate heavy writer is never throttled.
pub const ANALYSIS_WINDOW_SECS: u64 = 60;
pub const ANALYSIS_MAX_REQUESTS: u32 = 30;

/// Prompt suggestions: 20 requests per 5 minutes
///
/// Prompts are generated at most once per journaling session in the UI;
/// anything past this rate is a client bug or abuse.
pub const SUGGESTIONS_WINDOW_SECS: u64 = 300;
pub const SUGGESTIONS_MAX_REQUESTS: u32 = 20;

/// Context fetch: 10 requests per minute
///
/// The context snapshot fans out to five domain stores. The UI needs it once
/// per page load.
pub const CONTEXT_WINDOW_SECS: u64 = 60;
pub const CONTEXT_MAX_REQUESTS: u32 = 10;

/// General API: 100 requests per 15 minutes
pub const GENERAL_WINDOW_SECS: u64 = 900;
pub const GENERAL_MAX_REQUESTS: u32 = 100;

// =============================================================================
// CONTEXT SNAPSHOT LIMITS
// The snapshot is rebuilt on every request; these caps bound both the store
// scans and the payload forwarded to the engine. Ordering within each
// sub-list is owned by the store (chronological / most-relevant-first) and
// must not be changed by the aggregator.
// =============================================================================

/// Upcoming todos included in the snapshot (soonest due date first)
pub const CONTEXT_TODOS_LIMIT: usize = 5;

/// Recent mood readings included in the snapshot (newest first)
///
/// A week of daily readings is enough for the engine to see a trend.
pub const CONTEXT_MOODS_LIMIT: usize = 7;

/// Active habits included in the snapshot
pub const CONTEXT_HABITS_LIMIT: usize = 10;

/// Recently tracked media included in the snapshot (newest first)
pub const CONTEXT_MEDIA_LIMIT: usize = 5;

/// Recent journal entries included in the snapshot (newest first)
///
/// Entries are passed to the engine unmodified, so this is kept small to
/// bound the prompt-generation payload.
pub const CONTEXT_JOURNALS_LIMIT: usize = 3;

// =============================================================================
// EXTERNAL ANALYSIS ENGINE
// =============================================================================

/// Default per-call timeout for the analysis engine (seconds)
///
/// Exceeding it is treated as a transport failure and folds into the
/// degrade/fallback path. 12s covers the engine's p99 under load while
/// keeping the worst-case user wait tolerable.
pub const ENGINE_TIMEOUT_SECS_DEFAULT: u64 = 12;

/// Default base URL for the analysis engine
pub const ENGINE_URL_DEFAULT: &str = "http://127.0.0.1:5005";

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default listen port
pub const SERVER_PORT_DEFAULT: u16 = 4040;

/// Default maximum concurrent in-flight requests
///
/// Backstop against resource exhaustion; normal load is far below this.
pub const MAX_CONCURRENT_REQUESTS_DEFAULT: usize = 200;
