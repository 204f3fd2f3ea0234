//! Per-client admission control, differentiated by endpoint class
//!
//! Fixed-window counters keyed by (client, endpoint class). Buckets live in a
//! concurrent map; each admission locks its own entry, so increment-and-compare
//! is atomic per key and concurrent requests from the same client cannot
//! undercount.
//!
//! The real-time analysis class charges FAILED requests only: a client
//! retry-storming a broken payload is cut off within a window, while a
//! legitimate heavy writer is never throttled. All other classes charge every
//! request at admission.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::constants::{
    ANALYSIS_MAX_REQUESTS, ANALYSIS_WINDOW_SECS, CONTEXT_MAX_REQUESTS, CONTEXT_WINDOW_SECS,
    GENERAL_MAX_REQUESTS, GENERAL_WINDOW_SECS, SUGGESTIONS_MAX_REQUESTS, SUGGESTIONS_WINDOW_SECS,
};

/// Endpoint classes with independent window/max policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    /// POST /ai/analyze-journal - charges failed requests only
    RealtimeAnalysis,
    /// POST /ai/journal-prompt
    Suggestions,
    /// GET /journal/context
    ContextFetch,
    /// Everything else on the protected surface
    General,
}

impl EndpointClass {
    /// Window/max policy for this class
    pub fn policy(self) -> WindowPolicy {
        match self {
            Self::RealtimeAnalysis => WindowPolicy {
                window: Duration::from_secs(ANALYSIS_WINDOW_SECS),
                max: ANALYSIS_MAX_REQUESTS,
            },
            Self::Suggestions => WindowPolicy {
                window: Duration::from_secs(SUGGESTIONS_WINDOW_SECS),
                max: SUGGESTIONS_MAX_REQUESTS,
            },
            Self::ContextFetch => WindowPolicy {
                window: Duration::from_secs(CONTEXT_WINDOW_SECS),
                max: CONTEXT_MAX_REQUESTS,
            },
            Self::General => WindowPolicy {
                window: Duration::from_secs(GENERAL_WINDOW_SECS),
                max: GENERAL_MAX_REQUESTS,
            },
        }
    }

    /// Whether every admitted request is charged against the window.
    ///
    /// RealtimeAnalysis charges via [`RateLimiter::record_failure`] instead.
    fn charges_on_admission(self) -> bool {
        !matches!(self, Self::RealtimeAnalysis)
    }

    /// Label for metrics and logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RealtimeAnalysis => "realtime_analysis",
            Self::Suggestions => "suggestions",
            Self::ContextFetch => "context_fetch",
            Self::General => "general",
        }
    }
}

/// A fixed window with a request budget
#[derive(Debug, Clone, Copy)]
pub struct WindowPolicy {
    pub window: Duration,
    pub max: u32,
}

/// Admission outcome - denial is a normal, typed result, never an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[derive(Debug)]
struct Bucket {
    window_start: Instant,
    count: u32,
}

impl Bucket {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    /// Reset the window if it has elapsed
    fn roll(&mut self, now: Instant, policy: WindowPolicy) {
        if now.duration_since(self.window_start) >= policy.window {
            self.window_start = now;
            self.count = 0;
        }
    }

    fn remaining(&self, now: Instant, policy: WindowPolicy) -> Duration {
        (self.window_start + policy.window).saturating_duration_since(now)
    }
}

/// Process-wide admission gate
///
/// The only cross-request shared mutable state in the core. DashMap entry
/// access holds the shard lock for the duration of the update, which gives us
/// the required per-key atomicity.
pub struct RateLimiter {
    buckets: DashMap<(String, EndpointClass), Bucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Admit or deny a request for (client, class)
    pub fn admit(&self, client_id: &str, class: EndpointClass) -> Admission {
        self.admit_at(client_id, class, Instant::now())
    }

    /// Charge a failed request against the window (RealtimeAnalysis only)
    ///
    /// No-op for classes that already charge at admission.
    pub fn record_failure(&self, client_id: &str, class: EndpointClass) {
        if class.charges_on_admission() {
            return;
        }
        self.record_failure_at(client_id, class, Instant::now());
    }

    fn admit_at(&self, client_id: &str, class: EndpointClass, now: Instant) -> Admission {
        let policy = class.policy();
        let mut bucket = self
            .buckets
            .entry((client_id.to_string(), class))
            .or_insert_with(|| Bucket::new(now));

        bucket.roll(now, policy);

        if class.charges_on_admission() {
            bucket.count += 1;
            if bucket.count > policy.max {
                return Admission::Denied {
                    retry_after: bucket.remaining(now, policy),
                };
            }
        } else if bucket.count >= policy.max {
            return Admission::Denied {
                retry_after: bucket.remaining(now, policy),
            };
        }

        Admission::Allowed
    }

    fn record_failure_at(&self, client_id: &str, class: EndpointClass, now: Instant) {
        let policy = class.policy();
        let mut bucket = self
            .buckets
            .entry((client_id.to_string(), class))
            .or_insert_with(|| Bucket::new(now));

        bucket.roll(now, policy);
        bucket.count = bucket.count.saturating_add(1);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a retry hint to whole seconds for the client, rounding up so the
/// client never retries inside the same window.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}
