//! Central server state
//!
//! Wires the pipeline components to their domain-store collaborators. The
//! default constructor uses the in-memory stores; tests swap in failing
//! collaborators through [`JournalHub::with_stores`].

use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::context::ContextAggregator;
use crate::domain::{
    HabitDirectory, InMemoryHabits, InMemoryJournal, InMemoryMedia, InMemoryMoods, InMemoryTodos,
    JournalDirectory, MediaDirectory, MoodDirectory, TodoDirectory,
};
use crate::engine::AnalysisGateway;
use crate::persist::ActionPersister;
use crate::preferences::PreferenceStore;
use crate::rate_limit::RateLimiter;

/// Central state for the journal server
pub struct JournalHub {
    config: ServerConfig,
    started_at: Instant,

    /// Admission gate - the only cross-request shared mutable core state
    pub rate_limiter: RateLimiter,

    /// Per-user suggestion preferences
    pub preferences: PreferenceStore,

    /// External analysis engine gateway
    pub gateway: AnalysisGateway,

    /// Cross-domain snapshot composer
    pub aggregator: ContextAggregator,

    /// Confirmed-candidate persister
    pub persister: ActionPersister,

    /// Journal entry store (also used by the CRUD passthrough)
    pub journals: Arc<dyn JournalDirectory>,
}

impl JournalHub {
    /// Create a hub backed by fresh in-memory stores
    pub fn new(config: ServerConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(InMemoryTodos::default()),
            Arc::new(InMemoryMoods::default()),
            Arc::new(InMemoryHabits::default()),
            Arc::new(InMemoryMedia::default()),
            Arc::new(InMemoryJournal::default()),
        )
    }

    /// Create a hub with explicit store collaborators
    pub fn with_stores(
        config: ServerConfig,
        todos: Arc<dyn TodoDirectory>,
        moods: Arc<dyn MoodDirectory>,
        habits: Arc<dyn HabitDirectory>,
        media: Arc<dyn MediaDirectory>,
        journals: Arc<dyn JournalDirectory>,
    ) -> Self {
        let gateway = AnalysisGateway::new(&config);
        let aggregator = ContextAggregator::new(
            todos.clone(),
            moods.clone(),
            habits.clone(),
            media.clone(),
            journals.clone(),
        );
        let persister = ActionPersister::new(todos, moods, habits, media);

        Self {
            config,
            started_at: Instant::now(),
            rate_limiter: RateLimiter::new(),
            preferences: PreferenceStore::new(),
            gateway,
            aggregator,
            persister,
            journals,
        }
    }

    /// Check admission for (caller, class), mapping denial to a 429
    pub fn admit(
        &self,
        identity: &crate::auth::Identity,
        class: crate::rate_limit::EndpointClass,
    ) -> Result<(), crate::errors::AppError> {
        use crate::rate_limit::{Admission, retry_after_secs};

        match self.rate_limiter.admit(&identity.user_id, class) {
            Admission::Allowed => Ok(()),
            Admission::Denied { retry_after } => {
                crate::metrics::RATE_LIMITED_TOTAL
                    .with_label_values(&[class.as_str()])
                    .inc();
                tracing::debug!(
                    user_id = %identity.user_id,
                    class = class.as_str(),
                    "Admission denied"
                );
                Err(crate::errors::AppError::RateLimited {
                    retry_after_secs: retry_after_secs(retry_after),
                })
            }
        }
    }

    pub fn server_config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
