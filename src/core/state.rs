// Application state (AppState)

use crate::core::config::Config;
use crate::journal::journal::Journal;
use crate::matching::vocabulary::Vocabulary;
use crate::metrics::collector::Metrics;
use crate::stores::presence::PresenceStore;
use std::sync::Arc;

/// Shared application state
///
/// Contains all shared components that are accessed by request handlers.
/// All fields are wrapped in Arc for efficient cloning across threads.
#[derive(Clone)]
pub struct AppState {
    /// Presence table, keyed by student id
    pub presence: Arc<PresenceStore>,

    /// Interest vocabulary used for vectorization
    pub vocabulary: Arc<Vocabulary>,

    /// Append-only journal for persistence across restarts
    pub journal: Arc<Journal>,

    /// Metrics collector for tracking statistics
    pub metrics: Arc<Metrics>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, journal: Journal) -> Self {
        let config = Arc::new(config);

        let vocabulary = if config.matching.vocabulary.is_empty() {
            Vocabulary::open()
        } else {
            Vocabulary::closed(&config.matching.vocabulary)
        };

        Self {
            presence: Arc::new(PresenceStore::with_capacity(config.presence.table_capacity)),
            vocabulary: Arc::new(vocabulary),
            journal: Arc::new(journal),
            metrics: Arc::new(Metrics::new()),
            config,
        }
    }
}
