// Application state module
// Owns the activity store and cached configuration flags

use std::sync::atomic::AtomicBool;

use super::types::Config;
use crate::store::ActivityStore;

/// Application state shared across connections
pub struct AppState {
    pub config: Config,
    pub store: ActivityStore,

    // Cached config value for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Create `AppState` with the activity store seeded from the built-in catalog
    pub fn new(config: Config) -> Self {
        let cached_access_log = AtomicBool::new(config.logging.access_log);

        Self {
            config,
            store: ActivityStore::with_seed(),
            cached_access_log,
        }
    }
}
