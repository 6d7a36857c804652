//! Service container for dependency injection
//!
//! Wires settings, the store and the hierarchy service together.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{HierarchyPolicy, HierarchyService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::json_store::JsonFileStore;
use crate::infrastructure::traits::{Registry, UnitStore};

/// Container holding all application services.
pub struct ServiceContainer<S = JsonFileStore> {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Backing store (units plus collaborator records)
    pub store: Arc<S>,

    /// The hierarchy engine
    pub hierarchy: HierarchyService<S>,
}

impl ServiceContainer<JsonFileStore> {
    /// Create a container backed by the JSON data file from `settings`.
    pub fn new(settings: Settings) -> ApplicationResult<Self> {
        debug!("opening data file {}", settings.data_file.display());
        let store = Arc::new(JsonFileStore::open(&settings.data_file)?);
        Ok(Self::with_store(settings, store))
    }
}

impl<S: UnitStore + Registry> ServiceContainer<S> {
    /// Create a service container over a given store (for testing).
    pub fn with_store(settings: Settings, store: Arc<S>) -> Self {
        let settings = Arc::new(settings);
        let hierarchy = HierarchyService::new(Arc::clone(&store), HierarchyPolicy::from(&*settings));

        Self {
            settings,
            store,
            hierarchy,
        }
    }
}
