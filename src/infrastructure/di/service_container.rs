//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CascadeEngine, HierarchyManager, TopologyService};
use crate::config::Settings;
use crate::infrastructure::file_store::FileNodeStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// File-backed node store at `settings.store_path`
    pub store: Arc<FileNodeStore>,

    pub hierarchy: Arc<HierarchyManager>,
    pub cascade: CascadeEngine,
    pub topology: TopologyService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with a custom filesystem (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> InfraResult<Self> {
        let settings = Arc::new(settings);
        let store = Arc::new(FileNodeStore::new(settings.store_path.clone(), fs));

        let hierarchy = Arc::new(HierarchyManager::new(store.clone(), settings.kind.clone()));
        let mut cascade = CascadeEngine::new(hierarchy.clone());
        if let Some(threads) = settings.batch_threads {
            cascade = cascade.with_batch_threads(threads)?;
        }
        let topology = TopologyService::new(hierarchy.clone());

        Ok(Self {
            settings,
            store,
            hierarchy,
            cascade,
            topology,
        })
    }
}
