//! Application state and shared resources.

use ceiling_common::{CoverageArea, FormDefaults};
use ceiling_engine::{EngineConfig, EngineInvoker};
use dataset_cache::{DatasetCache, RefresherConfig};

/// Shared application state.
///
/// The dataset cache is the only resource shared between requests; the
/// engine invoker and validator are stateless.
pub struct AppState {
    pub cache: DatasetCache,
    pub engine: EngineInvoker,
    pub coverage: CoverageArea,
    pub defaults: FormDefaults,
}

impl AppState {
    pub fn new(refresher: RefresherConfig, engine: EngineConfig) -> Self {
        Self {
            cache: DatasetCache::new(refresher),
            engine: EngineInvoker::new(engine),
            coverage: CoverageArea::conus(),
            defaults: FormDefaults::default(),
        }
    }
}
