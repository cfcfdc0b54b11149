//! Shared handler state

use golearn_core::{Catalog, CodeExecutor};
use golearn_progress::ProgressStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub executor: CodeExecutor,
    /// Progress routes are mounted only when a store is present
    pub progress: Option<Arc<dyn ProgressStore>>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, executor: CodeExecutor) -> Self {
        Self {
            catalog,
            executor,
            progress: None,
        }
    }

    pub fn with_progress(mut self, store: Arc<dyn ProgressStore>) -> Self {
        self.progress = Some(store);
        self
    }
}
