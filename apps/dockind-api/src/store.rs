//! In-memory persistence for classification results

use crate::models::ClassificationResult;
use std::sync::RwLock;

/// Records completed classifications and lists them back in insertion
/// order
pub trait ResultStore: Send + Sync {
    fn record(&self, result: ClassificationResult);
    fn list_all(&self) -> Vec<ClassificationResult>;
}

/// Process-local store, cleared on restart
#[derive(Default)]
pub struct MemoryResultStore {
    results: RwLock<Vec<ClassificationResult>>,
}

impl ResultStore for MemoryResultStore {
    fn record(&self, result: ClassificationResult) {
        let mut results = self.results.write().unwrap_or_else(|e| e.into_inner());
        results.push(result);
    }

    fn list_all(&self) -> Vec<ClassificationResult> {
        self.results
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
