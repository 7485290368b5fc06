//! Batch enrichment pipeline
//!
//! Drives enrichment and embedding over the whole catalog with batching,
//! rate-limit pacing, and per-record failure isolation.
//!
//! Split into submodules:
//! - `processor`: batch iteration and per-record processing

mod processor;

pub use processor::{BatchProcessor, PipelineConfig};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation checked between records. Partial output
/// produced before the flag is raised stays valid.
#[derive(Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
