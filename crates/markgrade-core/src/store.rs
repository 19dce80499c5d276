//! Append-only result log.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::GradingResult;

/// Where graded results accumulate until they are exported.
///
/// Appends must be atomic and visible to every later snapshot.
pub trait ResultStore: Send + Sync {
    /// Record a graded submission.
    fn append(&self, result: GradingResult);

    /// Copy of every result recorded so far, in append order.
    fn snapshot(&self) -> Vec<GradingResult>;

    /// Drop every recorded result.
    fn clear(&self);

    fn len(&self) -> usize {
        self.snapshot().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`ResultStore`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: Mutex<Vec<GradingResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic mid-append cannot leave a half-written entry, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<GradingResult>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultStore for InMemoryResultStore {
    fn append(&self, result: GradingResult) {
        self.lock().push(result);
    }

    fn snapshot(&self) -> Vec<GradingResult> {
        self.lock().clone()
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
