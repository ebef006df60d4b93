// In-memory pick store, used in tests and for dry runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{PickStore, StoreError};
use crate::draft::pick::PickMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    picks: Mutex<Option<PickMap>>,
    fail_reads: bool,
    fail_writes: bool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// An empty store. Reads return `StoreError::NotFound` until the first
    /// write.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_picks(picks: PickMap) -> Self {
        Self {
            picks: Mutex::new(Some(picks)),
            ..Self::default()
        }
    }

    /// Every read fails with a transport error.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Every write fails with `StoreError::WriteFailed`.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<PickMap> {
        self.picks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PickStore for MemoryStore {
    fn label(&self) -> String {
        "memory".to_string()
    }

    async fn read_picks(&self) -> Result<PickMap, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Transport("simulated read failure".into()));
        }
        self.stored().ok_or(StoreError::NotFound)
    }

    async fn write_picks(&self, picks: &PickMap) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteFailed {
                status: 500,
                message: "simulated write failure".into(),
            });
        }
        *self
            .picks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(picks.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
