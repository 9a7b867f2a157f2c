//! The lighting target owned by the host.

use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError};

use super::LightingEnvironment;

/// Host scene whose base environment lighting can be updated.
///
/// Writes can fail, for example when no scene is active or the host rejects the update.
#[cfg_attr(test, mockall::automock)]
pub trait Scene {
    /// Apply all five environment parameters in one partial update.
    fn update_environment(&mut self, environment: &LightingEnvironment) -> Result<()>;
}

#[derive(Debug, Default)]
struct SceneRecord {
    inactive: bool,
    reject_remaining: usize,
    writes: Vec<LightingEnvironment>,
}

/// In-memory scene that records every accepted write.
///
/// Clones share the same record, so a test can keep one handle while the controller
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    record: Arc<Mutex<SceneRecord>>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_record<T>(&self, f: impl FnOnce(&mut SceneRecord) -> T) -> T {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut record)
    }

    /// Simulate the host having no active scene.
    pub fn set_active(&self, active: bool) {
        self.with_record(|record| record.inactive = !active);
    }

    /// Reject the next `count` writes.
    pub fn reject_next(&self, count: usize) {
        self.with_record(|record| record.reject_remaining = count);
    }

    pub fn writes(&self) -> Vec<LightingEnvironment> {
        self.with_record(|record| record.writes.clone())
    }

    pub fn write_count(&self) -> usize {
        self.with_record(|record| record.writes.len())
    }

    pub fn last_write(&self) -> Option<LightingEnvironment> {
        self.with_record(|record| record.writes.last().copied())
    }

    pub fn clear_writes(&self) {
        self.with_record(|record| record.writes.clear());
    }
}

impl Scene for MemoryScene {
    fn update_environment(&mut self, environment: &LightingEnvironment) -> Result<()> {
        self.with_record(|record| {
            if record.inactive {
                anyhow::bail!("no active scene");
            }
            if record.reject_remaining > 0 {
                record.reject_remaining -= 1;
                anyhow::bail!("scene update rejected");
            }
            record.writes.push(*environment);
            Ok(())
        })
    }
}
