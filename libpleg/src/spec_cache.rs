//! Thread-safe cache of desired pod specifications.
//!
//! The cache is the PLEG's view of control-plane intent: the pod update
//! listener writes to it as messages arrive, the relist loop reads it once
//! per pod per cycle. A `get` returning `None` is a legitimate signal that
//! the pod was deleted and its containers must be torn down.

use common::PodTask;
use dashmap::DashMap;
use uuid::Uuid;

/// Maps pod UID to the latest published [`PodTask`].
///
/// Concurrent reads are safe and writers are serialized per shard; all
/// operations are total.
#[derive(Debug, Default)]
pub struct PodSpecCache {
    specs: DashMap<Uuid, PodTask>,
}

impl PodSpecCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the latest known spec for the pod, or `None`.
    pub fn get(&self, pod_uid: Uuid) -> Option<PodTask> {
        self.specs.get(&pod_uid).map(|s| s.value().clone())
    }

    /// Overwrites the cached spec for the pod.
    pub fn put(&self, pod_uid: Uuid, spec: PodTask) {
        self.specs.insert(pod_uid, spec);
    }

    /// Erases the cached spec for the pod.
    pub fn remove(&self, pod_uid: Uuid) {
        self.specs.remove(&pod_uid);
    }

    /// Snapshot of every cached pod UID.
    pub fn uids(&self) -> Vec<Uuid> {
        self.specs.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
