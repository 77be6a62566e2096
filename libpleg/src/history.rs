//! Per-pod status history spanning consecutive relist cycles.
//!
//! The differ detects *changes*, not states, so for every pod it needs the
//! snapshot from the immediately preceding relist next to the current one.
//! The history is owned exclusively by the relist task and needs no locking.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use uuid::Uuid;

use crate::pod::PodStatus;

/// The two most recent observations of one pod.
///
/// `previous` is `None` until the pod has been observed twice.
#[derive(Debug, Clone)]
pub struct StatusRecord {
    pub previous: Option<PodStatus>,
    pub current: PodStatus,
}

/// Maps pod UID to its [`StatusRecord`].
#[derive(Debug, Default)]
pub struct StatusHistory {
    records: HashMap<Uuid, StatusRecord>,
}

impl StatusHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new observation: shifts current to previous, or creates the
    /// record with `previous = None`. Returns the updated record.
    pub fn update(&mut self, pod_uid: Uuid, new_status: PodStatus) -> &StatusRecord {
        match self.records.entry(pod_uid) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                record.previous = Some(std::mem::replace(&mut record.current, new_status));
                record
            }
            Entry::Vacant(entry) => entry.insert(StatusRecord {
                previous: None,
                current: new_status,
            }),
        }
    }

    pub fn remove(&mut self, pod_uid: Uuid) {
        self.records.remove(&pod_uid);
    }

    pub fn get(&self, pod_uid: Uuid) -> Option<&StatusRecord> {
        self.records.get(&pod_uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::{ContainerId, ContainerState, ContainerStatus};

    fn make_status(pod_uid: Uuid, container_id: &str, state: ContainerState) -> PodStatus {
        PodStatus {
            pod_uid,
            containers: vec![ContainerStatus {
                id: ContainerId::from(container_id),
                full_name: format!("default_pod_{pod_uid}_{container_id}_0"),
                state,
            }],
        }
    }

    #[test]
    fn first_update_has_no_previous() {
        let mut history = StatusHistory::new();
        let pod_uid = Uuid::new_v4();

        let record = history.update(pod_uid, make_status(pod_uid, "c1", ContainerState::Created));
        assert!(record.previous.is_none());
        assert_eq!(record.current.containers[0].state, ContainerState::Created);
    }

    #[test]
    fn update_shifts_current_to_previous() {
        let mut history = StatusHistory::new();
        let pod_uid = Uuid::new_v4();

        history.update(pod_uid, make_status(pod_uid, "c1", ContainerState::Created));
        history.update(pod_uid, make_status(pod_uid, "c1", ContainerState::Running));
        let record = history.update(pod_uid, make_status(pod_uid, "c1", ContainerState::Exited));

        // previous is always the immediately preceding observation
        assert_eq!(
            record.previous.as_ref().unwrap().containers[0].state,
            ContainerState::Running
        );
        assert_eq!(record.current.containers[0].state, ContainerState::Exited);
    }

    #[test]
    fn remove_erases_record() {
        let mut history = StatusHistory::new();
        let pod_uid = Uuid::new_v4();

        history.update(pod_uid, make_status(pod_uid, "c1", ContainerState::Running));
        history.remove(pod_uid);
        assert!(history.get(pod_uid).is_none());
    }
}
