//! Runtime-observed pod snapshot types consumed by the PLEG differ.
//!
//! These types mirror what the container runtime reports, not what the API
//! server desires: a pod is a UID plus the containers the runtime currently
//! knows about, each carrying the runtime-assigned id, the encoded full name
//! (see [`crate::podutil`]) and a coarse state.

use uuid::Uuid;

/// Runtime-assigned identifier of a single container.
///
/// Opaque to the PLEG; a removed-and-recreated container gets a new id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Coarse container state as reported by the runtime probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Created,
    Exited,
    Unknown,
}

/// Observed status of a single container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    /// Runtime-assigned container id.
    pub id: ContainerId,
    /// Encoded full name; parse failure marks the container foreign.
    pub full_name: String,
    /// State at observation time.
    pub state: ContainerState,
}

/// Observed status of a pod: every container the runtime reports for it.
///
/// Container ordering carries no meaning; lookups go through
/// [`PodStatus::container_by_full_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodStatus {
    pub pod_uid: Uuid,
    pub containers: Vec<ContainerStatus>,
}

impl PodStatus {
    /// A snapshot with no containers, used for pods the runtime has not
    /// reported yet.
    pub fn empty(pod_uid: Uuid) -> Self {
        Self {
            pod_uid,
            containers: Vec::new(),
        }
    }

    /// Returns the container with the given full name, or `None`.
    pub fn container_by_full_name(&self, full_name: &str) -> Option<&ContainerStatus> {
        self.containers.iter().find(|c| c.full_name == full_name)
    }
}
