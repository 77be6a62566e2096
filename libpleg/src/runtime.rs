//! Abstraction over the container runtime consulted during relist.

use std::collections::HashMap;

use uuid::Uuid;

use crate::pod::PodStatus;

/// The single capability the PLEG requires from a container runtime.
///
/// Implementations wrap whatever runtime the node runs (an OCI runtime, a
/// remote daemon, an in-memory fake for tests); the PLEG depends only on the
/// shape of the returned snapshot.
#[async_trait::async_trait]
pub trait RuntimeProbe: Send + Sync {
    /// Returns the observed status of every pod the runtime knows about,
    /// keyed by pod UID.
    ///
    /// Any error makes the PLEG skip the current relist cycle entirely:
    /// acting on partial runtime data risks spurious create/remove storms.
    async fn list_pod_statuses(&self) -> anyhow::Result<HashMap<Uuid, PodStatus>>;
}
