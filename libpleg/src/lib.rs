//! Pod Lifecycle Event Generator for a container-orchestration worker node.
//!
//! The PLEG periodically *relists* the container runtime, diffs the observed
//! container states of every pod against the desired pod specification held
//! in the [`spec_cache::PodSpecCache`], and emits [`pleg::PodLifecycleEvent`]s
//! onto a bounded channel for a downstream executor to act on.

pub mod config;
pub mod history;
pub mod listener;
pub mod pleg;
pub mod pod;
pub mod podutil;
pub mod runtime;
pub mod spec_cache;

// re-export selected public API
pub use config::PlegConfig;
pub use listener::PodUpdateListener;
pub use pleg::{EventData, Pleg, PodLifecycleEvent, PodLifecycleEventType};
pub use pod::{ContainerId, ContainerState, ContainerStatus, PodStatus};
pub use runtime::RuntimeProbe;
pub use spec_cache::PodSpecCache;
