//! Pod Lifecycle Event Generator (PLEG).
//!
//! The PLEG reconciles two independent views of a worker node: the desired
//! state published by the control plane (read from the
//! [`PodSpecCache`]) and the observed state reported by the container
//! runtime (fetched through the [`RuntimeProbe`]). On a fixed interval it
//! *relists* the runtime, diffs every pod's snapshot against the previous
//! one and against the desired spec, and emits a [`PodLifecycleEvent`] per
//! actionable difference onto a bounded MPSC channel.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut pleg = Pleg::new(runtime, spec_cache, PlegConfig::default());
//! let event_rx = pleg.updates().expect("first consumer");
//! pleg.run();
//! // Drain event_rx continuously; a full channel blocks the relist task.
//! ```
//!
//! The channel bound is the backpressure mechanism: when the executor falls
//! behind, the relist task blocks on `send` instead of piling up events.

use std::sync::Arc;
use std::time::Duration;

use common::PodTask;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PlegConfig;
use crate::history::StatusHistory;
use crate::pod::{ContainerId, ContainerState, PodStatus};
use crate::podutil;
use crate::runtime::RuntimeProbe;
use crate::spec_cache::PodSpecCache;

/// Discriminant for the kind of lifecycle change a [`PodLifecycleEvent`]
/// reports or requests.
///
/// The relist differ currently produces `ContainerNeedRemove`,
/// `ContainerNeedRestart`, `ContainerNeedCreateAndStart` and
/// `ContainerChanged`; the remaining variants complete the taxonomy shared
/// with the executor so the channel element type stays stable as diff rules
/// grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodLifecycleEventType {
    /// Container was observed entering `Running`.
    ContainerStarted,
    /// Container was observed entering `Exited`.
    ContainerDied,
    /// Container disappeared from the runtime.
    ContainerRemoved,
    /// Container exists but must be started.
    ContainerNeedStart,
    /// Exited container that the spec still declares.
    ContainerNeedRestart,
    /// Desired container absent from the runtime.
    ContainerNeedCreateAndStart,
    /// Observed container that is foreign or no longer desired.
    ContainerNeedRemove,
    /// Force a full reconciliation of the pod.
    PodSync,
    /// State change not classified by any rule above.
    ContainerChanged,
}

/// Payload of a [`PodLifecycleEvent`], varying with the event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventData {
    /// Runtime id of an observed container.
    ContainerId(ContainerId),
    /// Logical name of a container that does not exist yet
    /// (`ContainerNeedCreateAndStart`).
    ContainerName(String),
}

/// A single lifecycle event emitted by the relist differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodLifecycleEvent {
    /// UID of the pod this event belongs to.
    pub pod_uid: Uuid,
    /// The kind of change observed or required.
    pub event_type: PodLifecycleEventType,
    /// Accompanying container identity.
    pub data: EventData,
}

fn container_event(
    pod_uid: Uuid,
    event_type: PodLifecycleEventType,
    container_id: ContainerId,
) -> PodLifecycleEvent {
    PodLifecycleEvent {
        pod_uid,
        event_type,
        data: EventData::ContainerId(container_id),
    }
}

/// Pod Lifecycle Event Generator.
///
/// # Lifecycle
///
/// 1. Create with [`Pleg::new`], injecting the runtime probe, the spec cache
///    and the tuning knobs.
/// 2. Take the consumer half of the event channel with [`Pleg::updates`].
/// 3. Call [`Pleg::run`] to start the background relist loop.
/// 4. Call [`Pleg::stop`] (or drop the value) to cancel the loop.
pub struct Pleg {
    runtime: Arc<dyn RuntimeProbe>,
    spec_cache: Arc<PodSpecCache>,
    relist_interval: Duration,
    event_tx: Sender<PodLifecycleEvent>,
    event_rx: Option<Receiver<PodLifecycleEvent>>,
    relist_task_handle: Option<JoinHandle<()>>,
    stop_signal_tx: Option<oneshot::Sender<()>>,
}

struct RelistState {
    runtime: Arc<dyn RuntimeProbe>,
    spec_cache: Arc<PodSpecCache>,
    history: StatusHistory,
    event_tx: Sender<PodLifecycleEvent>,
}

/// How a single relist cycle ended.
enum RelistOutcome {
    /// Every observed pod was diffed and all events were enqueued.
    Completed,
    /// The stop signal arrived mid-cycle; remaining pods were skipped.
    Interrupted,
    /// The event channel has no consumer left; the relist task must die.
    ChannelClosed,
}

impl Pleg {
    /// Creates a new PLEG instance. The outbound channel is created here with
    /// the configured capacity so [`Pleg::updates`] works before [`Pleg::run`].
    pub fn new(
        runtime: Arc<dyn RuntimeProbe>,
        spec_cache: Arc<PodSpecCache>,
        config: PlegConfig,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity.max(1));
        Self {
            runtime,
            spec_cache,
            relist_interval: config.relist_interval,
            event_tx,
            event_rx: Some(event_rx),
            relist_task_handle: None,
            stop_signal_tx: None,
        }
    }

    /// Takes the consumer half of the event channel.
    ///
    /// The channel has exactly one consumer; the second and later calls
    /// return `None`.
    pub fn updates(&mut self) -> Option<Receiver<PodLifecycleEvent>> {
        self.event_rx.take()
    }

    /// Starts the background relist loop.
    ///
    /// If called while already running, the existing relist loop is stopped
    /// and a fresh loop is started. The fresh loop begins with an empty
    /// status history, so its first cycle treats every pod as newly observed.
    pub fn run(&mut self) {
        if let Some(handle) = &self.relist_task_handle {
            if !handle.is_finished() {
                warn!("[pleg] run() called while already running; restarting relist loop.");
                self.stop();
            } else {
                self.relist_task_handle = None;
                self.stop_signal_tx = None;
            }
        }

        let (stop_signal_tx, mut stop_signal_rx) = oneshot::channel();
        self.stop_signal_tx = Some(stop_signal_tx);

        let relist_interval = self.relist_interval;
        let mut state = RelistState {
            runtime: self.runtime.clone(),
            spec_cache: self.spec_cache.clone(),
            history: StatusHistory::new(),
            event_tx: self.event_tx.clone(),
        };

        debug!(relist_interval = ?relist_interval, "[pleg] Starting relist loop");
        self.relist_task_handle = Some(tokio::spawn(async move {
            loop {
                select! {
                    _ = &mut stop_signal_rx => {
                        debug!("[pleg] Received stop signal, exiting relist loop");
                        break;
                    }
                    _ = tokio::time::sleep(relist_interval) => {
                        match relist(&mut state, &mut stop_signal_rx).await {
                            Ok(RelistOutcome::Completed) => {}
                            Ok(RelistOutcome::Interrupted) => {
                                debug!("[pleg] Stop observed mid-relist, exiting relist loop");
                                break;
                            }
                            Ok(RelistOutcome::ChannelClosed) => {
                                error!("[pleg] Event channel closed while relisting; exiting relist loop");
                                break;
                            }
                            Err(e) => {
                                // transient runtime trouble: skip this cycle,
                                // retry on the next tick
                                error!(error = %e, "[pleg] Relist failed");
                            }
                        }
                    }
                }
            }
        }));
    }

    /// Signals the background relist loop to stop.
    pub fn stop(&mut self) {
        if let Some(stop_signal_tx) = self.stop_signal_tx.take() {
            let _ = stop_signal_tx.send(());
        }
        if let Some(relist_task_handle) = self.relist_task_handle.take() {
            relist_task_handle.abort();
        }
    }
}

impl Drop for Pleg {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs one relist cycle: probe the runtime, diff every pod, enqueue events.
///
/// A probe error aborts the cycle before any history mutation. The stop
/// signal is checked between pods so shutdown does not wait for a full
/// sweep, but an in-flight probe call is never interrupted.
async fn relist(
    state: &mut RelistState,
    stop_signal_rx: &mut oneshot::Receiver<()>,
) -> anyhow::Result<RelistOutcome> {
    debug!("[pleg] Relisting pods for lifecycle event detection");

    let mut observed = state.runtime.list_pod_statuses().await?;
    debug!(
        pod_count = observed.len(),
        "[pleg] Retrieved pod statuses from runtime"
    );

    // Seed an empty snapshot for every cached spec the runtime has not
    // reported yet, so brand-new pods get their containers created by relist
    // alone instead of waiting on out-of-band update handling.
    for pod_uid in state.spec_cache.uids() {
        observed
            .entry(pod_uid)
            .or_insert_with(|| PodStatus::empty(pod_uid));
    }

    let mut total_events = 0usize;
    for (pod_uid, pod_status) in observed {
        if stop_observed(stop_signal_rx) {
            return Ok(RelistOutcome::Interrupted);
        }

        let api_pod = state.spec_cache.get(pod_uid);
        let events = diff_pod(&mut state.history, api_pod.as_ref(), pod_status);
        total_events += events.len();

        for event in events {
            debug!(
                pod_uid = %event.pod_uid,
                event_type = ?event.event_type,
                data = ?event.data,
                "[pleg] Emitting pod lifecycle event"
            );
            if state.event_tx.send(event).await.is_err() {
                return Ok(RelistOutcome::ChannelClosed);
            }
        }
    }

    if total_events > 0 {
        info!(
            event_count = total_events,
            "[pleg] Detected pod lifecycle events"
        );
    }
    Ok(RelistOutcome::Completed)
}

fn stop_observed(stop_signal_rx: &mut oneshot::Receiver<()>) -> bool {
    // Ok(()) means stop was requested; Closed means the Pleg itself is gone.
    !matches!(
        stop_signal_rx.try_recv(),
        Err(oneshot::error::TryRecvError::Empty)
    )
}

/// Diffs one observed pod snapshot against the previous snapshot and the
/// desired spec, producing lifecycle events.
///
/// Events come out in a fixed order: one per observed container needing
/// action, then one `ContainerNeedCreateAndStart` per desired container the
/// runtime does not have, in spec order.
fn diff_pod(
    history: &mut StatusHistory,
    api_pod: Option<&PodTask>,
    observed: PodStatus,
) -> Vec<PodLifecycleEvent> {
    let pod_uid = observed.pod_uid;
    let record = history.update(pod_uid, observed);
    let previous = record.previous.clone();
    let current = record.current.clone();

    let mut events = Vec::new();

    let Some(api_pod) = api_pod else {
        // The pod is no longer desired. Tear down everything observed and
        // forget the record. A first-ever sighting has no previous snapshot
        // yet; it is picked up on the next cycle once `previous` is
        // populated.
        if previous.is_some() {
            for cs in &current.containers {
                events.push(container_event(
                    pod_uid,
                    PodLifecycleEventType::ContainerNeedRemove,
                    cs.id.clone(),
                ));
            }
            history.remove(pod_uid);
        }
        return events;
    };

    // Desired container names not yet matched by an observed container.
    let mut pending_desired: Vec<&str> = Vec::new();
    for name in api_pod.spec.container_names() {
        if !pending_desired.contains(&name) {
            pending_desired.push(name);
        }
    }

    for cs in &current.containers {
        let Some(parsed) = podutil::parse_container_full_name(&cs.full_name) else {
            // The name does not decode: this container is foreign or
            // corrupted and must go, whatever its state.
            debug!(
                pod_uid = %pod_uid,
                container_id = %cs.id,
                full_name = %cs.full_name,
                "[pleg] Container full name failed to parse; marking for removal"
            );
            events.push(container_event(
                pod_uid,
                PodLifecycleEventType::ContainerNeedRemove,
                cs.id.clone(),
            ));
            continue;
        };

        let changed = match &previous {
            None => true,
            Some(prev) => prev
                .container_by_full_name(&cs.full_name)
                .is_none_or(|old| old.state != cs.state),
        };

        if changed {
            match cs.state {
                // Terminal healthy state; start is implicit.
                ContainerState::Running => {}
                ContainerState::Created => {
                    if api_pod.spec.container(&parsed.container_name).is_none() {
                        events.push(container_event(
                            pod_uid,
                            PodLifecycleEventType::ContainerNeedRemove,
                            cs.id.clone(),
                        ));
                    }
                }
                ContainerState::Exited => {
                    if api_pod.spec.container(&parsed.container_name).is_some() {
                        events.push(container_event(
                            pod_uid,
                            PodLifecycleEventType::ContainerNeedRestart,
                            cs.id.clone(),
                        ));
                    }
                }
                ContainerState::Unknown => {
                    events.push(container_event(
                        pod_uid,
                        PodLifecycleEventType::ContainerChanged,
                        cs.id.clone(),
                    ));
                }
            }
        }

        pending_desired.retain(|name| *name != parsed.container_name);
    }

    // Whatever is still pending has no runtime counterpart at all.
    for name in pending_desired {
        events.push(PodLifecycleEvent {
            pod_uid,
            event_type: PodLifecycleEventType::ContainerNeedCreateAndStart,
            data: EventData::ContainerName(name.to_string()),
        });
    }

    events
}
