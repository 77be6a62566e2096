//! Applies control-plane pod updates to the spec cache.
//!
//! The transport that delivers [`PodUpdate`] messages to the node lives
//! outside this crate; the listener consumes an in-process
//! channel and keeps the [`PodSpecCache`] current so the relist loop always
//! diffs against the latest published intent.

use std::sync::Arc;

use common::PodUpdate;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::spec_cache::PodSpecCache;

/// Background task that drains pod updates into the spec cache.
pub struct PodUpdateListener {
    spec_cache: Arc<PodSpecCache>,
    update_rx: Option<UnboundedReceiver<PodUpdate>>,
    task_handle: Option<JoinHandle<()>>,
    stop_signal_tx: Option<oneshot::Sender<()>>,
}

impl PodUpdateListener {
    pub fn new(spec_cache: Arc<PodSpecCache>, update_rx: UnboundedReceiver<PodUpdate>) -> Self {
        Self {
            spec_cache,
            update_rx: Some(update_rx),
            task_handle: None,
            stop_signal_tx: None,
        }
    }

    /// Starts draining updates as a background tokio task.
    ///
    /// The task runs until [`Self::stop`] is called or the update channel
    /// closes.
    pub fn run(&mut self) {
        if let Some(handle) = &self.task_handle {
            if !handle.is_finished() {
                warn!("[listener] run() called while already running; ignoring.");
                return;
            }
            self.task_handle = None;
            self.stop_signal_tx = None;
        }

        let Some(mut update_rx) = self.update_rx.take() else {
            warn!("[listener] run() called after update receiver was consumed; cannot restart.");
            return;
        };

        let (stop_signal_tx, mut stop_signal_rx) = oneshot::channel();
        self.stop_signal_tx = Some(stop_signal_tx);
        let spec_cache = self.spec_cache.clone();

        debug!("[listener] Starting pod update loop");
        self.task_handle = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_signal_rx => {
                        debug!("[listener] Received stop signal, exiting update loop");
                        break;
                    }
                    update = update_rx.recv() => {
                        let Some(update) = update else {
                            debug!("[listener] Update channel closed, exiting update loop");
                            break;
                        };
                        apply_update(&spec_cache, update);
                    }
                }
            }
        }));
    }

    /// Signals the background task to stop.
    pub fn stop(&mut self) {
        if let Some(stop_signal_tx) = self.stop_signal_tx.take() {
            let _ = stop_signal_tx.send(());
        }
        if let Some(task_handle) = self.task_handle.take() {
            task_handle.abort();
        }
    }
}

impl Drop for PodUpdateListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn apply_update(spec_cache: &PodSpecCache, update: PodUpdate) {
    match update {
        PodUpdate::Apply(pod) => {
            info!(
                pod_uid = %pod.metadata.uid,
                pod_name = %pod.metadata.name,
                pod_namespace = %pod.metadata.namespace,
                "[listener] Applying pod spec"
            );
            spec_cache.put(pod.metadata.uid, *pod);
        }
        PodUpdate::Delete(pod_uid) => {
            info!(pod_uid = %pod_uid, "[listener] Removing pod spec");
            spec_cache.remove(pod_uid);
        }
    }
}
