//! Event router: host lifecycle notifications in, state mutations out.
//!
//! Routing is cheap and synchronous. It never touches the host and never
//! starts a pass; only the clock does that.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::SchedulerConfig;
use crate::host::{EventSource, HostEvent, HostEventKind, SubscriptionId};
use crate::state::SchedulerState;

#[derive(Debug, Default)]
pub struct EventRouter {
    subscriptions: Vec<SubscriptionId>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Subscribes one handler per event kind. Existing subscriptions are
    /// released first, so connecting twice never double-subscribes.
    pub fn connect<S: EventSource + ?Sized>(&mut self, source: &mut S) {
        self.disconnect(source);
        self.subscriptions = HostEventKind::ALL
            .iter()
            .map(|kind| source.subscribe(*kind))
            .collect();
        debug!(count = self.subscriptions.len(), "Event router connected");
    }

    /// Releases every held subscription exactly once. Returns how many were
    /// released; repeated calls release nothing.
    pub fn disconnect<S: EventSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let released = self.subscriptions.len();
        for id in self.subscriptions.drain(..) {
            source.unsubscribe(id);
        }
        if released > 0 {
            debug!(count = released, "Event router disconnected");
        }
        released
    }

    pub fn route(
        &self,
        state: &mut SchedulerState,
        config: &SchedulerConfig,
        event: &HostEvent,
        now: DateTime<Utc>,
    ) {
        if !self.is_connected() {
            return;
        }

        match event {
            HostEvent::DocumentSaved { document } => {
                // Our own re-saves and build-driven saves must not re-enter the queue.
                if state.is_reformatting || state.is_building() {
                    debug!(document = %document, "Save ignored while busy");
                    return;
                }
                if config.is_allowed(document) {
                    state.pending.record_save(document.clone(), now);
                    debug!(document = %document, pending = state.pending.len(), "Save recorded");
                }
            }
            HostEvent::DocumentClosing { document } => {
                // A closed document has no window left to activate.
                if state.pending.remove(document) {
                    debug!(document = %document, "Pending document closed");
                }
            }
            HostEvent::BuildBegin { action, .. } => {
                if action.suppresses_reformat() {
                    state.build_depth = state.build_depth.saturating_add(1);
                    debug!(depth = state.build_depth, action = ?action, "Build started");
                }
            }
            HostEvent::BuildDone { action, .. } => {
                if action.suppresses_reformat() {
                    state.build_depth = state.build_depth.saturating_sub(1);
                    debug!(depth = state.build_depth, action = ?action, "Build finished");
                }
            }
            HostEvent::SolutionOpened => {
                state.solution_active = true;
            }
            HostEvent::SolutionBeforeClosing => {
                state.solution_active = false;
            }
        }
    }
}
