//! Gate evaluation run on every clock tick.
//!
//! Rules are checked in a fixed order and the first one that applies decides
//! the tick:
//!
//! 1. a compiling build flushes everything pending
//! 2. busy, no solution, nothing pending, host in background, or debugging: wait
//! 3. documents edited again since their save are dropped
//! 4. inside the cooldown after a pass: flush
//! 5. a save younger than one tick may still be settling: wait
//! 6. otherwise the pending set is ready for a pass

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::SchedulerConfig;
use crate::host::Host;
use crate::state::SchedulerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Reformatting,
    SolutionInactive,
    NothingPending,
    HostInBackground,
    Debugging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    FlushedForBuild { dropped: usize },
    Blocked { reason: BlockReason },
    CooldownFlushed { dropped: usize },
    Settling,
    Ready,
}

pub fn evaluate<H: Host + ?Sized>(
    state: &mut SchedulerState,
    host: &H,
    config: &SchedulerConfig,
    now: DateTime<Utc>,
) -> GateDecision {
    if state.is_building() {
        let dropped = state.pending.clear();
        return GateDecision::FlushedForBuild { dropped };
    }

    if let Some(reason) = blocking_reason(state, host) {
        return GateDecision::Blocked { reason };
    }

    let unsaved = state
        .pending
        .discard_where(|document| host.is_saved(document) != Some(true));
    if !unsaved.is_empty() {
        debug!(count = unsaved.len(), "Dropped documents modified since save");
    }

    let in_cooldown = state
        .last_reformat_at
        .map(|last| now.signed_duration_since(last) < config.cooldown())
        .unwrap_or(false);
    if in_cooldown {
        let dropped = state.pending.clear();
        return GateDecision::CooldownFlushed { dropped };
    }

    if state.pending.is_empty() {
        return GateDecision::Blocked {
            reason: BlockReason::NothingPending,
        };
    }

    if state.pending.any_younger_than(now, config.tick_interval()) {
        return GateDecision::Settling;
    }

    GateDecision::Ready
}

fn blocking_reason<H: Host + ?Sized>(state: &SchedulerState, host: &H) -> Option<BlockReason> {
    if state.is_reformatting {
        return Some(BlockReason::Reformatting);
    }
    if !state.solution_active {
        return Some(BlockReason::SolutionInactive);
    }
    if state.pending.is_empty() {
        return Some(BlockReason::NothingPending);
    }
    // Activating windows while another application has focus would steal it.
    if !host.is_foreground() {
        return Some(BlockReason::HostInBackground);
    }
    if host.is_debugging() {
        return Some(BlockReason::Debugging);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentId, WindowHandle};
    use crate::error::HostError;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    struct ProbeHost {
        foreground: bool,
        debugging: bool,
        unsaved: HashSet<DocumentId>,
    }

    impl Default for ProbeHost {
        fn default() -> Self {
            Self {
                foreground: true,
                debugging: false,
                unsaved: HashSet::new(),
            }
        }
    }

    impl Host for ProbeHost {
        fn has_command(&self, _name: &str) -> bool {
            true
        }
        fn execute_command(&mut self, _name: &str) -> Result<(), HostError> {
            Ok(())
        }
        fn active_window(&self) -> Option<WindowHandle> {
            None
        }
        fn activate_window(&mut self, _window: &WindowHandle) -> Result<(), HostError> {
            Ok(())
        }
        fn activate_document(&mut self, _document: &DocumentId) -> Result<(), HostError> {
            Ok(())
        }
        fn is_saved(&self, document: &DocumentId) -> Option<bool> {
            Some(!self.unsaved.contains(document))
        }
        fn save_document(&mut self, _document: &DocumentId) -> Result<(), HostError> {
            Ok(())
        }
        fn is_foreground(&self) -> bool {
            self.foreground
        }
        fn is_debugging(&self) -> bool {
            self.debugging
        }
        fn notify_error(&mut self, _message: &str) {}
    }

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms)
            .single()
            .expect("valid timestamp")
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            tick_interval_ms: 500,
            ..SchedulerConfig::default()
        }
    }

    fn ready_state() -> SchedulerState {
        let mut state = SchedulerState::new();
        state.solution_active = true;
        state.pending.record_save(DocumentId::new("/repo/a.cs"), t(0));
        state
    }

    #[test]
    fn build_flushes_before_any_other_rule() {
        let mut state = ready_state();
        state.build_depth = 1;
        state.solution_active = false;

        let decision = evaluate(&mut state, &ProbeHost::default(), &config(), t(1_000));
        assert_eq!(decision, GateDecision::FlushedForBuild { dropped: 1 });
        assert!(state.pending.is_empty());
    }

    #[test]
    fn blocked_conditions_leave_pending_untouched() {
        let host = ProbeHost {
            foreground: false,
            ..ProbeHost::default()
        };
        let mut state = ready_state();
        assert_eq!(
            evaluate(&mut state, &host, &config(), t(1_000)),
            GateDecision::Blocked {
                reason: BlockReason::HostInBackground
            }
        );
        assert_eq!(state.pending.len(), 1);

        let mut state = ready_state();
        state.solution_active = false;
        assert_eq!(
            evaluate(&mut state, &ProbeHost::default(), &config(), t(1_000)),
            GateDecision::Blocked {
                reason: BlockReason::SolutionInactive
            }
        );

        let mut state = ready_state();
        state.is_reformatting = true;
        assert_eq!(
            evaluate(&mut state, &ProbeHost::default(), &config(), t(1_000)),
            GateDecision::Blocked {
                reason: BlockReason::Reformatting
            }
        );

        let host = ProbeHost {
            debugging: true,
            ..ProbeHost::default()
        };
        let mut state = ready_state();
        assert_eq!(
            evaluate(&mut state, &host, &config(), t(1_000)),
            GateDecision::Blocked {
                reason: BlockReason::Debugging
            }
        );
        assert_eq!(state.pending.len(), 1);
    }

    #[test]
    fn unsaved_documents_are_discarded() {
        let mut host = ProbeHost::default();
        host.unsaved.insert(DocumentId::new("/repo/a.cs"));
        let mut state = ready_state();
        state
            .pending
            .record_save(DocumentId::new("/repo/b.cs"), t(0));

        let decision = evaluate(&mut state, &host, &config(), t(1_000));
        assert_eq!(decision, GateDecision::Ready);
        assert!(!state.pending.contains(&DocumentId::new("/repo/a.cs")));
        assert!(state.pending.contains(&DocumentId::new("/repo/b.cs")));
    }

    #[test]
    fn all_unsaved_leaves_nothing_pending() {
        let mut host = ProbeHost::default();
        host.unsaved.insert(DocumentId::new("/repo/a.cs"));
        let mut state = ready_state();

        let decision = evaluate(&mut state, &host, &config(), t(1_000));
        assert_eq!(
            decision,
            GateDecision::Blocked {
                reason: BlockReason::NothingPending
            }
        );
    }

    #[test]
    fn cooldown_flushes_pending_saves() {
        let mut state = ready_state();
        state.last_reformat_at = Some(t(-1_000));

        let decision = evaluate(&mut state, &ProbeHost::default(), &config(), t(1_000));
        assert_eq!(decision, GateDecision::CooldownFlushed { dropped: 1 });
        assert!(state.pending.is_empty());
    }

    #[test]
    fn cooldown_expires_after_configured_window() {
        let mut state = ready_state();
        state.last_reformat_at = Some(t(1_000) - Duration::seconds(5));

        let decision = evaluate(&mut state, &ProbeHost::default(), &config(), t(1_000));
        assert_eq!(decision, GateDecision::Ready);
    }

    #[test]
    fn recent_save_waits_without_clearing() {
        let mut state = ready_state();
        state
            .pending
            .record_save(DocumentId::new("/repo/b.cs"), t(800));

        let decision = evaluate(&mut state, &ProbeHost::default(), &config(), t(1_000));
        assert_eq!(decision, GateDecision::Settling);
        assert_eq!(state.pending.len(), 2);

        let decision = evaluate(&mut state, &ProbeHost::default(), &config(), t(1_300));
        assert_eq!(decision, GateDecision::Ready);
    }
}
