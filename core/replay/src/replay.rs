//! Drives a scheduler through a parsed trace against a [`SimHost`].

use autoformat_core::{
    BatchReport, HostEvent, Scheduler, SchedulerConfig, SchedulerError, TickOutcome,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::sim_host::{SimAction, SimEvents, SimHost};
use crate::trace::{TraceEntry, TraceStep};

const TRACE_ORIGIN_MS: i64 = 1_767_225_600_000; // 2026-01-01T00:00:00Z

#[derive(Debug, Serialize)]
pub struct PassRecord {
    pub at_ms: i64,
    #[serde(flatten)]
    pub result: PassResult,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassResult {
    Completed { report: BatchReport },
    Aborted { message: String },
}

#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    pub ticks: usize,
    pub passes: Vec<PassRecord>,
    pub actions: Vec<SimAction>,
    pub pending_at_end: usize,
}

pub fn run(
    entries: &[TraceEntry],
    config: SchedulerConfig,
) -> Result<ReplaySummary, SchedulerError> {
    let origin = trace_origin();
    let host = SimHost::new(vec![config.reformat_command.clone()]);
    let mut events = SimEvents::default();
    let mut scheduler = Scheduler::new(host, config)?;
    scheduler.attach(&mut events)?;
    debug!(subscriptions = events.live_count(), "Replay attached");

    let mut ticks = 0;
    let mut passes = Vec::new();

    for entry in entries {
        let now = origin + Duration::milliseconds(entry.at_ms);
        match &entry.step {
            TraceStep::Event(event) => deliver(&mut scheduler, event, now),
            TraceStep::Tick => {
                ticks += 1;
                match scheduler.on_tick(now) {
                    TickOutcome::Completed { report } => passes.push(PassRecord {
                        at_ms: entry.at_ms,
                        result: PassResult::Completed { report },
                    }),
                    TickOutcome::Aborted { message } => passes.push(PassRecord {
                        at_ms: entry.at_ms,
                        result: PassResult::Aborted { message },
                    }),
                    TickOutcome::ClockStopped | TickOutcome::Skipped { .. } => {}
                }
            }
            TraceStep::Edit(document) => scheduler.host_mut().mark_edited(document),
            TraceStep::Focus(focused) => scheduler.host_mut().set_foreground(*focused),
            TraceStep::Activate(document) => scheduler.host_mut().show(document),
            TraceStep::Debugging(debugging) => scheduler.host_mut().set_debugging(*debugging),
            TraceStep::Fail(document) => scheduler.host_mut().fail_on(document.clone()),
        }
    }

    scheduler.detach(&mut events);
    info!(ticks, passes = passes.len(), "Replay finished");

    Ok(ReplaySummary {
        ticks,
        passes,
        actions: scheduler.host().actions().to_vec(),
        pending_at_end: scheduler.state().pending.len(),
    })
}

/// Applies the event's effect on the simulated editor, then routes it.
fn deliver(scheduler: &mut Scheduler<SimHost>, event: &HostEvent, now: DateTime<Utc>) {
    match event {
        HostEvent::DocumentSaved { document } => scheduler.host_mut().mark_saved(document),
        HostEvent::DocumentClosing { document } => scheduler.host_mut().close(document),
        _ => {}
    }
    scheduler.handle_event(event, now);
}

fn trace_origin() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(TRACE_ORIGIN_MS)
        .single()
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::parse_trace;
    use autoformat_core::DocumentId;

    fn replay(trace: &str) -> ReplaySummary {
        let entries = parse_trace(trace).expect("parse trace");
        let config = SchedulerConfig {
            tick_interval_ms: 500,
            ..SchedulerConfig::default()
        };
        run(&entries, config).expect("replay")
    }

    #[test]
    fn replays_a_single_pass_with_focus_restore() {
        let summary = replay(
            r#"
{"at_ms": 0, "event": {"type": "solution_opened"}}
{"at_ms": 0, "activate": "/repo/a.cs"}
{"at_ms": 0, "event": {"type": "document_saved", "document": "/repo/a.cs"}}
{"at_ms": 100, "event": {"type": "document_saved", "document": "/repo/b.xaml"}}
{"at_ms": 500, "tick": true}
{"at_ms": 1000, "tick": true}
"#,
        );

        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.passes.len(), 1);
        assert_eq!(summary.pending_at_end, 0);
        let a = DocumentId::new("/repo/a.cs");
        let b = DocumentId::new("/repo/b.xaml");
        assert_eq!(
            summary.actions,
            vec![
                SimAction::Activate(b.clone()),
                SimAction::Reformat(b.clone()),
                SimAction::Activate(a.clone()),
                SimAction::Reformat(a.clone()),
                SimAction::Save(b),
                SimAction::Save(a.clone()),
                SimAction::RestoreWindow(a.as_str().to_string()),
            ]
        );
    }

    #[test]
    fn failed_document_and_build_saves_are_not_retried() {
        let summary = replay(
            r#"
{"at_ms": 0, "event": {"type": "solution_opened"}}
{"at_ms": 0, "event": {"type": "document_saved", "document": "/repo/a.cs"}}
{"at_ms": 0, "fail": "/repo/a.cs"}
{"at_ms": 1000, "tick": true}
{"at_ms": 1500, "event": {"type": "build_begin", "scope": "solution", "action": "build"}}
{"at_ms": 1600, "event": {"type": "document_saved", "document": "/repo/b.cs"}}
{"at_ms": 9000, "tick": true}
"#,
        );

        assert_eq!(summary.passes.len(), 1);
        match &summary.passes[0].result {
            PassResult::Completed { report } => {
                assert_eq!(report.failed, vec![DocumentId::new("/repo/a.cs")]);
            }
            other => panic!("unexpected pass result: {:?}", other),
        }
        assert_eq!(summary.pending_at_end, 0);
    }
}
