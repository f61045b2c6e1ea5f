//! Batch executor: one ordered reformat-and-resave pass.
//!
//! A pass drains the pending set into a private snapshot, so nothing it does
//! can disturb the live queue while iterating. The clock is stopped and
//! `is_reformatting` set for the whole pass; both are restored on every exit
//! path, including host failures partway through.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::QuiescenceClock;
use crate::config::SchedulerConfig;
use crate::document::DocumentId;
use crate::error::HostError;
use crate::host::Host;
use crate::state::SchedulerState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Documents attempted, in the order they were attempted.
    pub order: Vec<DocumentId>,
    pub reformatted: Vec<DocumentId>,
    pub failed: Vec<DocumentId>,
    /// Closed between being queued and being processed.
    pub skipped: Vec<DocumentId>,
    pub saved: Vec<DocumentId>,
    pub focus_restored: bool,
}

pub fn run_batch<H: Host + ?Sized>(
    state: &mut SchedulerState,
    clock: &mut QuiescenceClock,
    host: &mut H,
    config: &SchedulerConfig,
    now: DateTime<Utc>,
) -> Result<BatchReport, HostError> {
    state.is_reformatting = true;
    clock.stop();
    // Anchored at the start so the pass's own re-saves land inside the cooldown.
    state.last_reformat_at = Some(now);

    let snapshot = state.pending.drain_oldest_first();
    info!(count = snapshot.len(), "Reformat pass started");

    let mut report = BatchReport::default();
    let result = reformat_snapshot(host, config, &snapshot, &mut report);

    clock.start();
    state.is_reformatting = false;

    match result {
        Ok(()) => {
            info!(
                reformatted = report.reformatted.len(),
                failed = report.failed.len(),
                skipped = report.skipped.len(),
                saved = report.saved.len(),
                focus_restored = report.focus_restored,
                "Reformat pass finished"
            );
            Ok(report)
        }
        Err(err) => {
            warn!(
                error = %err,
                attempted = report.order.len(),
                "Reformat pass aborted"
            );
            Err(err)
        }
    }
}

/// The user's focused document goes last so the window they are looking at
/// flickers once, at the end. It is only included if it was itself queued.
pub fn processing_order(
    snapshot: &[DocumentId],
    active_document: Option<&DocumentId>,
) -> Vec<DocumentId> {
    let mut order: Vec<DocumentId> = snapshot
        .iter()
        .filter(|document| Some(*document) != active_document)
        .cloned()
        .collect();
    if let Some(active) = active_document {
        if snapshot.contains(active) {
            order.push(active.clone());
        }
    }
    order
}

fn reformat_snapshot<H: Host + ?Sized>(
    host: &mut H,
    config: &SchedulerConfig,
    snapshot: &[DocumentId],
    report: &mut BatchReport,
) -> Result<(), HostError> {
    let original_window = host.active_window();
    let active_document = original_window
        .as_ref()
        .and_then(|window| window.document.as_ref());
    report.order = processing_order(snapshot, active_document);

    let order = report.order.clone();
    for document in &order {
        match host.activate_document(document) {
            Ok(()) => {}
            Err(HostError::DocumentClosed(_)) => {
                debug!(document = %document, "Document closed before reformat");
                report.skipped.push(document.clone());
                continue;
            }
            Err(err) => return Err(err),
        }

        match host.execute_command(&config.reformat_command) {
            Ok(()) => report.reformatted.push(document.clone()),
            Err(err) => {
                warn!(document = %document, error = %err, "Reformat command failed");
                report.failed.push(document.clone());
            }
        }
    }

    if config.save_after_reformat {
        for document in &order {
            if host.is_saved(document) != Some(false) {
                continue;
            }
            match host.save_document(document) {
                Ok(()) => report.saved.push(document.clone()),
                Err(HostError::DocumentClosed(_)) => {
                    debug!(document = %document, "Document closed before re-save");
                }
                Err(err) => return Err(err),
            }
        }
    }

    if let Some(window) = original_window.as_ref() {
        host.activate_window(window)?;
        report.focus_restored = true;
    }

    Ok(())
}
