//! Boundary to the editor host.
//!
//! The scheduler never talks to an editor directly. Everything it needs is
//! expressed here: the automation calls it makes during a pass ([`Host`]),
//! the subscription registry it attaches to ([`EventSource`]), and the
//! lifecycle notifications the host delivers back ([`HostEvent`]).

use serde::{Deserialize, Serialize};

use crate::document::{DocumentId, WindowHandle};
use crate::error::HostError;

/// Editor automation primitives used by the scheduler.
pub trait Host {
    /// Whether `name` exists in the host's command registry.
    fn has_command(&self, name: &str) -> bool;

    /// Runs a named command against the active document.
    fn execute_command(&mut self, name: &str) -> Result<(), HostError>;

    fn active_window(&self) -> Option<WindowHandle>;

    fn activate_window(&mut self, window: &WindowHandle) -> Result<(), HostError>;

    fn activate_document(&mut self, document: &DocumentId) -> Result<(), HostError>;

    /// `None` when the host no longer knows the document.
    fn is_saved(&self, document: &DocumentId) -> Option<bool>;

    fn save_document(&mut self, document: &DocumentId) -> Result<(), HostError>;

    /// Whether the host application owns the OS foreground window.
    fn is_foreground(&self) -> bool;

    /// Whether the host is currently running a debug session.
    fn is_debugging(&self) -> bool {
        false
    }

    /// Non-blocking diagnostic for unexpected scheduler failures.
    fn notify_error(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildScope {
    Solution,
    Batch,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildAction {
    Build,
    RebuildAll,
    Clean,
    Deploy,
}

impl BuildAction {
    /// Actions that compile and therefore save documents on their own.
    pub fn suppresses_reformat(self) -> bool {
        matches!(
            self,
            BuildAction::Build | BuildAction::RebuildAll | BuildAction::Deploy
        )
    }
}

/// Lifecycle notifications delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    DocumentSaved { document: DocumentId },
    DocumentClosing { document: DocumentId },
    BuildBegin { scope: BuildScope, action: BuildAction },
    BuildDone { scope: BuildScope, action: BuildAction },
    SolutionOpened,
    SolutionBeforeClosing,
}

impl HostEvent {
    pub fn kind(&self) -> HostEventKind {
        match self {
            HostEvent::DocumentSaved { .. } => HostEventKind::DocumentSaved,
            HostEvent::DocumentClosing { .. } => HostEventKind::DocumentClosing,
            HostEvent::BuildBegin { .. } => HostEventKind::BuildBegin,
            HostEvent::BuildDone { .. } => HostEventKind::BuildDone,
            HostEvent::SolutionOpened => HostEventKind::SolutionOpened,
            HostEvent::SolutionBeforeClosing => HostEventKind::SolutionBeforeClosing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEventKind {
    DocumentSaved,
    DocumentClosing,
    BuildBegin,
    BuildDone,
    SolutionOpened,
    SolutionBeforeClosing,
}

impl HostEventKind {
    pub const ALL: [HostEventKind; 6] = [
        HostEventKind::DocumentSaved,
        HostEventKind::DocumentClosing,
        HostEventKind::BuildBegin,
        HostEventKind::BuildDone,
        HostEventKind::SolutionOpened,
        HostEventKind::SolutionBeforeClosing,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Host-side subscription registry.
pub trait EventSource {
    fn subscribe(&mut self, kind: HostEventKind) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);
}
