//! In-memory editor used by the replay driver.

use autoformat_core::{
    DocumentId, EventSource, Host, HostError, HostEventKind, SubscriptionId, WindowHandle,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum SimAction {
    Activate(DocumentId),
    Reformat(DocumentId),
    ReformatFailed(DocumentId),
    Save(DocumentId),
    RestoreWindow(String),
    Notify(String),
}

#[derive(Debug)]
pub struct SimHost {
    commands: Vec<String>,
    documents: HashMap<DocumentId, bool>,
    active: Option<WindowHandle>,
    foreground: bool,
    debugging: bool,
    failing: HashSet<DocumentId>,
    actions: Vec<SimAction>,
}

impl SimHost {
    pub fn new(commands: Vec<String>) -> Self {
        Self {
            commands,
            documents: HashMap::new(),
            active: None,
            foreground: true,
            debugging: false,
            failing: HashSet::new(),
            actions: Vec::new(),
        }
    }

    pub fn mark_saved(&mut self, document: &DocumentId) {
        self.documents.insert(document.clone(), true);
    }

    pub fn mark_edited(&mut self, document: &DocumentId) {
        self.documents.insert(document.clone(), false);
    }

    pub fn close(&mut self, document: &DocumentId) {
        self.documents.remove(document);
        let was_active = self
            .active
            .as_ref()
            .and_then(|window| window.document.as_ref())
            .map(|active| active == document)
            .unwrap_or(false);
        if was_active {
            self.active = None;
        }
    }

    /// Brings a document's window to the front, opening it if needed.
    pub fn show(&mut self, document: &DocumentId) {
        self.documents.entry(document.clone()).or_insert(true);
        self.active = Some(WindowHandle::for_document(document.clone()));
    }

    pub fn set_foreground(&mut self, foreground: bool) {
        self.foreground = foreground;
    }

    pub fn set_debugging(&mut self, debugging: bool) {
        self.debugging = debugging;
    }

    pub fn fail_on(&mut self, document: DocumentId) {
        self.failing.insert(document);
    }

    pub fn actions(&self) -> &[SimAction] {
        &self.actions
    }
}

impl Host for SimHost {
    fn has_command(&self, name: &str) -> bool {
        self.commands.iter().any(|command| command == name)
    }

    fn execute_command(&mut self, name: &str) -> Result<(), HostError> {
        let document = self
            .active
            .as_ref()
            .and_then(|window| window.document.clone())
            .ok_or_else(|| HostError::CommandFailed {
                command: name.to_string(),
                details: "no active document".to_string(),
            })?;

        if self.failing.contains(&document) {
            self.actions.push(SimAction::ReformatFailed(document));
            return Err(HostError::CommandFailed {
                command: name.to_string(),
                details: "simulated failure".to_string(),
            });
        }

        self.actions.push(SimAction::Reformat(document.clone()));
        self.documents.insert(document, false);
        Ok(())
    }

    fn active_window(&self) -> Option<WindowHandle> {
        self.active.clone()
    }

    fn activate_window(&mut self, window: &WindowHandle) -> Result<(), HostError> {
        if let Some(document) = window.document.as_ref() {
            if !self.documents.contains_key(document) {
                return Err(HostError::WindowUnavailable(window.id.clone()));
            }
        }
        self.actions.push(SimAction::RestoreWindow(window.id.clone()));
        self.active = Some(window.clone());
        Ok(())
    }

    fn activate_document(&mut self, document: &DocumentId) -> Result<(), HostError> {
        if !self.documents.contains_key(document) {
            return Err(HostError::DocumentClosed(document.clone()));
        }
        self.actions.push(SimAction::Activate(document.clone()));
        self.active = Some(WindowHandle::for_document(document.clone()));
        Ok(())
    }

    fn is_saved(&self, document: &DocumentId) -> Option<bool> {
        self.documents.get(document).copied()
    }

    fn save_document(&mut self, document: &DocumentId) -> Result<(), HostError> {
        match self.documents.get_mut(document) {
            Some(saved) => {
                *saved = true;
                self.actions.push(SimAction::Save(document.clone()));
                Ok(())
            }
            None => Err(HostError::DocumentClosed(document.clone())),
        }
    }

    fn is_foreground(&self) -> bool {
        self.foreground
    }

    fn is_debugging(&self) -> bool {
        self.debugging
    }

    fn notify_error(&mut self, message: &str) {
        self.actions.push(SimAction::Notify(message.to_string()));
    }
}

/// Subscription registry that only tracks which handlers are live.
#[derive(Debug, Default)]
pub struct SimEvents {
    next_id: u64,
    live: HashMap<SubscriptionId, HostEventKind>,
}

impl SimEvents {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl EventSource for SimEvents {
    fn subscribe(&mut self, kind: HostEventKind) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.live.insert(id, kind);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.live.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reformat_marks_active_document_modified() {
        let mut host = SimHost::new(vec!["Cleanup".to_string()]);
        let doc = DocumentId::new("/repo/a.cs");
        host.show(&doc);

        host.execute_command("Cleanup").expect("reformat");
        assert_eq!(host.is_saved(&doc), Some(false));
        host.save_document(&doc).expect("save");
        assert_eq!(host.is_saved(&doc), Some(true));
        assert_eq!(
            host.actions(),
            &[SimAction::Reformat(doc.clone()), SimAction::Save(doc)]
        );
    }

    #[test]
    fn closed_document_cannot_be_activated() {
        let mut host = SimHost::new(Vec::new());
        let doc = DocumentId::new("/repo/a.cs");
        host.show(&doc);
        host.close(&doc);

        assert!(matches!(
            host.activate_document(&doc),
            Err(HostError::DocumentClosed(_))
        ));
        assert_eq!(host.active_window(), None);
    }
}
