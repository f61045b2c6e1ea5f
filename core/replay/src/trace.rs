//! JSON-lines trace format.
//!
//! ```text
//! # comment
//! {"at_ms": 0, "event": {"type": "solution_opened"}}
//! {"at_ms": 10, "event": {"type": "document_saved", "document": "/repo/a.cs"}}
//! {"at_ms": 1000, "tick": true}
//! ```

use autoformat_core::{DocumentId, HostEvent};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Largest accepted `at_ms`, roughly thirty years after the trace origin.
pub const MAX_AT_MS: i64 = 1_000_000_000_000;

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Failed to read trace {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Trace line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Trace line {line}: {message}")]
    Invalid { line: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceStep {
    Event(HostEvent),
    Tick,
    Edit(DocumentId),
    Focus(bool),
    Activate(DocumentId),
    Debugging(bool),
    Fail(DocumentId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub at_ms: i64,
    pub step: TraceStep,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLine {
    at_ms: i64,
    #[serde(default)]
    event: Option<HostEvent>,
    #[serde(default)]
    tick: Option<bool>,
    #[serde(default)]
    edit: Option<DocumentId>,
    #[serde(default)]
    focus: Option<bool>,
    #[serde(default)]
    activate: Option<DocumentId>,
    #[serde(default)]
    debugging: Option<bool>,
    #[serde(default)]
    fail: Option<DocumentId>,
}

impl RawLine {
    fn into_step(self, line: usize) -> Result<TraceStep, TraceError> {
        let mut steps = Vec::new();
        if let Some(event) = self.event {
            steps.push(TraceStep::Event(event));
        }
        match self.tick {
            Some(true) => steps.push(TraceStep::Tick),
            Some(false) => {
                return Err(TraceError::Invalid {
                    line,
                    message: "\"tick\" must be true".to_string(),
                })
            }
            None => {}
        }
        if let Some(document) = self.edit {
            steps.push(TraceStep::Edit(document));
        }
        if let Some(focused) = self.focus {
            steps.push(TraceStep::Focus(focused));
        }
        if let Some(document) = self.activate {
            steps.push(TraceStep::Activate(document));
        }
        if let Some(debugging) = self.debugging {
            steps.push(TraceStep::Debugging(debugging));
        }
        if let Some(document) = self.fail {
            steps.push(TraceStep::Fail(document));
        }

        if steps.len() != 1 {
            return Err(TraceError::Invalid {
                line,
                message: format!("expected exactly one step, found {}", steps.len()),
            });
        }
        Ok(steps.remove(0))
    }
}

pub fn parse_trace(content: &str) -> Result<Vec<TraceEntry>, TraceError> {
    let mut entries = Vec::new();
    let mut last_at_ms = 0;

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parsed: RawLine =
            serde_json::from_str(trimmed).map_err(|source| TraceError::Parse { line, source })?;
        if !(0..=MAX_AT_MS).contains(&parsed.at_ms) {
            return Err(TraceError::Invalid {
                line,
                message: format!("at_ms {} outside 0..={}", parsed.at_ms, MAX_AT_MS),
            });
        }
        if parsed.at_ms < last_at_ms {
            return Err(TraceError::Invalid {
                line,
                message: format!("at_ms {} goes backwards", parsed.at_ms),
            });
        }
        last_at_ms = parsed.at_ms;

        let at_ms = parsed.at_ms;
        entries.push(TraceEntry {
            at_ms,
            step: parsed.into_step(line)?,
        });
    }

    Ok(entries)
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let content = fs_err::read_to_string(path).map_err(|source| TraceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&content)
}
