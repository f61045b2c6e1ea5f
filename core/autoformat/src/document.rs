use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Stable identity of an editor document: its full path as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self(full_name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension including the leading dot (`.cs`), or `None` when the
    /// path has no extension.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.0)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A host window, with the document it shows if it is a document window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowHandle {
    pub id: String,
    #[serde(default)]
    pub document: Option<DocumentId>,
}

impl WindowHandle {
    pub fn for_document(document: DocumentId) -> Self {
        Self {
            id: document.as_str().to_string(),
            document: Some(document),
        }
    }

    pub fn tool(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document: None,
        }
    }
}
