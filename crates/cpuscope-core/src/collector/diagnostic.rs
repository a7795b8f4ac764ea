//! Recorded reasons for fields that came back empty.
//!
//! Collection never fails outright: an unreadable source degrades to an empty
//! value. Each degradation is also recorded as a `Diagnostic` so callers and
//! tests can tell a missing sensor from a malformed file.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What went wrong with a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DiagnosticKind {
    /// File missing, unreadable, or permission denied.
    #[error("source unavailable: {reason}")]
    SourceUnavailable { reason: String },
    /// File readable but a record did not have the expected shape.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },
}

/// A degraded source and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}: {kind}", .path.display())]
pub struct Diagnostic {
    pub path: PathBuf,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn unavailable(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        Self {
            path: path.into(),
            kind: DiagnosticKind::SourceUnavailable {
                reason: err.to_string(),
            },
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: DiagnosticKind::MalformedRecord {
                reason: reason.into(),
            },
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.kind, DiagnosticKind::SourceUnavailable { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.kind, DiagnosticKind::MalformedRecord { .. })
    }

    /// True when this diagnostic is about `path`.
    pub fn concerns(&self, path: impl AsRef<Path>) -> bool {
        self.path == path.as_ref()
    }
}

/// A value read from one source plus the diagnostic explaining a fallback.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reading<T> {
    pub value: T,
    pub diagnostic: Option<Diagnostic>,
}

impl<T> Reading<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    pub fn degraded(value: T, diagnostic: Diagnostic) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }

    /// Moves the diagnostic (if any) into `sink` and returns the value.
    pub fn into_value(self, sink: &mut Vec<Diagnostic>) -> T {
        if let Some(diagnostic) = self.diagnostic {
            sink.push(diagnostic);
        }
        self.value
    }
}
