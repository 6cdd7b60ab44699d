//! Input dispatch: header text or persisted IR.

pub mod clean;
pub mod directive;
pub mod header;
pub mod json;
pub mod lexer;

use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::model::Document;
use std::path::Path;

/// What an input file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// C interface header.
    Header,
    /// Persisted IR document.
    Ir,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<InputKind> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("h") => Some(InputKind::Header),
            Some("json") => Some(InputKind::Ir),
            _ => None,
        }
    }

    /// Guess from content: IR documents are JSON objects.
    pub fn sniff(content: &str) -> InputKind {
        if content.trim_start().starts_with('{') {
            InputKind::Ir
        } else {
            InputKind::Header
        }
    }
}

/// Parse content of the given kind into a Document.
pub fn parse(kind: InputKind, content: &str, sink: &mut dyn DiagnosticSink) -> Result<Document> {
    match kind {
        InputKind::Header => Ok(header::decode(content, sink)),
        InputKind::Ir => json::parse(content),
    }
}
