//! Non-fatal diagnostics reported while decoding a header.
//!
//! The decoder never prints anything itself; it hands each diagnostic to an
//! injected [`DiagnosticSink`]. The offending fragment is dropped and decoding
//! continues.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based source line.
    pub line: usize,
    pub kind: DiagnosticKind,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    #[error("no parent name after closing brace: {text}")]
    MissingParentName { text: String },
    #[error("closing brace without an open enum or struct")]
    UnmatchedClose,
    #[error("nested enum or struct is not supported")]
    NestedBlock,
    #[error("input ended inside an unterminated {kind}")]
    UnterminatedBlock { kind: &'static str },
    #[error("unrecognized {kind} member: {text}")]
    UnrecognizedMember { kind: &'static str, text: String },
    #[error("unsupported value for enum member {member}: {value}")]
    UnsupportedEnumValue { member: String, value: String },
    #[error("interface function {function} has no argument named {param}")]
    UnknownParam { function: String, param: String },
    #[error("interface function {function} documents a return value but returns void")]
    ReturnWithoutValue { function: String },
    #[error("interface function {function} has no @since directive")]
    MissingSince { function: String },
    #[error("duplicate declaration name {name}")]
    DuplicateName { name: String },
}

impl Diagnostic {
    pub fn new(line: usize, kind: DiagnosticKind) -> Self {
        Diagnostic { line, kind }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// Side-effect-only capability the decoder reports through.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics for later inspection.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade as warnings, counting them.
#[derive(Debug, Default)]
pub struct LogSink {
    /// Prefix for every message, usually the input path.
    pub source: String,
    pub count: usize,
}

impl LogSink {
    pub fn new(source: impl Into<String>) -> Self {
        LogSink {
            source: source.into(),
            count: 0,
        }
    }
}

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        log::warn!("{}: {}", self.source, diagnostic);
    }
}
