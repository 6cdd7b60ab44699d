//! gdext-header: convert the GDExtension interface header to a JSON IR and back.
//!
//! The decoder ([`decode`]) recovers typedefs, enums, structs, function
//! pointers and documented interface functions from the hand-maintained C
//! header. The encoder ([`encode`]) re-emits a canonical header from the IR.
//! Both are pure functions of their input.

pub mod diagnostics;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, LogSink};
pub use error::{Error, Result};
pub use model::Document;
pub use parser::header::{decode, decode_lines};
pub use render::header::{encode, EncodeOptions, HeaderRenderer};
pub use render::Renderer;

/// Encode `doc`, decode the result again and report whether the IR survived
/// unchanged. Legacy type names are emitted so they can be recovered.
pub fn is_stable(doc: &Document) -> Result<bool> {
    let options = EncodeOptions {
        legacy_names: true,
        ..EncodeOptions::default()
    };
    let text = HeaderRenderer::new(options).render(doc)?;
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let again = decode(&text, &mut diagnostics);
    for diagnostic in &diagnostics {
        log::debug!("round trip: {}", diagnostic);
    }
    Ok(diagnostics.is_empty() && again == *doc)
}
