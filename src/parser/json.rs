//! Loader for a persisted IR document.

use crate::error::{Error, Result};
use crate::model::{Document, FORMAT_VERSION};

/// Parse IR JSON. Unknown declaration tags and other format versions are
/// rejected: the IR itself is invalid and nothing may be generated from it.
pub fn parse(input: &str) -> Result<Document> {
    let doc: Document = serde_json::from_str(input)?;
    if doc.format_version != FORMAT_VERSION {
        return Err(Error::UnsupportedFormatVersion(doc.format_version));
    }
    Ok(doc)
}
