//! Output formats behind one `Renderer` trait.

pub mod header;
pub mod json;

use crate::error::{Error, Result};
use crate::model::Document;
pub use header::EncodeOptions;

/// Trait for rendering a Document into a specific output format.
pub trait Renderer {
    fn render(&self, doc: &Document) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str, options: EncodeOptions) -> Result<Box<dyn Renderer>> {
    match format {
        "header" | "h" => Ok(Box::new(header::HeaderRenderer::new(options))),
        "json" | "ir" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(Error::UnknownFormat(format.to_string())),
    }
}
