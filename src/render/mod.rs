//! Rendering layout results at the pipeline boundary.

mod json;
mod options;
mod text;

pub use json::{to_json, JsonFormat};
pub use options::RenderOptions;
pub use text::{to_document_text, to_text};
