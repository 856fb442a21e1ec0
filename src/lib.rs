//! # exam-reflow
//!
//! Reading-order reconstruction and image-to-text association for the
//! positioned blocks of exam PDF pages.
//!
//! An external extractor turns each PDF page into a flat list of text and
//! image blocks. This library:
//!
//! - segments each page's text into reading columns, including full-width
//!   blocks that span them;
//! - resolves a deterministic reading order across columns and pages;
//! - pairs every image with the nearest text block on its page, so that a
//!   rule-based mapper can tie the image to a question label.
//!
//! ## Quick Start
//!
//! ```no_run
//! use exam_reflow::Reflow;
//!
//! fn main() -> exam_reflow::Result<()> {
//!     let result = Reflow::new().process("118a_blocks.json")?;
//!
//!     // Ordered text for downstream chunking
//!     println!("{}", result.to_text());
//!
//!     // Image -> question mapping
//!     for (key, images) in &result.image_mapping().entries {
//!         println!("{}: {} image(s)", key, images.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Column segmentation**: single, two-column and full-width layouts
//! - **Deterministic order**: identical input always yields identical output
//! - **Spatial association**: center-to-center nearest text per image
//! - **Join keys**: `(A 問題20)` and `問題60〜62` style labels
//! - **Parallel processing**: uses Rayon across pages

pub mod error;
pub mod ingest;
pub mod layout;
pub mod mapping;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ingest::{BlockReader, ErrorMode, IngestOptions, PageSelection};
pub use layout::{
    Association, AssociationRecord, Column, ColumnLayout, ColumnSegmenter, ColumnSlot,
    LayoutOptions, OrderedTextSequence, ReadingOrder, Segment, SpatialAssociator,
};
pub use mapping::{ImageMapping, JoinKey, JoinKeyMapper, MappedImage};
pub use model::{BBox, Document, Page, PageBlock};
pub use render::{JsonFormat, RenderOptions};

use std::path::Path;

/// Read and validate an extractor JSON file.
///
/// # Example
///
/// ```no_run
/// use exam_reflow::read_file;
///
/// let doc = read_file("118a_blocks.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    ingest::read_file(path)
}

/// Resolve the reading order of a document with default options.
pub fn order_document(doc: &Document) -> OrderedTextSequence {
    let options = LayoutOptions::default();
    ReadingOrder::new(&options).resolve_document(doc)
}

/// Associate every image of a document with its nearest text block.
pub fn associate_document(doc: &Document) -> Vec<AssociationRecord> {
    SpatialAssociator::new().associate_document(doc)
}

/// Associate images and group them by join key.
pub fn map_images(doc: &Document) -> ImageMapping {
    let records = associate_document(doc);
    JoinKeyMapper::for_source(doc.source.as_deref()).map(&records)
}

/// Extract reading-ordered text from an extractor JSON file.
///
/// # Example
///
/// ```no_run
/// use exam_reflow::extract_text;
///
/// let text = extract_text("118a_blocks.json").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = read_file(path)?;
    Ok(render::to_document_text(
        &doc,
        &order_document(&doc),
        &RenderOptions::default(),
    ))
}

/// Builder for reading, ordering and associating extractor output.
///
/// # Example
///
/// ```no_run
/// use exam_reflow::Reflow;
///
/// let text = Reflow::new()
///     .lenient()
///     .with_gap_fraction(0.2)
///     .sequential()
///     .process("118a_blocks.json")?
///     .to_text();
/// # Ok::<(), exam_reflow::Error>(())
/// ```
pub struct Reflow {
    ingest_options: IngestOptions,
    layout_options: LayoutOptions,
    render_options: RenderOptions,
}

impl Reflow {
    /// Create a new Reflow builder.
    pub fn new() -> Self {
        Self {
            ingest_options: IngestOptions::default(),
            layout_options: LayoutOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Drop malformed blocks instead of rejecting the document.
    pub fn lenient(mut self) -> Self {
        self.ingest_options = self.ingest_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.layout_options = self.layout_options.sequential();
        self
    }

    /// Set the column gap fraction.
    pub fn with_gap_fraction(mut self, fraction: f64) -> Self {
        self.layout_options = self.layout_options.with_gap_fraction(fraction);
        self
    }

    /// Set the full-width fraction.
    pub fn with_full_width_fraction(mut self, fraction: f64) -> Self {
        self.layout_options = self.layout_options.with_full_width_fraction(fraction);
        self
    }

    /// Set the near-tie tolerance.
    pub fn with_tie_tolerance(mut self, tolerance: f64) -> Self {
        self.layout_options = self.layout_options.with_tie_tolerance(tolerance);
        self
    }

    /// Replace all layout options.
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout_options = options;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.ingest_options = self.ingest_options.with_pages(pages);
        self
    }

    /// Set text rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Read an extractor JSON file and lay it out.
    pub fn process<P: AsRef<Path>>(self, path: P) -> Result<ReflowResult> {
        let reader = BlockReader::open_with_options(path, self.ingest_options.clone())?;
        let document = reader.read()?;
        self.process_document(document)
    }

    /// Read extractor JSON from bytes and lay it out.
    pub fn process_bytes(self, data: &[u8]) -> Result<ReflowResult> {
        let reader = BlockReader::from_bytes_with_options(data, self.ingest_options.clone())?;
        let document = reader.read()?;
        self.process_document(document)
    }

    /// Lay out an in-memory document.
    ///
    /// The document is validated first since it may not have come through
    /// the reader.
    pub fn process_document(self, document: Document) -> Result<ReflowResult> {
        self.layout_options.validate()?;
        document.validate()?;

        let sequence = ReadingOrder::new(&self.layout_options).resolve_document(&document);
        let associations = SpatialAssociator::new()
            .with_parallel(self.layout_options.parallel)
            .associate_document(&document);

        Ok(ReflowResult {
            document,
            sequence,
            associations,
            render_options: self.render_options,
        })
    }
}

impl Default for Reflow {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of laying out a document.
pub struct ReflowResult {
    /// The validated document
    pub document: Document,
    /// Text in reading order
    pub sequence: OrderedTextSequence,
    /// One record per image block
    pub associations: Vec<AssociationRecord>,
    render_options: RenderOptions,
}

impl ReflowResult {
    /// Render the ordered text, one header per page.
    pub fn to_text(&self) -> String {
        render::to_document_text(&self.document, &self.sequence, &self.render_options)
    }

    /// Serialize the ordered sequence.
    pub fn sequence_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.sequence, format)
    }

    /// Serialize the association table.
    pub fn associations_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.associations, format)
    }

    /// Group the associated images by join key.
    pub fn image_mapping(&self) -> ImageMapping {
        JoinKeyMapper::for_source(self.document.source.as_deref()).map(&self.associations)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_doc() -> Document {
        let mut doc = Document::with_source("tp220502-01c_01");
        let mut page = Page::with_size(0, 600.0, 800.0);
        page.add_text(BBox::new(40.0, 10.0, 280.0, 30.0), "(A 問題1) left");
        page.add_text(BBox::new(320.0, 10.0, 560.0, 30.0), "(A 問題2) right");
        page.add_image(BBox::new(320.0, 40.0, 560.0, 200.0), "xref7");
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_reflow_builder() {
        let reflow = Reflow::new().lenient().sequential().with_gap_fraction(0.3);
        assert_eq!(reflow.ingest_options.error_mode, ErrorMode::Lenient);
        assert!(!reflow.layout_options.parallel);
        assert_eq!(reflow.layout_options.gap_fraction, 0.3);
    }

    #[test]
    fn test_process_document() {
        let result = Reflow::new().process_document(two_column_doc()).unwrap();
        assert_eq!(
            result.sequence.texts(),
            vec!["(A 問題1) left", "(A 問題2) right"]
        );
        assert_eq!(result.associations.len(), 1);
        assert_eq!(
            result.associations[0].associated_text(),
            Some("(A 問題2) right")
        );
        let mapping = result.image_mapping();
        assert_eq!(mapping.get("A-2").unwrap()[0].reference, "xref7");
    }

    #[test]
    fn test_process_rejects_invalid_options() {
        let result = Reflow::new()
            .with_gap_fraction(2.0)
            .process_document(two_column_doc());
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_process_rejects_malformed_document() {
        let mut doc = two_column_doc();
        doc.pages[0].add_text(BBox::new(10.0, 10.0, 5.0, 20.0), "bad");
        let result = Reflow::new().process_document(doc);
        assert!(matches!(result, Err(Error::MalformedBlock { index: 3, .. })));
    }

    #[test]
    fn test_process_bytes_invalid_json() {
        assert!(Reflow::new().process_bytes(b"not json").is_err());
    }

    #[test]
    fn test_convenience_functions() {
        let doc = two_column_doc();
        assert_eq!(order_document(&doc).len(), 2);
        assert_eq!(associate_document(&doc).len(), 1);
        assert_eq!(map_images(&doc).len(), 1);
    }
}
