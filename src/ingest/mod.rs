//! Reading block extractor output into a validated [`Document`].
//!
//! Two JSON shapes are accepted:
//!
//! - the extractor's raw form, an array of page records (see [`RawPage`]);
//! - this crate's own serialized [`Document`].
//!
//! Geometry is validated here, before any layout analysis runs.

mod options;
mod raw;

pub use options::{ErrorMode, IngestOptions, PageSelection};
pub use raw::{RawBlock, RawImage, RawLine, RawPage, RawSpan};

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{Document, Page};

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Raw(Vec<RawPage>),
    Native(Document),
}

/// Reader for block extractor output.
pub struct BlockReader {
    input: Input,
    source: Option<String>,
    options: IngestOptions,
}

impl BlockReader {
    /// Open an extractor JSON file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, IngestOptions::default())
    }

    /// Open an extractor JSON file with custom options.
    ///
    /// The file stem becomes the document's source name unless the input
    /// already carries one.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: IngestOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut reader = Self::from_bytes_with_options(&data, options)?;
        if reader.source.is_none() {
            reader.source = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        }
        Ok(reader)
    }

    /// Read extractor JSON from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, IngestOptions::default())
    }

    /// Read extractor JSON from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: IngestOptions) -> Result<Self> {
        let input: Input = serde_json::from_slice(data)?;
        let source = match &input {
            Input::Native(doc) => doc.source.clone(),
            Input::Raw(_) => None,
        };
        Ok(Self {
            input,
            source,
            options,
        })
    }

    /// Read extractor JSON from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, IngestOptions::default())
    }

    /// Read extractor JSON from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(
        mut reader: R,
        options: IngestOptions,
    ) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Override the source name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Build the validated document.
    pub fn read(&self) -> Result<Document> {
        let pages = match &self.input {
            Input::Raw(raw) => self.convert_raw(raw)?,
            Input::Native(doc) => doc
                .pages
                .iter()
                .filter(|p| self.options.pages.includes(p.index + 1))
                .cloned()
                .collect(),
        };

        let mut document = Document {
            source: self.source.clone(),
            pages: Vec::with_capacity(pages.len()),
        };
        for page in pages {
            document.add_page(self.checked(page)?);
        }
        document.check_page_indices()?;

        log::debug!(
            "Ingested {} page(s): {} text block(s), {} image block(s)",
            document.page_count(),
            document.text_count(),
            document.image_count()
        );
        Ok(document)
    }

    fn convert_raw(&self, raw: &[RawPage]) -> Result<Vec<Page>> {
        let mut pages = Vec::with_capacity(raw.len());
        for record in raw {
            if record.page_number == 0 {
                return Err(Error::InvalidInput(
                    "page_number must be 1-indexed, got 0".to_string(),
                ));
            }
            if !self.options.pages.includes(record.page_number) {
                continue;
            }
            if self.options.error_mode == ErrorMode::Strict {
                if let Some((location, reason)) = record.first_defect() {
                    return Err(Error::MalformedRawBlock {
                        page_number: record.page_number,
                        location,
                        reason,
                    });
                }
            }
            pages.push(Page {
                index: record.page_number - 1,
                width: record.width,
                height: record.height,
                blocks: record.to_blocks(),
            });
        }
        Ok(pages)
    }

    /// Apply the error mode to a page's malformed blocks.
    fn checked(&self, mut page: Page) -> Result<Page> {
        match self.options.error_mode {
            ErrorMode::Strict => {
                page.validate()?;
                Ok(page)
            }
            ErrorMode::Lenient => {
                let index = page.index;
                let mut position = 0;
                page.blocks.retain(|block| {
                    let keep = match block.defect() {
                        Some(reason) => {
                            log::warn!(
                                "Page {}: dropping malformed block {}: {}",
                                index,
                                position,
                                reason
                            );
                            false
                        }
                        None => true,
                    };
                    position += 1;
                    keep
                });
                Ok(page)
            }
        }
    }
}

/// Read and validate an extractor JSON file.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    BlockReader::open(path)?.read()
}

/// Read and validate extractor JSON held in memory.
pub fn read_str(json: &str) -> Result<Document> {
    BlockReader::from_bytes(json.as_bytes())?.read()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    const RAW: &str = r#"[
        {"page_number": 1, "text_blocks": [
            {"type": 0, "bbox": [10, 10, 100, 20], "lines": [{"spans": [{"text": "first"}]}]}
        ], "images": []},
        {"page_number": 2, "text_blocks": [
            {"type": 0, "bbox": [10, 10, 10, 20], "lines": [{"spans": [{"text": "flat"}]}]},
            {"type": 0, "bbox": [10, 30, 100, 40], "lines": [{"spans": [{"text": "ok"}]}]}
        ], "images": [{"image_index": 0, "xref": 9, "rects": [[0, 50, 50, 90]]}]}
    ]"#;

    #[test]
    fn test_strict_rejects_malformed_block() {
        let err = read_str(RAW).unwrap_err();
        match err {
            Error::MalformedRawBlock {
                page_number,
                location,
                ..
            } => {
                assert_eq!(page_number, 2);
                assert_eq!(location, "text block 0");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_malformed_block_after_blank_keeps_record_position() {
        let json = r#"[{"page_number": 2, "text_blocks": [
            {"type": 0, "bbox": [0, 0, 10, 10], "lines": [{"spans": [{"text": ""}]}]},
            {"type": 0, "bbox": [100, 10, 50, 20], "lines": [{"spans": [{"text": "bad"}]}]}
        ]}]"#;
        let err = read_str(json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed text block 1 on extractor page 2: x0 (100) >= x1 (50)"
        );
    }

    #[test]
    fn test_duplicate_page_numbers_rejected() {
        let json = r#"[{"page_number": 1}, {"page_number": 1}]"#;
        assert!(matches!(read_str(json), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_lenient_drops_malformed_block() {
        let reader =
            BlockReader::from_bytes_with_options(RAW.as_bytes(), IngestOptions::new().lenient())
                .unwrap();
        let doc = reader.read().unwrap();
        assert_eq!(doc.page_count(), 2);
        let page = doc.get_page(1).unwrap();
        assert_eq!(page.text_count(), 1);
        assert_eq!(page.image_count(), 1);
    }

    #[test]
    fn test_page_selection_filters_raw_pages() {
        let options = IngestOptions::new().with_pages(PageSelection::Pages(vec![1]));
        let doc = BlockReader::from_bytes_with_options(RAW.as_bytes(), options)
            .unwrap()
            .read()
            .unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].index, 0);
    }

    #[test]
    fn test_native_document_round_trip() {
        let mut doc = Document::with_source("118a");
        let mut page = Page::with_size(0, 600.0, 800.0);
        page.add_text(BBox::new(10.0, 10.0, 100.0, 20.0), "hello");
        doc.add_page(page);

        let json = serde_json::to_string(&doc).unwrap();
        let back = read_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_zero_page_number_rejected() {
        let err = read_str(r#"[{"page_number": 0}]"#).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(read_str("not json"), Err(Error::Json(_))));
    }
}
