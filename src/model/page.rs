//! Page-level types.

use super::{BBox, PageBlock};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The blocks of a single page, in extraction order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: u32,

    /// Page width in extractor units, when the extractor reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Page height in extractor units, when the extractor reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    /// Blocks in extraction order
    pub blocks: Vec<PageBlock>,
}

impl Page {
    /// Create an empty page of unknown size.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            width: None,
            height: None,
            blocks: Vec::new(),
        }
    }

    /// Create an empty page with known dimensions.
    pub fn with_size(index: u32, width: f64, height: f64) -> Self {
        Self {
            index,
            width: Some(width),
            height: Some(height),
            blocks: Vec::new(),
        }
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: PageBlock) {
        self.blocks.push(block);
    }

    /// Add a text block to the page.
    pub fn add_text(&mut self, bbox: BBox, text: impl Into<String>) {
        self.blocks.push(PageBlock::text(bbox, text));
    }

    /// Add an image block to the page.
    pub fn add_image(&mut self, bbox: BBox, reference: impl Into<String>) {
        self.blocks.push(PageBlock::image(bbox, reference));
    }

    /// Text blocks as `(extraction index, bbox, text)`.
    pub fn text_blocks(&self) -> impl Iterator<Item = (usize, &BBox, &str)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, block)| match block {
                PageBlock::Text { bbox, text } => Some((i, bbox, text.as_str())),
                PageBlock::Image { .. } => None,
            })
    }

    /// Image blocks as `(extraction index, bbox, reference)`.
    pub fn image_blocks(&self) -> impl Iterator<Item = (usize, &BBox, &str)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, block)| match block {
                PageBlock::Image { bbox, reference } => Some((i, bbox, reference.as_str())),
                PageBlock::Text { .. } => None,
            })
    }

    /// Number of text blocks.
    pub fn text_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_text()).count()
    }

    /// Number of image blocks.
    pub fn image_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_image()).count()
    }

    /// Check if the page has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Smallest box containing every block, if any.
    pub fn extent(&self) -> Option<BBox> {
        self.blocks
            .iter()
            .map(|b| *b.bbox())
            .reduce(|acc, b| acc.union(&b))
    }

    /// Width used for page-relative thresholds.
    ///
    /// Falls back to the horizontal extent of the blocks when the extractor
    /// did not report a page width.
    pub fn effective_width(&self) -> f64 {
        match self.width {
            Some(w) if w.is_finite() && w > 0.0 => w,
            _ => self.extent().map(|e| e.width()).unwrap_or(0.0),
        }
    }

    /// Check every block's geometry and content.
    pub fn validate(&self) -> Result<()> {
        for (i, block) in self.blocks.iter().enumerate() {
            if let Some(reason) = block.defect() {
                return Err(Error::malformed(self.index, i, reason));
            }
        }
        Ok(())
    }
}
