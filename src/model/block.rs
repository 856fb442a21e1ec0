//! Positioned page blocks.

use super::BBox;
use serde::{Deserialize, Serialize};

/// One text or image element on a page, in extraction order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageBlock {
    /// A run of text
    Text {
        /// Bounding box on the page
        bbox: BBox,
        /// Text content (non-empty)
        text: String,
    },

    /// An image placement
    Image {
        /// Bounding box on the page
        bbox: BBox,
        /// Opaque reference to the image (no binary payload)
        reference: String,
    },
}

impl PageBlock {
    /// Create a text block.
    pub fn text(bbox: BBox, text: impl Into<String>) -> Self {
        PageBlock::Text {
            bbox,
            text: text.into(),
        }
    }

    /// Create an image block.
    pub fn image(bbox: BBox, reference: impl Into<String>) -> Self {
        PageBlock::Image {
            bbox,
            reference: reference.into(),
        }
    }

    /// Bounding box of the block.
    pub fn bbox(&self) -> &BBox {
        match self {
            PageBlock::Text { bbox, .. } | PageBlock::Image { bbox, .. } => bbox,
        }
    }

    /// Text content, if this is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PageBlock::Text { text, .. } => Some(text),
            PageBlock::Image { .. } => None,
        }
    }

    /// Image reference, if this is an image block.
    pub fn as_image(&self) -> Option<&str> {
        match self {
            PageBlock::Image { reference, .. } => Some(reference),
            PageBlock::Text { .. } => None,
        }
    }

    /// Check if this block is text.
    pub fn is_text(&self) -> bool {
        matches!(self, PageBlock::Text { .. })
    }

    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, PageBlock::Image { .. })
    }

    /// Describe why the block is unusable, or `None` if it is well formed.
    pub fn defect(&self) -> Option<String> {
        if let Some(reason) = self.bbox().defect() {
            return Some(reason);
        }
        match self {
            PageBlock::Text { text, .. } if text.is_empty() => Some("empty text".to_string()),
            _ => None,
        }
    }
}
