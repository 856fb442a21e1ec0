//! Image-to-text spatial association.
//!
//! Each image is paired with the text block whose center lies closest to
//! its own. Exam layouts put a figure next to the question that refers to
//! it, so proximity alone is enough to recover the pairing.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{BBox, Document, Page, PageBlock};

/// The text an image was paired with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Association {
    /// Nearest text block on the same page
    Text {
        /// Extraction index of the text block within its page
        block_index: usize,
        /// Text content of the block
        text: String,
        /// Center-to-center distance
        distance: f64,
    },

    /// The page has no text block
    None,
}

/// Association of one image block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRecord {
    /// Page index
    pub page: u32,
    /// Extraction index of the image block within its page
    pub image_index: usize,
    /// Opaque image reference
    pub reference: String,
    /// Image bounding box
    pub bbox: BBox,
    /// Associated text, if any
    pub association: Association,
}

impl AssociationRecord {
    /// Associated text content, or `None` when the page has no text.
    pub fn associated_text(&self) -> Option<&str> {
        match &self.association {
            Association::Text { text, .. } => Some(text),
            Association::None => None,
        }
    }

    /// Check whether the image was paired with a text block.
    pub fn is_associated(&self) -> bool {
        matches!(self.association, Association::Text { .. })
    }
}

/// Pairs every image block with its nearest same-page text block.
#[derive(Debug, Clone)]
pub struct SpatialAssociator {
    parallel: bool,
}

impl SpatialAssociator {
    /// Create a new associator.
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Enable or disable parallel processing across pages.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Associate the images among `blocks`, all of which belong to `page`.
    ///
    /// `blocks` may be a page's full block list or any reduced subset of it;
    /// extraction indices are positions within the slice.
    pub fn associate_blocks(&self, page: u32, blocks: &[PageBlock]) -> Vec<AssociationRecord> {
        let texts: Vec<(usize, &BBox, &str)> = blocks
            .iter()
            .enumerate()
            .filter_map(|(i, b)| match b {
                PageBlock::Text { bbox, text } => Some((i, bbox, text.as_str())),
                PageBlock::Image { .. } => None,
            })
            .collect();

        blocks
            .iter()
            .enumerate()
            .filter_map(|(i, b)| match b {
                PageBlock::Image { bbox, reference } => Some((i, bbox, reference)),
                PageBlock::Text { .. } => None,
            })
            .map(|(image_index, bbox, reference)| {
                let association = nearest_text(bbox, &texts);
                if !matches!(association, Association::Text { .. }) {
                    log::debug!(
                        "Page {}: image {} has no text to associate with",
                        page,
                        reference
                    );
                }
                AssociationRecord {
                    page,
                    image_index,
                    reference: reference.clone(),
                    bbox: *bbox,
                    association,
                }
            })
            .collect()
    }

    /// Associate every image on a page.
    pub fn associate_page(&self, page: &Page) -> Vec<AssociationRecord> {
        self.associate_blocks(page.index, &page.blocks)
    }

    /// Associate every image of a document, page by page in page order.
    pub fn associate_document(&self, doc: &Document) -> Vec<AssociationRecord> {
        let pages = doc.pages_in_order();

        let per_page: Vec<Vec<AssociationRecord>> = if self.parallel && pages.len() > 1 {
            pages.par_iter().map(|p| self.associate_page(p)).collect()
        } else {
            pages.iter().map(|p| self.associate_page(p)).collect()
        };

        per_page.into_iter().flatten().collect()
    }
}

impl Default for SpatialAssociator {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the text block closest to `image`.
///
/// Ties on distance go to the smaller vertical offset, then to the earlier
/// block.
fn nearest_text(image: &BBox, texts: &[(usize, &BBox, &str)]) -> Association {
    texts
        .iter()
        .map(|(i, bbox, text)| {
            (
                *i,
                image.center_distance(bbox),
                image.vertical_center_distance(bbox),
                *text,
            )
        })
        .min_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then_with(|| a.2.total_cmp(&b.2))
                .then_with(|| a.0.cmp(&b.0))
        })
        .map_or(Association::None, |(block_index, distance, _, text)| {
            Association::Text {
                block_index,
                text: text.to_string(),
                distance,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered(x: f64, y: f64, half: f64) -> BBox {
        BBox::new(x - half, y - half, x + half, y + half)
    }

    #[test]
    fn test_nearest_text_wins() {
        let mut page = Page::new(0);
        page.add_image(centered(100.0, 100.0, 20.0), "fig");
        page.add_text(centered(105.0, 95.0, 4.0), "near");
        page.add_text(centered(400.0, 400.0, 4.0), "far");

        let records = SpatialAssociator::new().associate_page(&page);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].associated_text(), Some("near"));
        match &records[0].association {
            Association::Text {
                block_index,
                distance,
                ..
            } => {
                assert_eq!(*block_index, 1);
                assert!((distance - 7.0711).abs() < 1e-3);
            }
            Association::None => panic!("expected an association"),
        }
    }

    #[test]
    fn test_single_text_block_always_wins() {
        let mut page = Page::new(0);
        page.add_text(centered(10.0, 10.0, 5.0), "only text");
        page.add_image(centered(900.0, 900.0, 5.0), "a");
        page.add_image(centered(10.0, 500.0, 5.0), "b");

        let records = SpatialAssociator::new().associate_page(&page);
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.associated_text() == Some("only text")));
    }

    #[test]
    fn test_no_text_yields_none() {
        let mut page = Page::new(3);
        page.add_image(centered(10.0, 10.0, 5.0), "a");
        page.add_image(centered(50.0, 50.0, 5.0), "b");

        let records = SpatialAssociator::new().associate_page(&page);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.association == Association::None));
        assert!(records.iter().all(|r| r.page == 3));
    }

    #[test]
    fn test_tie_prefers_smaller_vertical_offset() {
        let mut page = Page::new(0);
        page.add_image(centered(100.0, 100.0, 5.0), "fig");
        page.add_text(centered(100.0, 90.0, 2.0), "above");
        page.add_text(centered(110.0, 100.0, 2.0), "beside");

        let records = SpatialAssociator::new().associate_page(&page);
        assert_eq!(records[0].associated_text(), Some("beside"));
    }

    #[test]
    fn test_exact_tie_prefers_earlier_block() {
        let mut page = Page::new(0);
        page.add_image(centered(100.0, 100.0, 5.0), "fig");
        page.add_text(centered(90.0, 100.0, 2.0), "left");
        page.add_text(centered(110.0, 100.0, 2.0), "right");

        let records = SpatialAssociator::new().associate_page(&page);
        assert_eq!(records[0].associated_text(), Some("left"));
    }

    #[test]
    fn test_reduced_block_list() {
        let blocks = vec![
            PageBlock::text(centered(0.0, 0.0, 2.0), "kept"),
            PageBlock::image(centered(300.0, 300.0, 2.0), "fig"),
        ];
        let records = SpatialAssociator::new().associate_blocks(7, &blocks);
        assert_eq!(records[0].page, 7);
        assert_eq!(records[0].image_index, 1);
        assert_eq!(records[0].reference, "fig");
        assert!(records[0].is_associated());
    }

    #[test]
    fn test_document_never_crosses_pages() {
        let mut doc = Document::new();
        let mut p0 = Page::new(0);
        p0.add_image(centered(100.0, 100.0, 5.0), "lonely");
        let mut p1 = Page::new(1);
        p1.add_text(centered(100.0, 100.0, 5.0), "other page");
        doc.add_page(p1);
        doc.add_page(p0);

        let records = SpatialAssociator::new()
            .with_parallel(false)
            .associate_document(&doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].page, 0);
        assert_eq!(records[0].association, Association::None);
    }

    #[test]
    fn test_record_serializes_status_tag() {
        let mut page = Page::new(0);
        page.add_image(centered(10.0, 10.0, 5.0), "a");
        let records = SpatialAssociator::new().associate_page(&page);
        let json = serde_json::to_string(&records[0]).unwrap();
        assert!(json.contains("\"status\":\"none\""));
    }
}
