//! Raw extractor page records.
//!
//! The block extractor writes one record per page: the `dict`-style text
//! blocks (type 0 = text, type 1 = image) with their lines and spans, plus
//! the page's image placements keyed by xref. Binary image payloads are
//! already stripped. Fields this crate does not need are ignored.

use serde::Deserialize;

use crate::model::{BBox, PageBlock};

/// Block type code for text.
const TEXT_BLOCK: u8 = 0;
/// Block type code for images.
const IMAGE_BLOCK: u8 = 1;

/// One page of raw extractor output.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPage {
    /// 1-indexed page number
    pub page_number: u32,
    /// Page width, when recorded
    #[serde(default)]
    pub width: Option<f64>,
    /// Page height, when recorded
    #[serde(default)]
    pub height: Option<f64>,
    /// Text and image blocks in extraction order
    #[serde(default)]
    pub text_blocks: Vec<RawBlock>,
    /// Image placements
    #[serde(default)]
    pub images: Vec<RawImage>,
}

/// A `dict`-style block.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    /// Block type code
    #[serde(rename = "type")]
    pub kind: u8,
    /// Bounding box
    pub bbox: [f64; 4],
    /// Block number assigned by the extractor
    #[serde(default)]
    pub number: Option<u32>,
    /// Lines of a text block
    #[serde(default)]
    pub lines: Vec<RawLine>,
}

/// A line of a text block.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLine {
    /// Spans in the line
    #[serde(default)]
    pub spans: Vec<RawSpan>,
}

/// A span of uniformly styled text.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSpan {
    /// Span text
    #[serde(default)]
    pub text: String,
}

/// Placement(s) of one embedded image on the page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    /// Position of the image in the page's image list
    #[serde(default)]
    pub image_index: usize,
    /// Cross-reference number of the image object
    pub xref: u32,
    /// Display rectangles (one per placement)
    #[serde(default)]
    pub rects: Vec<[f64; 4]>,
}

impl RawBlock {
    /// Text content: spans concatenated per line, lines joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl RawPage {
    /// Flatten the page into blocks, in extraction order.
    ///
    /// Malformed blocks are skipped with a warning naming their place in
    /// the record; use [`RawPage::first_defect`] to reject them instead.
    pub fn to_blocks(&self) -> Vec<PageBlock> {
        self.located_blocks()
            .into_iter()
            .filter_map(|(location, block)| match block.defect() {
                Some(reason) => {
                    log::warn!(
                        "Extractor page {}: dropping malformed {}: {}",
                        self.page_number,
                        location,
                        reason
                    );
                    None
                }
                None => Some(block),
            })
            .collect()
    }

    /// The first block that would be malformed, as `(location, reason)`.
    pub fn first_defect(&self) -> Option<(String, String)> {
        self.located_blocks()
            .into_iter()
            .find_map(|(location, block)| block.defect().map(|reason| (location, reason)))
    }

    /// Blocks paired with where they sit in the record.
    ///
    /// Text blocks come first in extraction order. Image placements
    /// come from the `images` list; type-1 blocks are used only when that
    /// list is empty so an image is never counted twice. Text blocks with
    /// only whitespace carry no content and are dropped.
    fn located_blocks(&self) -> Vec<(String, PageBlock)> {
        let mut blocks = Vec::with_capacity(self.text_blocks.len() + self.images.len());
        let use_block_images = self.images.is_empty();

        for (position, block) in self.text_blocks.iter().enumerate() {
            let bbox = BBox::from_array(block.bbox);
            match block.kind {
                TEXT_BLOCK => {
                    let text = block.text();
                    if text.trim().is_empty() {
                        log::debug!(
                            "Page {}: dropping blank text block {}",
                            self.page_number,
                            position
                        );
                        continue;
                    }
                    blocks.push((
                        format!("text block {}", position),
                        PageBlock::text(bbox, text),
                    ));
                }
                IMAGE_BLOCK if use_block_images => {
                    let number = block.number.map_or(position, |n| n as usize);
                    blocks.push((
                        format!("image block {}", position),
                        PageBlock::image(bbox, format!("block{}", number)),
                    ));
                }
                IMAGE_BLOCK => {}
                other => {
                    log::debug!(
                        "Page {}: skipping block {} of unknown type {}",
                        self.page_number,
                        position,
                        other
                    );
                }
            }
        }

        for image in &self.images {
            let several = image.rects.len() > 1;
            for (k, rect) in image.rects.iter().enumerate() {
                let reference = if several {
                    format!("xref{}#{}", image.xref, k)
                } else {
                    format!("xref{}", image.xref)
                };
                blocks.push((
                    format!("image xref{} rect {}", image.xref, k),
                    PageBlock::image(BBox::from_array(*rect), reference),
                ));
            }
        }

        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "page_number": 1,
        "text_blocks": [
            {"number": 0, "type": 0, "bbox": [50, 40, 300, 60],
             "lines": [
                {"bbox": [50, 40, 300, 50], "spans": [{"text": "(A "}, {"text": "問題20)"}]},
                {"bbox": [50, 50, 300, 60], "spans": [{"text": "次の写真を示す。"}]}
             ]},
            {"number": 1, "type": 1, "bbox": [50, 70, 300, 200], "width": 640, "height": 480, "ext": "png"},
            {"number": 2, "type": 0, "bbox": [50, 210, 300, 220], "lines": [{"spans": [{"text": "  "}]}]}
        ],
        "images": [
            {"image_index": 0, "xref": 12, "rects": [[50, 70, 300, 200]]},
            {"image_index": 1, "xref": 15, "rects": [[10, 10, 20, 20], [30, 30, 40, 40]]}
        ]
    }"#;

    #[test]
    fn test_text_joins_spans_and_lines() {
        let page: RawPage = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.text_blocks[0].text(), "(A 問題20)\n次の写真を示す。");
    }

    #[test]
    fn test_to_blocks_prefers_image_list() {
        let page: RawPage = serde_json::from_str(PAGE).unwrap();
        let blocks = page.to_blocks();
        let refs: Vec<_> = blocks.iter().filter_map(|b| b.as_image()).collect();
        assert_eq!(refs, vec!["xref12", "xref15#0", "xref15#1"]);
        assert_eq!(blocks.iter().filter(|b| b.is_text()).count(), 1);
    }

    #[test]
    fn test_block_images_used_without_image_list() {
        let mut page: RawPage = serde_json::from_str(PAGE).unwrap();
        page.images.clear();
        let blocks = page.to_blocks();
        let refs: Vec<_> = blocks.iter().filter_map(|b| b.as_image()).collect();
        assert_eq!(refs, vec!["block1"]);
    }

    #[test]
    fn test_first_defect_uses_record_positions() {
        let page: RawPage = serde_json::from_str(
            r#"{"page_number": 2, "text_blocks": [
                {"type": 0, "bbox": [0, 0, 10, 10], "lines": [{"spans": [{"text": " "}]}]},
                {"type": 0, "bbox": [100, 10, 50, 20], "lines": [{"spans": [{"text": "bad"}]}]}
            ], "images": [{"xref": 7, "rects": [[0, 0, 5, 5], [0, 9, 5, 3]]}]}"#,
        )
        .unwrap();

        let (location, reason) = page.first_defect().unwrap();
        assert_eq!(location, "text block 1");
        assert_eq!(reason, "x0 (100) >= x1 (50)");
    }

    #[test]
    fn test_to_blocks_skips_malformed_rect() {
        let page: RawPage = serde_json::from_str(
            r#"{"page_number": 1, "images": [{"xref": 7, "rects": [[0, 0, 5, 5], [0, 9, 5, 3]]}]}"#,
        )
        .unwrap();

        assert_eq!(
            page.first_defect().map(|(location, _)| location).as_deref(),
            Some("image xref7 rect 1")
        );
        let refs: Vec<_> = page
            .to_blocks()
            .into_iter()
            .filter_map(|b| b.as_image().map(str::to_string))
            .collect();
        assert_eq!(refs, vec!["xref7#0"]);
    }
}
