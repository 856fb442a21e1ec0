//! Reading-order resolution.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ColumnLayout, ColumnSegmenter, ColumnSlot, LayoutOptions};
use crate::model::{BBox, Document, Page};

/// One text block placed in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Page index
    pub page: u32,
    /// Extraction index of the block within its page
    pub block_index: usize,
    /// Column slot the block was read from
    pub slot: ColumnSlot,
    /// Text content
    pub text: String,
}

/// The text blocks of a document in resolved reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderedTextSequence {
    /// Segments, across pages in page order
    pub segments: Vec<Segment>,
}

impl OrderedTextSequence {
    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Segments of a single page.
    pub fn page(&self, page: u32) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.page == page)
    }

    /// Text contents in order.
    pub fn texts(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Join the text contents with a segment boundary marker.
    pub fn join(&self, separator: &str) -> String {
        self.texts().join(separator)
    }
}

impl<'a> IntoIterator for &'a OrderedTextSequence {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Compare two blocks by top edge, then left edge, then extraction order.
fn reading_cmp(a: (&BBox, usize), b: (&BBox, usize)) -> Ordering {
    a.0.y0
        .total_cmp(&b.0.y0)
        .then_with(|| a.0.x0.total_cmp(&b.0.x0))
        .then_with(|| a.1.cmp(&b.1))
}

/// Linearizes column-tagged text blocks.
pub struct ReadingOrder<'a> {
    options: &'a LayoutOptions,
}

impl<'a> ReadingOrder<'a> {
    /// Create a resolver using the given options.
    pub fn new(options: &'a LayoutOptions) -> Self {
        Self { options }
    }

    /// Order the text blocks of one page given its segmentation.
    ///
    /// Full-width blocks cut the page into bands. Each band is read column
    /// by column, then the full-width block closing it.
    pub fn resolve_page(&self, page: &Page, layout: &ColumnLayout) -> Vec<Segment> {
        type Entry<'p> = (usize, &'p BBox, &'p str, ColumnSlot);

        let column_count = layout.column_count().max(1);
        let mut full_width: Vec<Entry<'_>> = Vec::new();
        let mut in_columns: Vec<Entry<'_>> = Vec::new();

        for (i, bbox, text) in page.text_blocks() {
            match layout.slot_of(i).unwrap_or(ColumnSlot::Column(0)) {
                ColumnSlot::FullWidth => full_width.push((i, bbox, text, ColumnSlot::FullWidth)),
                ColumnSlot::Column(c) => {
                    let c = c.min(column_count - 1);
                    in_columns.push((i, bbox, text, ColumnSlot::Column(c)));
                }
            }
        }

        full_width.sort_by(|a, b| reading_cmp((a.1, a.0), (b.1, b.0)));

        let mut bands: Vec<Vec<Vec<Entry<'_>>>> =
            vec![vec![Vec::new(); column_count]; full_width.len() + 1];
        for entry in in_columns {
            let band = full_width.partition_point(|f| {
                reading_cmp((f.1, f.0), (entry.1, entry.0)) == Ordering::Less
            });
            if let ColumnSlot::Column(c) = entry.3 {
                bands[band][c].push(entry);
            }
        }

        fn segment(page: u32, (i, _, text, slot): Entry<'_>) -> Segment {
            Segment {
                page,
                block_index: i,
                slot,
                text: text.to_string(),
            }
        }

        let mut segments = Vec::with_capacity(page.text_count());
        for (b, band) in bands.into_iter().enumerate() {
            for mut column in band {
                column.sort_by(|a, b| reading_cmp((a.1, a.0), (b.1, b.0)));
                segments.extend(column.into_iter().map(|e| segment(page.index, e)));
            }
            if let Some(closing) = full_width.get(b) {
                segments.push(segment(page.index, *closing));
            }
        }
        segments
    }

    /// Segment and order one page.
    pub fn order_page(&self, page: &Page) -> Vec<Segment> {
        let layout = ColumnSegmenter::new(self.options).segment(page);
        self.resolve_page(page, &layout)
    }

    /// Order every page of a document and concatenate in page order.
    pub fn resolve_document(&self, doc: &Document) -> OrderedTextSequence {
        let pages = doc.pages_in_order();

        let per_page: Vec<Vec<Segment>> = if self.options.parallel && pages.len() > 1 {
            pages.par_iter().map(|p| self.order_page(p)).collect()
        } else {
            pages.iter().map(|p| self.order_page(p)).collect()
        };

        OrderedTextSequence {
            segments: per_page.into_iter().flatten().collect(),
        }
    }
}
