//! Column segmentation.
//!
//! Text blocks are clustered by their horizontal midpoints. A page is split
//! into two columns at the single widest gap between consecutive midpoints,
//! provided that gap is wide enough relative to the page; everything else
//! reads as one column. Blocks that cross the split and are nearly as wide
//! as the page are marked full-width so the resolver can read them between
//! the column bands.

use serde::{Deserialize, Serialize};

use super::LayoutOptions;
use crate::model::{BBox, Page};

/// A detected column in the page layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Left boundary X coordinate
    pub left: f64,
    /// Right boundary X coordinate
    pub right: f64,
    /// Column index (0 = leftmost)
    pub index: usize,
}

/// Where a text block sits in the reading flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSlot {
    /// Inside the column with this index
    Column(usize),
    /// Spans the split; read between column bands
    FullWidth,
}

/// Column assignment of one text block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Extraction index of the block within its page
    pub block_index: usize,
    /// Assigned slot
    pub slot: ColumnSlot,
}

/// Segmentation result for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Page index
    pub page: u32,
    /// Columns, left to right (empty for a page without text)
    pub columns: Vec<Column>,
    /// Split x coordinate, when two columns were detected
    pub split: Option<f64>,
    /// One placement per text block, in extraction order
    pub placements: Vec<Placement>,
}

impl ColumnLayout {
    fn empty(page: u32) -> Self {
        Self {
            page,
            columns: Vec::new(),
            split: None,
            placements: Vec::new(),
        }
    }

    /// Number of detected columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check whether a split was accepted.
    pub fn is_multi_column(&self) -> bool {
        self.columns.len() > 1
    }

    /// Slot of the text block with the given extraction index.
    pub fn slot_of(&self, block_index: usize) -> Option<ColumnSlot> {
        self.placements
            .binary_search_by_key(&block_index, |p| p.block_index)
            .ok()
            .map(|i| self.placements[i].slot)
    }

    /// Extraction indices of the blocks placed in a column.
    pub fn members(&self, column: usize) -> impl Iterator<Item = usize> + '_ {
        self.placements
            .iter()
            .filter(move |p| p.slot == ColumnSlot::Column(column))
            .map(|p| p.block_index)
    }

    /// Extraction indices of the full-width blocks.
    pub fn full_width(&self) -> impl Iterator<Item = usize> + '_ {
        self.placements
            .iter()
            .filter(|p| p.slot == ColumnSlot::FullWidth)
            .map(|p| p.block_index)
    }
}

/// Splits a page's text blocks into reading columns.
pub struct ColumnSegmenter<'a> {
    options: &'a LayoutOptions,
}

impl<'a> ColumnSegmenter<'a> {
    /// Create a segmenter using the given options.
    pub fn new(options: &'a LayoutOptions) -> Self {
        Self { options }
    }

    /// Segment the text blocks of a page. Image blocks are ignored.
    pub fn segment(&self, page: &Page) -> ColumnLayout {
        let texts: Vec<(usize, &BBox)> = page.text_blocks().map(|(i, b, _)| (i, b)).collect();

        let Some(extent) = texts.iter().map(|(_, b)| **b).reduce(|a, b| a.union(&b)) else {
            return ColumnLayout::empty(page.index);
        };

        let single = || ColumnLayout {
            page: page.index,
            columns: vec![Column {
                left: extent.x0,
                right: extent.x1,
                index: 0,
            }],
            split: None,
            placements: texts
                .iter()
                .map(|(i, _)| Placement {
                    block_index: *i,
                    slot: ColumnSlot::Column(0),
                })
                .collect(),
        };

        let page_width = page.effective_width();
        if texts.len() < 2 || page_width <= 0.0 {
            return single();
        }

        let Some((gap, split)) = self.find_split(page, &texts, page_width) else {
            log::debug!("Page {}: fewer than two gap candidates", page.index);
            return single();
        };

        let required = (self.options.gap_fraction + self.options.tie_tolerance) * page_width;
        log::debug!(
            "Page {}: widest midpoint gap={:.1} at x={:.1}, required>{:.1}, page_width={:.1}",
            page.index,
            gap,
            split,
            required,
            page_width
        );

        if gap <= required {
            return single();
        }

        let column_width = extent.width() / 2.0;
        let min_full_width = self.options.full_width_fraction * column_width;
        let placements = texts
            .iter()
            .map(|(i, b)| {
                let slot = if b.straddles(split) && b.width() > min_full_width {
                    ColumnSlot::FullWidth
                } else if b.mid_x() < split {
                    ColumnSlot::Column(0)
                } else {
                    ColumnSlot::Column(1)
                };
                Placement {
                    block_index: *i,
                    slot,
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Page {}: two columns split at x={:.1}, {} full-width block(s)",
            page.index,
            split,
            placements
                .iter()
                .filter(|p| p.slot == ColumnSlot::FullWidth)
                .count()
        );

        ColumnLayout {
            page: page.index,
            columns: vec![
                Column {
                    left: extent.x0,
                    right: split,
                    index: 0,
                },
                Column {
                    left: split,
                    right: extent.x1,
                    index: 1,
                },
            ],
            split: Some(split),
            placements,
        }
    }

    /// Find the widest gap between consecutive midpoints.
    ///
    /// Blocks that straddle the page center while covering most of the page
    /// are left out so a wide header cannot hide the gutter. Returns the gap
    /// width and the x coordinate halfway across it; the leftmost gap wins
    /// an exact tie.
    fn find_split(
        &self,
        page: &Page,
        texts: &[(usize, &BBox)],
        page_width: f64,
    ) -> Option<(f64, f64)> {
        let center = match page.width {
            Some(w) if w.is_finite() && w > 0.0 => w / 2.0,
            _ => page.extent().map(|e| e.mid_x()).unwrap_or(0.0),
        };
        let spanning_width = self.options.full_width_fraction * page_width / 2.0;

        let mut mids: Vec<(f64, usize)> = texts
            .iter()
            .filter(|(_, b)| !(b.straddles(center) && b.width() > spanning_width))
            .map(|(i, b)| (b.mid_x(), *i))
            .collect();

        if mids.len() < 2 {
            return None;
        }

        mids.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut best: Option<(f64, f64)> = None;
        for pair in mids.windows(2) {
            let gap = pair[1].0 - pair[0].0;
            if best.map_or(true, |(g, _)| gap > g) {
                best = Some((gap, (pair[0].0 + pair[1].0) / 2.0));
            }
        }
        best
    }
}
