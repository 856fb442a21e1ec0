//! Page layout analysis.
//!
//! Three pure, per-page computations share the geometry in [`crate::model`]:
//!
//! - [`ColumnSegmenter`] splits text blocks into reading columns.
//! - [`ReadingOrder`] linearizes the segmented blocks into an
//!   [`OrderedTextSequence`].
//! - [`SpatialAssociator`] pairs each image with its nearest text block.

mod associate;
mod columns;
mod options;
mod order;

pub use associate::{Association, AssociationRecord, SpatialAssociator};
pub use columns::{Column, ColumnLayout, ColumnSegmenter, ColumnSlot, Placement};
pub use options::LayoutOptions;
pub use order::{OrderedTextSequence, ReadingOrder, Segment};
