//! Document model types for positioned page blocks.
//!
//! This module defines the in-memory representation handed over by the
//! external block extractor. Every type here is a plain value: layout
//! analysis reads it and never mutates it.

mod block;
mod document;
mod geometry;
mod page;

pub use block::PageBlock;
pub use document::Document;
pub use geometry::BBox;
pub use page::Page;
