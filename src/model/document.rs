//! Document-level types.

use super::Page;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The block lists of every page of one source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Source name (typically the PDF file stem)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with a source name.
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            pages: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by its index.
    pub fn get_page(&self, index: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.index == index)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of text blocks across all pages.
    pub fn text_count(&self) -> usize {
        self.pages.iter().map(Page::text_count).sum()
    }

    /// Total number of image blocks across all pages.
    pub fn image_count(&self) -> usize {
        self.pages.iter().map(Page::image_count).sum()
    }

    /// Pages sorted by page index.
    pub fn pages_in_order(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.iter().collect();
        pages.sort_by_key(|p| p.index);
        pages
    }

    /// Reject documents that list the same page index twice.
    pub fn check_page_indices(&self) -> Result<()> {
        let pages = self.pages_in_order();
        match pages.windows(2).find(|w| w[0].index == w[1].index) {
            Some(w) => Err(Error::InvalidInput(format!(
                "page {} appears more than once",
                w[0].index + 1
            ))),
            None => Ok(()),
        }
    }

    /// Validate page indices and every page; the first malformed block is
    /// reported.
    pub fn validate(&self) -> Result<()> {
        self.check_page_indices()?;
        for page in self.pages_in_order() {
            page.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    #[test]
    fn test_document_counts() {
        let mut doc = Document::with_source("118a");
        let mut p0 = Page::new(0);
        p0.add_text(BBox::new(0.0, 0.0, 10.0, 10.0), "a");
        p0.add_image(BBox::new(0.0, 20.0, 10.0, 30.0), "img");
        doc.add_page(p0);
        doc.add_page(Page::new(1));

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.text_count(), 1);
        assert_eq!(doc.image_count(), 1);
        assert!(doc.get_page(1).unwrap().is_empty());
        assert!(doc.get_page(5).is_none());
        assert_eq!(doc.source.as_deref(), Some("118a"));
    }

    #[test]
    fn test_pages_in_order() {
        let mut doc = Document::new();
        doc.add_page(Page::new(2));
        doc.add_page(Page::new(0));
        doc.add_page(Page::new(1));
        let order: Vec<u32> = doc.pages_in_order().iter().map(|p| p.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_reports_first_bad_page() {
        let mut doc = Document::new();
        let mut bad = Page::new(1);
        bad.add_text(BBox::new(0.0, 0.0, 0.0, 10.0), "x");
        doc.add_page(bad);
        doc.add_page(Page::new(0));
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_pages() {
        let mut doc = Document::new();
        doc.add_page(Page::new(0));
        doc.add_page(Page::new(1));
        doc.add_page(Page::new(0));
        assert!(matches!(doc.validate(), Err(Error::InvalidInput(_))));
    }
}
