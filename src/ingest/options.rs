//! Ingestion options.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Options for reading extractor output.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Page selection (1-indexed extractor page numbers)
    pub pages: PageSelection,
}

impl IngestOptions {
    /// Create new ingest options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (drop malformed blocks instead of failing).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

/// Error handling mode during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Reject the document at the first malformed block
    #[default]
    Strict,
    /// Drop malformed blocks with a warning and continue
    Lenient,
}

/// Which extractor pages to ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let number = |part: &str| -> Result<u32> {
            part.trim()
                .parse()
                .map_err(|_| Error::InvalidOptions(format!("invalid page number '{}'", part)))
        };

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                return Ok(PageSelection::Range(number(start)?..=number(end)?));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            match part.split_once('-') {
                Some((start, end)) => pages.extend(number(start)?..=number(end)?),
                None => pages.push(number(part)?),
            }
        }
        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_options_builder() {
        let options = IngestOptions::new()
            .lenient()
            .with_pages(PageSelection::Range(2..=3));
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.pages.includes(2));
        assert!(!options.pages.includes(4));
        assert_eq!(IngestOptions::default().error_mode, ErrorMode::Strict);
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-10").unwrap(),
            PageSelection::Range(1..=10)
        );
        assert_eq!(
            PageSelection::parse("7,1,3,5-7").unwrap(),
            PageSelection::Pages(vec![1, 3, 5, 6, 7])
        );
        assert!(PageSelection::parse("1,x").is_err());
    }

    #[test]
    fn test_unsorted_pages_included() {
        let pages = PageSelection::Pages(vec![3, 1]);
        assert!(pages.includes(1));
        assert!(pages.includes(3));
        assert!(!pages.includes(2));
    }
}
