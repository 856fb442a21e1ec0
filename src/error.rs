//! Error types for exam-reflow.

use std::io;
use thiserror::Error;

/// Result type alias for exam-reflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while ingesting and laying out page blocks.
///
/// Ambiguous layouts and pages without text are not errors: they resolve to
/// a single column and an explicit "no association" value respectively.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input could not be read as extractor JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A block has a degenerate or otherwise invalid geometry or content.
    #[error("Malformed block {index} on page {page}: {reason}")]
    MalformedBlock {
        /// Page index (0-based)
        page: u32,
        /// Extraction index of the block within its page
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// An extractor record holds a block with invalid geometry or content.
    ///
    /// `location` names the element as the extractor wrote it, e.g.
    /// `text block 3` or `image xref12 rect 0`.
    #[error("Malformed {location} on extractor page {page_number}: {reason}")]
    MalformedRawBlock {
        /// 1-indexed extractor page number
        page_number: u32,
        /// Element within the page record
        location: String,
        /// What is wrong with it
        reason: String,
    },

    /// Extractor output is structurally unusable.
    #[error("Invalid extractor input: {0}")]
    InvalidInput(String),

    /// Layout or ingest options are out of range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn malformed(page: u32, index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedBlock {
            page,
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed(2, 7, "x0 >= x1");
        assert_eq!(err.to_string(), "Malformed block 7 on page 2: x0 >= x1");

        let err = Error::MalformedRawBlock {
            page_number: 2,
            location: "text block 1".to_string(),
            reason: "x0 (100) >= x1 (50)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed text block 1 on extractor page 2: x0 (100) >= x1 (50)"
        );

        let err = Error::InvalidOptions("gap_fraction must be in (0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid options: gap_fraction must be in (0, 1]"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
