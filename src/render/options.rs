//! Rendering options.

/// Options for rendering an ordered text sequence as plain text.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit a `--- Page N ---` header before each page's segments
    pub page_headers: bool,

    /// Boundary marker placed between consecutive segments of a page
    pub segment_separator: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable page headers.
    pub fn with_page_headers(mut self, headers: bool) -> Self {
        self.page_headers = headers;
        self
    }

    /// Set the segment separator.
    pub fn with_segment_separator(mut self, separator: impl Into<String>) -> Self {
        self.segment_separator = separator.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_headers: true,
            segment_separator: "\n".to_string(),
        }
    }
}
