//! JSON rendering for layout results.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a layout result (sequence, association table, mapping) to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SpatialAssociator;
    use crate::model::{BBox, Page};

    fn records() -> Vec<crate::layout::AssociationRecord> {
        let mut page = Page::new(0);
        page.add_text(BBox::new(0.0, 0.0, 10.0, 10.0), "問題1");
        page.add_image(BBox::new(0.0, 20.0, 10.0, 30.0), "xref5");
        SpatialAssociator::new().associate_page(&page)
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&records(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"reference\": \"xref5\""));
        assert!(json.contains("問題1"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&records(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"status\":\"text\""));
    }
}
