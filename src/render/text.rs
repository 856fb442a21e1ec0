//! Plain text rendering of ordered sequences.

use crate::layout::OrderedTextSequence;
use crate::model::Document;

use super::RenderOptions;

/// Render an ordered sequence as plain text.
///
/// Pages appear in sequence order. With page headers enabled each page
/// starts with `--- Page N ---` (N is 1-indexed) and ends with a blank
/// line; pages without text produce no output (see [`to_document_text`]).
pub fn to_text(sequence: &OrderedTextSequence, options: &RenderOptions) -> String {
    let mut output = String::new();
    let mut segments = sequence.iter().peekable();

    while let Some(first) = segments.next() {
        let page = first.page;
        let mut texts = vec![first.text.as_str()];
        while let Some(next) = segments.next_if(|s| s.page == page) {
            texts.push(next.text.as_str());
        }

        if options.page_headers {
            output.push_str(&format!("--- Page {} ---\n", page + 1));
            output.push_str(&texts.join(&options.segment_separator));
            output.push_str("\n\n");
        } else {
            if !output.is_empty() {
                output.push_str(&options.segment_separator);
            }
            output.push_str(&texts.join(&options.segment_separator));
        }
    }

    output
}

/// Render a document's ordered sequence as plain text.
///
/// Unlike [`to_text`], every page of the document gets its header when
/// headers are enabled, so pages without text still keep their place.
pub fn to_document_text(
    doc: &Document,
    sequence: &OrderedTextSequence,
    options: &RenderOptions,
) -> String {
    if !options.page_headers {
        return to_text(sequence, options);
    }

    let mut output = String::new();
    let mut segments = sequence.iter().peekable();

    for page in doc.pages_in_order() {
        let mut texts = Vec::new();
        while let Some(segment) = segments.next_if(|s| s.page <= page.index) {
            if segment.page == page.index {
                texts.push(segment.text.as_str());
            }
        }
        output.push_str(&format!("--- Page {} ---\n", page.index + 1));
        output.push_str(&texts.join(&options.segment_separator));
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ColumnSlot, Segment};
    use crate::model::Page;

    fn sequence() -> OrderedTextSequence {
        let seg = |page, i, text: &str| Segment {
            page,
            block_index: i,
            slot: ColumnSlot::Column(0),
            text: text.to_string(),
        };
        OrderedTextSequence {
            segments: vec![seg(0, 0, "a"), seg(0, 1, "b"), seg(2, 0, "c")],
        }
    }

    #[test]
    fn test_to_text_with_page_headers() {
        let text = to_text(&sequence(), &RenderOptions::default());
        assert_eq!(text, "--- Page 1 ---\na\nb\n\n--- Page 3 ---\nc\n\n");
    }

    #[test]
    fn test_to_text_plain() {
        let options = RenderOptions::new().with_page_headers(false);
        assert_eq!(to_text(&sequence(), &options), "a\nb\nc");
    }

    #[test]
    fn test_to_text_empty() {
        let empty = OrderedTextSequence::default();
        assert_eq!(to_text(&empty, &RenderOptions::default()), "");
    }

    #[test]
    fn test_document_text_keeps_empty_pages() {
        let mut doc = Document::new();
        for index in [2, 0, 1] {
            doc.add_page(Page::new(index));
        }
        let text = to_document_text(&doc, &sequence(), &RenderOptions::default());
        assert_eq!(
            text,
            "--- Page 1 ---\na\nb\n\n--- Page 2 ---\n\n\n--- Page 3 ---\nc\n\n"
        );

        let plain = RenderOptions::new().with_page_headers(false);
        assert_eq!(to_document_text(&doc, &sequence(), &plain), "a\nb\nc");
    }
}
