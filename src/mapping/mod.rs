//! Rule-based mapping of associated images to exam questions.
//!
//! The text an image was associated with usually carries a label such as
//! `(A 問題20)` for a single question or `問題60〜62` for a block of
//! consecutive questions. The mapper extracts that label as a join key and
//! groups the images under it, assigning sub-image letters `A`, `B`, … in
//! reference order.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::layout::AssociationRecord;

/// Block letter used for consecutive-question keys when the source name
/// does not carry one.
const FALLBACK_BLOCK: char = 'X';

/// Identifier tying an image to a question or a run of questions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JoinKey {
    /// One question, e.g. `A-20`
    Single {
        /// Question block letter
        block: char,
        /// Question number
        number: u32,
    },
    /// Consecutive questions sharing a figure, e.g. `C-60-62`
    Range {
        /// Question block letter
        block: char,
        /// First question number
        start: u32,
        /// Last question number
        end: u32,
    },
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKey::Single { block, number } => write!(f, "{}-{}", block, number),
            JoinKey::Range { block, start, end } => write!(f, "{}-{}-{}", block, start, end),
        }
    }
}

/// An image filed under a join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedImage {
    /// Sub-image letter within the key (`A`, `B`, …)
    pub image_id: String,
    /// Opaque image reference
    pub reference: String,
    /// 1-indexed source page
    pub source_page: u32,
    /// Text the key was extracted from
    pub source_text: String,
}

/// Images grouped by join key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageMapping {
    /// Entries keyed by the join key's string form
    pub entries: BTreeMap<String, Vec<MappedImage>>,
}

impl ImageMapping {
    /// Images under a key.
    pub fn get(&self, key: &str) -> Option<&[MappedImage]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no image was mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extracts join keys from associated text.
pub struct JoinKeyMapper {
    single: Regex,
    range: Regex,
    range_block: char,
}

impl JoinKeyMapper {
    /// Create a mapper without a source name.
    pub fn new() -> Self {
        Self::for_source(None)
    }

    /// Create a mapper for a document.
    ///
    /// Consecutive-question keys take their block letter from the source
    /// name, e.g. `tp220502-01c_01` yields `C`.
    pub fn for_source(source: Option<&str>) -> Self {
        let stem = Regex::new(r"-(\d{2})([a-zA-Z])_").expect("source pattern is valid");
        let range_block = source
            .and_then(|s| stem.captures(s))
            .and_then(|c| c[2].chars().next())
            .map_or(FALLBACK_BLOCK, |c| c.to_ascii_uppercase());

        Self {
            single: Regex::new(r"\(([A-Z])\s*問題\s*(\d+)\s*\)").expect("single pattern is valid"),
            range: Regex::new(r"問題\s*(\d+)((?:(?:[〜~、,]|\s)+\d+)+)")
                .expect("range pattern is valid"),
            range_block,
        }
    }

    /// Extract the join key from a piece of text.
    ///
    /// Full-width characters are folded first. A consecutive range takes
    /// precedence and ends at the last number of the run; otherwise the
    /// last single-question label wins.
    pub fn extract(&self, text: &str) -> Option<JoinKey> {
        let text: String = text.nfkc().collect();

        if let Some(caps) = self.range.captures(&text) {
            // `問題60、61、62` runs from the first number to the last
            let last = caps[2]
                .rsplit(|c: char| !c.is_ascii_digit())
                .find(|n| !n.is_empty());
            if let (Ok(start), Some(Ok(end))) = (caps[1].parse(), last.map(str::parse)) {
                return Some(JoinKey::Range {
                    block: self.range_block,
                    start,
                    end,
                });
            }
        }

        self.single.captures_iter(&text).last().and_then(|caps| {
            let block = caps[1].chars().next()?;
            let number = caps[2].parse().ok()?;
            Some(JoinKey::Single { block, number })
        })
    }

    /// Group associated images by join key.
    ///
    /// Images without associated text or without a recognizable label are
    /// skipped; a reference already filed under a key is not filed again.
    pub fn map(&self, records: &[AssociationRecord]) -> ImageMapping {
        let mut entries: BTreeMap<String, Vec<MappedImage>> = BTreeMap::new();

        for record in records {
            let Some(text) = record.associated_text() else {
                continue;
            };
            let Some(key) = self.extract(text) else {
                log::warn!(
                    "Could not parse join key from text associated with {} on page {}: '{}'",
                    record.reference,
                    record.page + 1,
                    text
                );
                continue;
            };

            let images = entries.entry(key.to_string()).or_default();
            if images.iter().any(|i| i.reference == record.reference) {
                continue;
            }
            images.push(MappedImage {
                image_id: String::new(),
                reference: record.reference.clone(),
                source_page: record.page + 1,
                source_text: text.to_string(),
            });
        }

        for images in entries.values_mut() {
            images.sort_by(|a, b| a.reference.cmp(&b.reference));
            for (i, image) in images.iter_mut().enumerate() {
                image.image_id = sub_image_label(i);
            }
        }

        ImageMapping { entries }
    }
}

impl Default for JoinKeyMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// `A`, `B`, …, `Z`, then `AA`, `AB`, …
fn sub_image_label(mut i: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (i % 26) as u8);
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}
