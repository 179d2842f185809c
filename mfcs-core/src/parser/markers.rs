use crate::call::CallFamily;
use crate::settings::{FamilyTags, Settings};
use regex::Regex;
use strum::VariantArray;

/// Position of a complete block inside a haystack. All offsets are byte
/// offsets into the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub start: usize,
    pub body_start: usize,
    pub body_end: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSearch {
    Complete(BlockSpan),
    /// Opening marker found at `start` but its closing marker has not arrived.
    Open { start: usize },
    NotFound,
}

/// Compiled field patterns for one family's block body.
#[derive(Debug, Clone)]
pub struct FieldPatterns {
    pub instructions: Regex,
    pub id: Regex,
    pub name: Regex,
    pub parameters: Regex,
}

impl FieldPatterns {
    fn compile(id_field: &str) -> Self {
        Self {
            instructions: field_regex("instructions"),
            id: field_regex(id_field),
            name: field_regex("name"),
            parameters: field_regex("parameters"),
        }
    }
}

// Tag names are escaped, so the pattern is always valid.
fn field_regex(tag: &str) -> Regex {
    let tag = regex::escape(tag);
    Regex::new(&format!(r"(?is)<{tag}>(.*?)</{tag}>")).expect("escaped field pattern compiles")
}

/// Everything needed to recognise and render one call family.
#[derive(Debug, Clone)]
pub struct FamilyMarkers {
    pub family: CallFamily,
    pub open: String,
    pub close: String,
    pub id_field: String,
    pub result_open: String,
    pub result_close: String,
    pub fields: FieldPatterns,
}

impl FamilyMarkers {
    pub fn new(family: CallFamily, tags: &FamilyTags) -> Self {
        Self {
            family,
            open: format!("<{}>", tags.call_tag),
            close: format!("</{}>", tags.call_tag),
            id_field: tags.id_field.clone(),
            result_open: format!("<{}>", tags.result_tag),
            result_close: format!("</{}>", tags.result_tag),
            fields: FieldPatterns::compile(&tags.id_field),
        }
    }

    /// Finds the earliest block whose opening marker starts at or after
    /// `from`. The closing marker is the first one after the opening marker,
    /// searched no earlier than `close_from`.
    pub fn find_block(&self, text: &str, from: usize, close_from: usize) -> BlockSearch {
        let Some(open_rel) = text[from..].find(&self.open) else {
            return BlockSearch::NotFound;
        };
        let start = from + open_rel;
        let body_start = start + self.open.len();
        let close_search = close_from.max(body_start);

        match text[close_search..].find(&self.close) {
            Some(close_rel) => {
                let body_end = close_search + close_rel;
                BlockSearch::Complete(BlockSpan {
                    start,
                    body_start,
                    body_end,
                    end: body_end + self.close.len(),
                })
            }
            None => BlockSearch::Open { start },
        }
    }
}

/// Marker vocabulary for every family, built once from settings and shared
/// read-only by parsers and correlators.
#[derive(Debug, Clone)]
pub struct Markers {
    families: Vec<FamilyMarkers>,
}

impl Markers {
    pub fn from_settings(settings: &Settings) -> Self {
        let families = CallFamily::VARIANTS
            .iter()
            .map(|family| FamilyMarkers::new(*family, settings.tags(*family)))
            .collect();
        Self { families }
    }

    pub fn families(&self) -> &[FamilyMarkers] {
        &self.families
    }

    pub fn family(&self, family: CallFamily) -> &FamilyMarkers {
        // `families` is built from `CallFamily::VARIANTS` in declaration order
        &self.families[family as usize]
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Latest position a scan may resume from without skipping an opening marker
/// that is still being streamed in.
pub(crate) fn resume_point(text: &str, from: usize, marker_len: usize) -> usize {
    let mut point = text
        .len()
        .saturating_sub(marker_len.saturating_sub(1))
        .max(from);
    while !text.is_char_boundary(point) {
        point -= 1;
    }
    point
}
