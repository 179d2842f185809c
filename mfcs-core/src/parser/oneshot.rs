use crate::call::PendingCall;
use crate::parser::block::parse_block_body;
use crate::parser::markers::{BlockSearch, Markers};
use serde::Serialize;
use tracing::debug;

/// Calls found in a complete response, plus the text a user should see.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedResponse {
    pub calls: Vec<PendingCall>,
    /// Response text with every complete block removed, trimmed.
    pub display_text: String,
}

/// Parses a complete (non-streamed) response.
///
/// Malformed blocks are removed from the display text but produce no call,
/// the same as in streaming mode. An unclosed opening marker is left in the
/// display text unchanged.
pub fn parse_calls(text: &str, markers: &Markers) -> ParsedResponse {
    let mut blocks = Vec::new();

    for family in markers.families() {
        let mut from = 0;
        while let BlockSearch::Complete(span) = family.find_block(text, from, 0) {
            let call = parse_block_body(&text[span.body_start..span.body_end], family)
                .map_err(|e| {
                    debug!(family = %family.family, error = %e, "Dropping malformed block");
                })
                .ok();
            blocks.push((span.start, span.end, call));
            from = span.end;
        }
    }

    blocks.sort_by_key(|(start, _, _)| *start);

    let mut display_text = String::new();
    let mut last_end = 0;
    let mut calls = Vec::new();
    for (start, end, call) in blocks {
        // A block of one family nested inside another family's block is
        // already covered by the outer block's removal.
        if start >= last_end {
            display_text.push_str(&text[last_end..start]);
            last_end = end;
        } else {
            last_end = last_end.max(end);
        }
        calls.extend(call);
    }
    display_text.push_str(&text[last_end..]);

    debug!(
        call_count = calls.len(),
        remaining_len = display_text.len(),
        "Parsed response calls"
    );

    ParsedResponse {
        calls,
        display_text: display_text.trim().to_string(),
    }
}
