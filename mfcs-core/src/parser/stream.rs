use crate::call::PendingCall;
use crate::parser::block::parse_block_body;
use crate::parser::markers::{resume_point, BlockSearch, Markers};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    /// No opening marker of this family starts before this offset.
    scan_from: usize,
    /// When a block is open, no closing marker exists before this offset.
    close_from: usize,
}

/// Incrementally extracts call blocks from streamed model output.
///
/// Text is appended to a buffer and each family keeps its own cursor into
/// it. Everything behind every cursor has been consumed and is dropped from
/// the front of the buffer, so a block split across any number of fragments
/// is reported exactly once, as soon as its closing marker arrives.
#[derive(Debug)]
pub struct StreamParser {
    markers: Arc<Markers>,
    buffer: String,
    /// Stream offset of `buffer[0]`.
    base: usize,
    cursors: Vec<Cursor>,
    finished: bool,
}

impl StreamParser {
    pub fn new(markers: Arc<Markers>) -> Self {
        let cursors = vec![Cursor::default(); markers.families().len()];
        Self {
            markers,
            buffer: String::new(),
            base: 0,
            cursors,
            finished: false,
        }
    }

    /// Appends `fragment` and returns every call completed by it, ordered by
    /// the position of their opening markers in the stream.
    pub fn feed(&mut self, fragment: &str) -> Vec<PendingCall> {
        if self.finished {
            if !fragment.is_empty() {
                warn!(len = fragment.len(), "Ignoring fragment fed after end of stream");
            }
            return Vec::new();
        }
        if fragment.is_empty() {
            return Vec::new();
        }
        self.buffer.push_str(fragment);

        let mut found = Vec::new();
        for (index, family) in self.markers.families().iter().enumerate() {
            let cursor = &mut self.cursors[index];
            loop {
                match family.find_block(&self.buffer, cursor.scan_from, cursor.close_from) {
                    BlockSearch::Complete(span) => {
                        *cursor = Cursor {
                            scan_from: span.end,
                            close_from: 0,
                        };
                        let body = &self.buffer[span.body_start..span.body_end];
                        match parse_block_body(body, family) {
                            Ok(call) => {
                                debug!(family = %call.family, id = call.id, name = %call.name, "Discovered call");
                                found.push((self.base + span.start, call));
                            }
                            Err(e) => {
                                debug!(family = %family.family, error = %e, "Dropping malformed block");
                            }
                        }
                    }
                    BlockSearch::Open { start } => {
                        let body_start = start + family.open.len();
                        *cursor = Cursor {
                            scan_from: start,
                            close_from: resume_point(&self.buffer, body_start, family.close.len()),
                        };
                        break;
                    }
                    BlockSearch::NotFound => {
                        *cursor = Cursor {
                            scan_from: resume_point(
                                &self.buffer,
                                cursor.scan_from,
                                family.open.len(),
                            ),
                            close_from: 0,
                        };
                        break;
                    }
                }
            }
        }

        self.compact();
        found.sort_by_key(|(position, _)| *position);
        found.into_iter().map(|(_, call)| call).collect()
    }

    /// Marks the end of the stream. Returns false if it was already marked.
    pub fn finish(&mut self) -> bool {
        !std::mem::replace(&mut self.finished, true)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Text that is not yet consumed by every family, including any block
    /// still waiting for its closing marker.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Total bytes fed so far.
    pub fn stream_len(&self) -> usize {
        self.base + self.buffer.len()
    }

    fn compact(&mut self) {
        let Some(consumed) = self.cursors.iter().map(|c| c.scan_from).min() else {
            return;
        };
        if consumed == 0 {
            return;
        }
        self.buffer.drain(..consumed);
        self.base += consumed;
        for cursor in &mut self.cursors {
            cursor.scan_from -= consumed;
            cursor.close_from = cursor.close_from.saturating_sub(consumed);
        }
    }
}
