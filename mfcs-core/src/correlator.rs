use crate::call::{CallFamily, CallKey, CallResult, PendingCall};
use crate::parser::Markers;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Final outcome of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReport {
    /// The stream finished without a single call.
    NoCalls,
    /// Aggregated result blocks, one per family that had calls.
    Results(String),
}

impl TurnReport {
    pub fn into_text(self) -> Option<String> {
        match self {
            TurnReport::NoCalls => None,
            TurnReport::Results(text) => Some(text),
        }
    }
}

/// Tracks discovered calls and submitted results for one turn and decides
/// when the aggregated report is ready.
#[derive(Debug)]
pub struct Correlator {
    markers: Arc<Markers>,
    calls: BTreeMap<CallKey, PendingCall>,
    results: BTreeMap<CallKey, CallResult>,
    finished: bool,
    reported: bool,
}

impl Correlator {
    pub fn new(markers: Arc<Markers>) -> Self {
        Self {
            markers,
            calls: BTreeMap::new(),
            results: BTreeMap::new(),
            finished: false,
            reported: false,
        }
    }

    pub fn register_call(&mut self, call: PendingCall) {
        let key = call.key();
        if let Some(previous) = self.calls.insert(key, call) {
            warn!(%key, previous = %previous.name, "Call identifier reused, replacing earlier call");
        }
    }

    /// Records a result. A second result for the same call replaces the
    /// first.
    pub fn submit_result(&mut self, result: CallResult) -> Option<TurnReport> {
        let key = result.key();
        if !self.calls.contains_key(&key) {
            warn!(%key, name = %result.name, "Result submitted for unknown call");
        }
        if self.results.insert(key, result).is_some() {
            warn!(%key, "Duplicate result, keeping the latest");
        }

        if self.finished {
            self.check_completion()
        } else {
            None
        }
    }

    /// Marks the stream finished and checks for completion.
    pub fn finish(&mut self) -> Option<TurnReport> {
        self.finished = true;
        self.check_completion()
    }

    /// Returns the report the first time the turn is complete and `None` on
    /// every other call.
    pub fn check_completion(&mut self) -> Option<TurnReport> {
        if self.reported || !self.finished {
            return None;
        }

        if self.calls.is_empty() {
            self.reported = true;
            info!("Turn finished without calls");
            return Some(TurnReport::NoCalls);
        }

        let answered = self.answered();
        if answered != self.calls.len() {
            debug!(
                answered,
                discovered = self.calls.len(),
                "Waiting for more results"
            );
            return None;
        }

        self.reported = true;
        info!(results = answered, "All call results ready");
        Some(TurnReport::Results(self.render()))
    }

    pub fn call(&self, key: &CallKey) -> Option<&PendingCall> {
        self.calls.get(key)
    }

    pub fn discovered(&self) -> usize {
        self.calls.len()
    }

    /// Number of discovered calls that have a result.
    pub fn answered(&self) -> usize {
        self.calls
            .keys()
            .filter(|key| self.results.contains_key(key))
            .count()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    fn render(&self) -> String {
        // Both maps order by family first, then ascending id
        let mut grouped: BTreeMap<CallFamily, Vec<String>> = BTreeMap::new();
        for (key, result) in &self.results {
            if !self.calls.contains_key(key) {
                continue;
            }
            let line = format!(
                "[{}: {} name: {}] {}",
                self.markers.family(key.family).id_field,
                key.id,
                result.name,
                result.payload_text()
            );
            grouped.entry(key.family).or_default().push(line);
        }

        grouped
            .iter()
            .map(|(family, lines)| self.wrap(*family, lines))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn wrap(&self, family: CallFamily, lines: &[String]) -> String {
        let markers = self.markers.family(family);
        format!(
            "{}\n{}\n{}",
            markers.result_open,
            lines.join("\n"),
            markers.result_close
        )
    }
}
