pub mod events;

use crate::call::{CallFamily, CallResult};
use crate::correlator::{Correlator, TurnReport};
use crate::parser::{Markers, StreamParser};
use crate::settings::Settings;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

pub use events::{EventSender, TurnEvent};

/// One model response and the results of the calls it made.
///
/// Model output goes in through `feed`, capability output through
/// `submit_result`. Everything observable comes out of the event channel
/// returned by the constructor, synchronously, in the order it happened.
/// Nothing here fails: malformed blocks and stray results are logged and
/// absorbed. A new response needs a new `Turn`.
pub struct Turn {
    parser: StreamParser,
    correlator: Correlator,
    events: EventSender,
}

impl Turn {
    pub fn new(markers: Arc<Markers>) -> (Self, mpsc::UnboundedReceiver<TurnEvent>) {
        let (events, event_rx) = EventSender::new();
        let turn = Self {
            parser: StreamParser::new(markers.clone()),
            correlator: Correlator::new(markers),
            events,
        };
        (turn, event_rx)
    }

    pub fn from_settings(settings: &Settings) -> (Self, mpsc::UnboundedReceiver<TurnEvent>) {
        Self::new(Arc::new(Markers::from_settings(settings)))
    }

    /// Feeds the next fragment of model output. `is_final` marks the end of
    /// the response and checks for completion even if no call was found.
    pub fn feed(&mut self, fragment: &str, is_final: bool) {
        for call in self.parser.feed(fragment) {
            self.correlator.register_call(call.clone());
            self.events.send(TurnEvent::CallDiscovered(call));
        }

        if is_final {
            if !self.parser.finish() {
                debug!("End of stream signalled more than once");
            }
            let report = self.correlator.finish();
            self.emit(report);
        }
    }

    pub fn submit_result(
        &mut self,
        id: i64,
        family: CallFamily,
        name: impl Into<String>,
        payload: serde_json::Value,
    ) {
        self.submit(CallResult::new(id, family, name, payload));
    }

    pub fn submit(&mut self, result: CallResult) {
        let report = self.correlator.submit_result(result);
        self.emit(report);
    }

    pub fn is_finished(&self) -> bool {
        self.parser.is_finished()
    }

    pub fn is_complete(&self) -> bool {
        self.correlator.is_reported()
    }

    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    pub fn events(&self) -> &EventSender {
        &self.events
    }

    fn emit(&self, report: Option<TurnReport>) {
        if let Some(report) = report {
            self.events.send(TurnEvent::TurnComplete {
                report: report.into_text(),
            });
        }
    }
}
