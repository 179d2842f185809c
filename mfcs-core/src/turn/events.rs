use crate::call::PendingCall;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// `TurnEvent`s are the output of a turn.
///
/// A dispatcher listens for `CallDiscovered`, runs the named capability and
/// submits its result back to the turn. `TurnComplete` is sent once, with
/// the aggregated report to feed into the next model request, or `None` when
/// the model made no calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum TurnEvent {
    CallDiscovered(PendingCall),
    TurnComplete { report: Option<String> },
}

/// A small wrapper over the `event_tx` for convienance.
#[derive(Clone)]
pub struct EventSender {
    event_tx: mpsc::UnboundedSender<TurnEvent>,
    event_history: Arc<Mutex<Vec<TurnEvent>>>,
}

impl EventSender {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TurnEvent>) {
        let (event_tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                event_tx,
                event_history: Arc::new(Mutex::new(Vec::new())),
            },
            rx,
        )
    }

    pub fn send(&self, event: TurnEvent) {
        if let Ok(mut history) = self.event_history.lock() {
            history.push(event.clone());
        }
        // A dropped receiver only means nobody is listening any more
        let _ = self.event_tx.send(event);
    }

    pub fn event_history(&self) -> Vec<TurnEvent> {
        self.event_history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}
