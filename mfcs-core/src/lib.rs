pub mod call;
pub mod correlator;
pub mod parser;
pub mod prompt;
pub mod settings;
pub mod turn;

// Public library API - the types most callers need to drive a turn.
pub use call::{CallFamily, CallKey, CallResult, PendingCall};
pub use correlator::{Correlator, TurnReport};
pub use parser::{parse_calls, Markers, ParsedResponse, StreamParser};
pub use settings::{Settings, SettingsManager};
pub use turn::{Turn, TurnEvent};
