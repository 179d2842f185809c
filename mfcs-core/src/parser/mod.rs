pub mod block;
pub mod markers;
pub mod oneshot;
pub mod stream;

pub use block::{parse_block_body, BlockError};
pub use markers::{FamilyMarkers, Markers};
pub use oneshot::{parse_calls, ParsedResponse};
pub use stream::StreamParser;
