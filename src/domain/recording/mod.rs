//! Recording domain: session state machine, chunk buffer, durations

pub mod chunks;
pub mod duration;
pub mod session;

pub use chunks::{AudioFragment, ChunkBuffer, FragmentSink};
pub use duration::RecordDuration;
pub use session::{InvalidStateTransition, RecordingSession, RecordingStatus};
