pub mod config;
pub mod sequence;
pub mod sequencer;
pub mod sink;
pub mod state;

pub use config::{ConfigError, ExperimentConfig};
pub use sequence::TrialSequence;
pub use sequencer::{SequenceError, generate_sequence, pair_count};
pub use sink::{JsonLinesSink, MemorySink, ResponseSink, SessionId, SinkError};
pub use state::{SessionEvent, SessionStateMachine, TransitionError, transition};
