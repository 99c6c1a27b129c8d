//! Result events.
//!
//! The ingest service hands every stored result to a [`ResultSink`] right
//! after insertion. Runtime adapters implement the sink to fan results out
//! to live subscribers.

mod sink;

pub use sink::*;
