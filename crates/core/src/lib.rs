//! Kioskfeed Core - result model, normalization, storage and display sequencing.
//!
//! This crate holds everything between an inbound webhook body and the
//! moment a kiosk decides which result to put on screen. It has no HTTP or
//! runtime dependencies; the server and display apps wire it to the network.

pub mod constants;
pub mod errors;
pub mod events;
pub mod ingest;
pub mod normalizer;
pub mod results;
pub mod sequencer;
pub mod store;
pub mod utils;

pub use results::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
