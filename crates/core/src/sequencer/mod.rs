//! Consumer-side display sequencing.
//!
//! Results reach a kiosk over two channels that may overlap or miss events.
//! The sequencer dedupes them by id and shows them one at a time in arrival
//! order.

mod display_sequencer;
mod sequencer_model;

pub use display_sequencer::DisplaySequencer;
pub use sequencer_model::{Completion, DeliveryChannel, DisplayState, Offer};
