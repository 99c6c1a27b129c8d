use std::fmt;

use serde::{Deserialize, Serialize};

use crate::results::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayState {
    /// Nothing to show; the intake screen is up.
    Idle,
    /// One result is on screen.
    Showing,
}

/// Channel a result arrived on. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryChannel {
    Push,
    Pull,
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryChannel::Push => f.write_str("push"),
            DeliveryChannel::Pull => f.write_str("pull"),
        }
    }
}

/// What the sequencer did with an offered result.
#[derive(Debug, Clone, PartialEq)]
pub enum Offer {
    /// The sequencer was idle; the result is now on screen.
    Displayed(AnalysisResult),
    /// Appended to the wait list at 1-based `position`.
    Queued { position: usize },
    /// Already shown, showing or queued.
    Duplicate,
}

/// Result of a display-complete signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The head of the wait list is now on screen.
    Next(AnalysisResult),
    /// The wait list was empty; back to idle.
    Idle,
    /// Nothing was showing.
    AlreadyIdle,
}
