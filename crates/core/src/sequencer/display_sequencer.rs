use std::collections::{HashSet, VecDeque};

use log::debug;

use super::sequencer_model::{Completion, DeliveryChannel, DisplayState, Offer};
use crate::constants::DEFAULT_SEEN_WINDOW;
use crate::errors::{Error, Result};
use crate::results::AnalysisResult;

/// Bounded memory of handled result ids, oldest forgotten first.
#[derive(Debug, Clone)]
struct SeenIds {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SeenIds {
    fn new(capacity: usize) -> Self {
        Self {
            ids: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn insert(&mut self, id: &str) {
        if !self.ids.insert(id.to_string()) {
            return;
        }
        self.order.push_back(id.to_string());
        while self.order.len() > self.capacity {
            if let Some(forgotten) = self.order.pop_front() {
                self.ids.remove(&forgotten);
            }
        }
    }
}

/// Serializes results from both delivery channels into one-at-a-time display.
///
/// A result whose id was already shown, is showing, or is queued is never
/// displayed or queued again. Ids are remembered for a bounded window, which
/// must be at least the server's store capacity so a pull cannot resurface a
/// result the kiosk already forgot.
#[derive(Debug, Clone)]
pub struct DisplaySequencer {
    current: Option<AnalysisResult>,
    queue: VecDeque<AnalysisResult>,
    seen: SeenIds,
}

impl Default for DisplaySequencer {
    fn default() -> Self {
        Self {
            current: None,
            queue: VecDeque::new(),
            seen: SeenIds::new(DEFAULT_SEEN_WINDOW),
        }
    }
}

impl DisplaySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seen_window(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::invalid_config("seen-id window must be at least 1"));
        }
        Ok(Self {
            seen: SeenIds::new(window),
            ..Self::default()
        })
    }

    pub fn state(&self) -> DisplayState {
        if self.current.is_some() {
            DisplayState::Showing
        } else {
            DisplayState::Idle
        }
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.current.as_ref()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether `id` would be rejected as a duplicate.
    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
            || self.current.as_ref().is_some_and(|current| current.id == id)
            || self.queue.iter().any(|queued| queued.id == id)
    }

    pub fn offer(&mut self, result: AnalysisResult, channel: DeliveryChannel) -> Offer {
        if self.has_seen(&result.id) {
            debug!("Ignoring duplicate result {} from {}", result.id, channel);
            return Offer::Duplicate;
        }
        self.seen.insert(&result.id);

        if self.current.is_none() {
            debug!("Displaying result {} from {}", result.id, channel);
            self.current = Some(result.clone());
            return Offer::Displayed(result);
        }

        debug!("Queueing result {} from {}", result.id, channel);
        self.queue.push_back(result);
        Offer::Queued {
            position: self.queue.len(),
        }
    }

    /// Handles a display-complete signal (timer expiry or operator skip).
    pub fn complete(&mut self) -> Completion {
        if self.current.is_none() {
            return Completion::AlreadyIdle;
        }
        match self.queue.pop_front() {
            Some(next) => {
                self.current = Some(next.clone());
                Completion::Next(next)
            }
            None => {
                self.current = None;
                Completion::Idle
            }
        }
    }
}
