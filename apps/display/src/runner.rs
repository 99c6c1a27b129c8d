//! Display event loop.
//!
//! Merges push deliveries, pull-fallback ticks, the display timer and
//! operator commands into one sequence of sequencer transitions.

use std::sync::Arc;
use std::time::Duration;

use kioskfeed_core::sequencer::{Completion, DeliveryChannel, DisplaySequencer, Offer};
use kioskfeed_core::AnalysisResult;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::pull::PullSource;
use crate::push::ConnectionStatus;
use crate::render::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCommand {
    /// Operator ended the current result early.
    Skip,
    Shutdown,
}

/// Inputs the runner listens on.
pub struct RunnerChannels {
    pub pushed: mpsc::Receiver<AnalysisResult>,
    pub status: watch::Receiver<ConnectionStatus>,
    pub commands: mpsc::Receiver<DisplayCommand>,
}

pub struct DisplayRunner<P> {
    sequencer: DisplaySequencer,
    renderer: Arc<dyn Renderer>,
    pull: P,
    display_duration: Duration,
    poll_interval: Duration,
}

impl<P: PullSource> DisplayRunner<P> {
    pub fn new(
        sequencer: DisplaySequencer,
        renderer: Arc<dyn Renderer>,
        pull: P,
        display_duration: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            sequencer,
            renderer,
            pull,
            display_duration,
            poll_interval,
        }
    }

    /// Runs until a shutdown command arrives or every command sender is gone.
    pub async fn run(mut self, channels: RunnerChannels) -> DisplaySequencer {
        let RunnerChannels {
            mut pushed,
            mut status,
            mut commands,
        } = channels;

        let mut poll = interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut deadline = Instant::now() + self.display_duration;
        let mut push_open = true;
        let mut status_open = true;
        let mut last_status = *status.borrow();

        self.renderer.show_idle().await;

        loop {
            let push_connected = status.borrow().is_connected();
            let showing = self.sequencer.current().is_some();

            tokio::select! {
                received = pushed.recv(), if push_open => match received {
                    Some(result) => {
                        if self.offer(result, DeliveryChannel::Push).await {
                            deadline = Instant::now() + self.display_duration;
                        }
                    }
                    None => {
                        debug!("Push receiver closed");
                        push_open = false;
                    }
                },
                changed = status.changed(), if status_open => match changed {
                    Ok(()) => {
                        let current = *status.borrow_and_update();
                        info!("Push channel status: {:?}", current);
                        // Pull at once only when a live connection drops.
                        if last_status.is_connected() && !current.is_connected() {
                            poll.reset_immediately();
                        }
                        last_status = current;
                    }
                    Err(_) => status_open = false,
                },
                _ = poll.tick(), if !push_connected => {
                    if self.pull_once().await {
                        deadline = Instant::now() + self.display_duration;
                    }
                },
                () = sleep_until(deadline), if showing => {
                    if self.complete().await {
                        deadline = Instant::now() + self.display_duration;
                    }
                },
                command = commands.recv() => match command {
                    Some(DisplayCommand::Skip) => {
                        info!("Operator skipped the current result");
                        if self.complete().await {
                            deadline = Instant::now() + self.display_duration;
                        }
                    }
                    Some(DisplayCommand::Shutdown) | None => break,
                },
            }
        }

        info!("Display runner stopped");
        self.sequencer
    }

    /// Offers a result; true when it went on screen.
    async fn offer(&mut self, result: AnalysisResult, channel: DeliveryChannel) -> bool {
        match self.sequencer.offer(result, channel) {
            Offer::Displayed(result) => {
                self.renderer.show_result(&result).await;
                true
            }
            Offer::Queued { position } => {
                debug!("Result queued at position {} ({})", position, channel);
                false
            }
            Offer::Duplicate => false,
        }
    }

    /// A failed pull changes nothing; the next tick retries.
    async fn pull_once(&mut self) -> bool {
        match self.pull.fetch_latest().await {
            Ok(Some(result)) => self.offer(result, DeliveryChannel::Pull).await,
            Ok(None) => false,
            Err(err) => {
                warn!("Pull fallback failed: {}", err);
                false
            }
        }
    }

    /// Ends the current result; true when another one went on screen.
    async fn complete(&mut self) -> bool {
        match self.sequencer.complete() {
            Completion::Next(result) => {
                self.renderer.show_result(&result).await;
                true
            }
            Completion::Idle => {
                self.renderer.show_idle().await;
                false
            }
            Completion::AlreadyIdle => false,
        }
    }
}
