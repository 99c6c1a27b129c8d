use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use kioskfeed_core::sequencer::{DisplaySequencer, DisplayState};
use kioskfeed_core::{AnalysisContent, AnalysisResult};
use kioskfeed_display::{
    pull::PullSource,
    push::ConnectionStatus,
    render::Renderer,
    runner::{DisplayCommand, DisplayRunner, RunnerChannels},
    DisplayError, Result,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

const DISPLAY: Duration = Duration::from_secs(15);
const POLL: Duration = Duration::from_secs(10);

fn result(id: &str) -> AnalysisResult {
    AnalysisResult {
        id: id.to_string(),
        company_name: "Acme".to_string(),
        vacancy_title: "Kok".to_string(),
        ideal_candidate_image_url: "https://img.example/a.png".to_string(),
        content: AnalysisContent::Tips {
            items: vec!["Noem salaris".to_string()],
        },
        score: Some(64),
        timestamp: Utc::now(),
        meta: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Idle,
    Result(String),
}

struct RecordingRenderer(mpsc::UnboundedSender<Screen>);

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn show_result(&self, result: &AnalysisResult) {
        let _ = self.0.send(Screen::Result(result.id.clone()));
    }

    async fn show_idle(&self) {
        let _ = self.0.send(Screen::Idle);
    }
}

/// Pull source that replays a script, then keeps returning `fallback`.
#[derive(Clone, Default)]
struct ScriptedPull {
    script: Arc<Mutex<VecDeque<Result<Option<AnalysisResult>>>>>,
    fallback: Option<AnalysisResult>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedPull {
    fn returning(fallback: Option<AnalysisResult>) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    fn then(self, response: Result<Option<AnalysisResult>>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PullSource for ScriptedPull {
    async fn fetch_latest(&self) -> Result<Option<AnalysisResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(self.fallback.clone()),
        }
    }
}

struct Harness {
    pushed: mpsc::Sender<AnalysisResult>,
    status: watch::Sender<ConnectionStatus>,
    commands: mpsc::Sender<DisplayCommand>,
    screens: mpsc::UnboundedReceiver<Screen>,
    handle: JoinHandle<DisplaySequencer>,
}

impl Harness {
    fn start(status: ConnectionStatus, pull: ScriptedPull) -> Self {
        let (pushed, pushed_rx) = mpsc::channel(16);
        let (status_tx, status_rx) = watch::channel(status);
        let (commands, commands_rx) = mpsc::channel(4);
        let (screens_tx, screens) = mpsc::unbounded_channel();

        let runner = DisplayRunner::new(
            DisplaySequencer::new(),
            Arc::new(RecordingRenderer(screens_tx)),
            pull,
            DISPLAY,
            POLL,
        );
        let handle = tokio::spawn(runner.run(RunnerChannels {
            pushed: pushed_rx,
            status: status_rx,
            commands: commands_rx,
        }));

        Self {
            pushed,
            status: status_tx,
            commands,
            screens,
            handle,
        }
    }

    async fn next_screen(&mut self) -> Screen {
        self.screens.recv().await.unwrap()
    }

    async fn shutdown(mut self) -> (DisplaySequencer, Vec<Screen>) {
        self.commands.send(DisplayCommand::Shutdown).await.unwrap();
        let sequencer = self.handle.await.unwrap();
        let mut rest = Vec::new();
        while let Ok(screen) = self.screens.try_recv() {
            rest.push(screen);
        }
        (sequencer, rest)
    }
}

#[tokio::test(start_paused = true)]
async fn pushed_results_are_shown_one_at_a_time_in_order() {
    let pull = ScriptedPull::returning(None);
    let mut harness = Harness::start(ConnectionStatus::Connected, pull.clone());
    assert_eq!(harness.next_screen().await, Screen::Idle);

    harness.pushed.send(result("a")).await.unwrap();
    harness.pushed.send(result("b")).await.unwrap();

    assert_eq!(harness.next_screen().await, Screen::Result("a".into()));
    let first_shown = Instant::now();
    assert_eq!(harness.next_screen().await, Screen::Result("b".into()));
    assert!(first_shown.elapsed() >= DISPLAY);
    assert_eq!(harness.next_screen().await, Screen::Idle);

    let (sequencer, rest) = harness.shutdown().await;
    assert_eq!(sequencer.state(), DisplayState::Idle);
    assert!(rest.is_empty());
    assert_eq!(pull.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn result_seen_on_both_channels_is_shown_once() {
    let pull = ScriptedPull::returning(Some(result("a")));
    let mut harness = Harness::start(ConnectionStatus::Disconnected, pull.clone());
    harness.pushed.send(result("a")).await.unwrap();

    assert_eq!(harness.next_screen().await, Screen::Idle);
    assert_eq!(harness.next_screen().await, Screen::Result("a".into()));
    assert_eq!(harness.next_screen().await, Screen::Idle);

    tokio::time::sleep(Duration::from_secs(60)).await;
    let (_, rest) = harness.shutdown().await;
    assert!(rest.is_empty(), "unexpected screens {rest:?}");
    assert!(pull.calls() >= 2);
}

#[tokio::test(start_paused = true)]
async fn failed_pull_is_retried_on_the_next_interval() {
    let pull = ScriptedPull::returning(None)
        .then(Err(DisplayError::UnexpectedStatus(503)))
        .then(Ok(Some(result("late"))));
    let mut harness = Harness::start(ConnectionStatus::Disconnected, pull.clone());
    let started = Instant::now();

    assert_eq!(harness.next_screen().await, Screen::Idle);
    assert_eq!(harness.next_screen().await, Screen::Result("late".into()));
    assert!(started.elapsed() >= POLL);
    assert_eq!(pull.calls(), 2);

    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn pulling_stops_while_push_is_connected() {
    let pull = ScriptedPull::returning(None);
    let harness = Harness::start(ConnectionStatus::Connecting, pull.clone());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(pull.calls(), 1);

    harness.status.send_replace(ConnectionStatus::Connected);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(pull.calls(), 1);

    harness.status.send_replace(ConnectionStatus::Disconnected);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(pull.calls(), 2);

    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn reconnect_attempts_keep_the_poll_schedule() {
    let pull = ScriptedPull::returning(None);
    let harness = Harness::start(ConnectionStatus::Connecting, pull.clone());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(pull.calls(), 1);

    // Backoff cycles of a push client that cannot reach the server.
    for wait in [1, 2, 4] {
        harness.status.send_replace(ConnectionStatus::Disconnected);
        tokio::time::sleep(Duration::from_secs(wait)).await;
        harness.status.send_replace(ConnectionStatus::Connecting);
    }
    harness.status.send_replace(ConnectionStatus::Disconnected);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(pull.calls(), 1);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(pull.calls(), 2);

    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn skip_ends_the_current_result_early() {
    let mut harness = Harness::start(ConnectionStatus::Connected, ScriptedPull::returning(None));
    assert_eq!(harness.next_screen().await, Screen::Idle);

    harness.pushed.send(result("a")).await.unwrap();
    assert_eq!(harness.next_screen().await, Screen::Result("a".into()));
    let shown = Instant::now();

    harness.commands.send(DisplayCommand::Skip).await.unwrap();
    assert_eq!(harness.next_screen().await, Screen::Idle);
    assert!(shown.elapsed() < DISPLAY);

    harness.shutdown().await;
}
