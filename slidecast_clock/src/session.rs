//! Presentation session
//!
//! A session is a single tokio task that owns a [`Presentation`] and its
//! [`FrameTimer`]. Callers drive it through a [`SessionHandle`]; renderers
//! follow it through a `watch` channel of [`Snapshot`]s. All state changes
//! happen inside the task, one event at a time, so nothing is shared and
//! nothing is locked.

use crate::audio::{AudioError, AudioEvent, AudioPlayer};
use crate::lifecycle::{Gesture, GestureVerdict, Presentation, PresentationState, Screen};
use crate::timer::{FrameTimer, DEFAULT_FRAME_PERIOD};
use std::time::Duration;
use thiserror::Error;
use tokio::select;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Capacity of the command queue between handle and session task
const COMMAND_QUEUE_DEPTH: usize = 32;

/// Errors returned by [`SessionHandle`] requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session task is no longer running
    #[error("presentation session has shut down")]
    Closed,
    /// The audio refused to play
    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Shortest frame period a session will run with
const MIN_FRAME_PERIOD: Duration = Duration::from_millis(1);

/// Tunables for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How often the clock is sampled while playing; raised to 1ms if shorter
    pub frame_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_period: DEFAULT_FRAME_PERIOD,
        }
    }
}

/// What a renderer needs to draw the presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub state: PresentationState,
    pub screen: Screen,
    /// Active slide (0-based)
    pub slide: usize,
    pub slide_count: usize,
    /// Elapsed playback time as of the last clock sample
    pub elapsed: Duration,
    pub navigation_locked: bool,
}

impl Snapshot {
    fn of<A: AudioPlayer>(presentation: &Presentation<A>) -> Self {
        Self {
            state: presentation.state(),
            screen: presentation.screen(),
            slide: presentation.slide(),
            slide_count: presentation.slide_count(),
            elapsed: presentation.elapsed(),
            navigation_locked: presentation.navigation_locked(),
        }
    }

    /// Whether a renderer would draw anything different
    fn differs_visibly(&self, other: &Snapshot) -> bool {
        self.state != other.state || self.screen != other.screen || self.slide != other.slide
    }
}

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Start(Reply<Result<(), AudioError>>),
    Pause(Reply<()>),
    Resume(Reply<Result<(), AudioError>>),
    Toggle(Reply<Result<(), AudioError>>),
    Reset(Reply<()>),
    ReadText(Reply<()>),
    Gesture(Gesture, Reply<GestureVerdict>),
    Shutdown,
}

/// Task that runs a presentation
pub struct PresentationSession<A> {
    presentation: Presentation<A>,
    timer: FrameTimer,
    commands: mpsc::Receiver<Command>,
    audio_events: mpsc::UnboundedReceiver<AudioEvent>,
    snapshots: watch::Sender<Snapshot>,
}

impl<A> PresentationSession<A>
where
    A: AudioPlayer + Send + 'static,
{
    /// Spawns the session task on the current tokio runtime
    ///
    /// `audio_events` carries the ended notification of the presentation's
    /// audio. The returned handle controls the task; dropping it stops the
    /// task and cancels any pending frame.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use slidecast_clock::{Presentation, PresentationSession, SessionConfig, TimeMarks, TimedTrack};
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let (track, ended) = TimedTrack::new(Duration::from_secs(8));
    ///     let presentation = Presentation::new(TimeMarks::new(vec![1000, 3000, 6000]), track);
    ///     let handle = PresentationSession::spawn(presentation, ended, SessionConfig::default());
    ///
    ///     handle.start().await.expect("audio refused to play");
    ///     tokio::time::sleep(Duration::from_secs(2)).await;
    ///     assert_eq!(handle.snapshot().slide, 1);
    ///
    ///     handle.shutdown().await;
    /// }
    /// ```
    pub fn spawn(
        presentation: Presentation<A>,
        audio_events: mpsc::UnboundedReceiver<AudioEvent>,
        config: SessionConfig,
    ) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::of(&presentation));

        let session = Self {
            presentation,
            timer: FrameTimer::new(config.frame_period.max(MIN_FRAME_PERIOD)),
            commands: command_rx,
            audio_events,
            snapshots: snapshot_tx,
        };
        let task = tokio::spawn(session.run());

        SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task: Some(task),
        }
    }

    async fn run(mut self) {
        debug!(
            frame_ms = self.timer.period().as_millis() as u64,
            slides = self.presentation.slide_count(),
            "presentation session started"
        );

        loop {
            select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = self.audio_events.recv() => self.handle_audio_event(event),
                now = self.timer.tick() => {
                    self.presentation.tick(now);
                    self.settle();
                }
            }
        }

        self.timer.cancel();
        debug!("presentation session stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let result = self.presentation.start(Instant::now());
                self.settle();
                let _ = reply.send(result);
            }
            Command::Pause(reply) => {
                self.presentation.pause(Instant::now());
                self.settle();
                let _ = reply.send(());
            }
            Command::Resume(reply) => {
                let result = self.presentation.resume(Instant::now());
                self.settle();
                let _ = reply.send(result);
            }
            Command::Toggle(reply) => {
                let result = self.presentation.toggle(Instant::now());
                self.settle();
                let _ = reply.send(result);
            }
            Command::Reset(reply) => {
                self.presentation.reset();
                self.settle();
                let _ = reply.send(());
            }
            Command::ReadText(reply) => {
                self.presentation.read_text();
                self.settle();
                let _ = reply.send(());
            }
            Command::Gesture(gesture, reply) => {
                let _ = reply.send(self.presentation.filter_gesture(gesture));
            }
            Command::Shutdown => {}
        }
    }

    fn handle_audio_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::Ended { playthrough } => {
                // Start, reset and read_text all rewind, so a notification
                // queued before the latest rewind carries an older playthrough.
                let current = self.presentation.audio().playthrough();
                if playthrough != current
                    || self.presentation.state() == PresentationState::Idle
                {
                    debug!(playthrough, current, "ignoring stale ended notification");
                    return;
                }
                info!("Audio ended");
                self.presentation.on_playback_ended();
                self.settle();
            }
        }
    }

    /// Arms the frame timer exactly while playing and publishes the result
    fn settle(&mut self) {
        let playing = self.presentation.state() == PresentationState::Playing;
        if playing && !self.timer.is_armed() {
            self.timer.arm();
        } else if !playing && self.timer.is_armed() {
            self.timer.cancel();
        }

        let next = Snapshot::of(&self.presentation);
        self.snapshots.send_if_modified(|current| {
            let changed = current.differs_visibly(&next);
            *current = next;
            changed
        });
    }
}

/// Handle for controlling a running presentation session
///
/// Dropping the handle stops the session task.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        reply_rx.await.map_err(|_| SessionError::Closed)
    }

    /// Plays from the first slide
    pub async fn start(&self) -> Result<(), SessionError> {
        Ok(self.request(Command::Start).await??)
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        self.request(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<(), SessionError> {
        Ok(self.request(Command::Resume).await??)
    }

    /// Play/pause button: starts, pauses or resumes depending on state
    pub async fn toggle(&self) -> Result<(), SessionError> {
        Ok(self.request(Command::Toggle).await??)
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        self.request(Command::Reset).await
    }

    /// Switches to the textual fallback view
    pub async fn read_text(&self) -> Result<(), SessionError> {
        self.request(Command::ReadText).await
    }

    /// Asks whether a navigation gesture may proceed
    pub async fn gesture(&self, gesture: Gesture) -> Result<GestureVerdict, SessionError> {
        self.request(|reply| Command::Gesture(gesture, reply)).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        *self.snapshots.borrow()
    }

    /// Receiver notified whenever the state, screen or slide changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Stops the session and waits for its task to finish
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
