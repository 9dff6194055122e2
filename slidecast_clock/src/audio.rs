//! Audio collaborator seam
//!
//! A presentation only ever asks its audio to play, pause or rewind, and
//! listens for a single "ended" notification. Anything able to do that can
//! narrate a deck.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Reasons an audio resource may refuse to start playing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// The resource has not finished loading
    #[error("audio resource is not ready")]
    NotReady,
    /// Playback was refused by the host (autoplay restrictions and the like)
    #[error("audio playback was blocked: {0}")]
    Blocked(String),
    /// Any other backend failure
    #[error("audio backend failure: {0}")]
    Backend(String),
}

/// Notifications emitted by an audio resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    /// The track played through to its end during the given playthrough
    Ended { playthrough: u64 },
}

/// The commands a presentation issues to its audio
pub trait AudioPlayer {
    /// Starts or continues playback from the current position
    fn play(&mut self) -> Result<(), AudioError>;

    /// Halts playback, keeping the current position
    fn pause(&mut self);

    /// Moves the playback position back to zero
    ///
    /// Every rewind begins a new playthrough.
    fn rewind(&mut self);

    /// Playthrough counter, bumped by each [`AudioPlayer::rewind`]
    ///
    /// An [`AudioEvent::Ended`] whose playthrough no longer matches was
    /// emitted before the last rewind and describes audio that is gone.
    fn playthrough(&self) -> u64;
}

/// Opaque track of known length that reports its own end
///
/// `TimedTrack` stands in for a real playable resource. While playing it keeps
/// a task on the tokio runtime that sleeps for the remaining length of the
/// track and then sends [`AudioEvent::Ended`]. Pausing cancels that task and
/// remembers the position; rewinding forgets it.
///
/// `play` must be called from within a tokio runtime.
pub struct TimedTrack {
    length: Duration,
    /// Position accumulated before the current play started
    position: Duration,
    started_at: Option<Instant>,
    playthrough: u64,
    ended_task: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<AudioEvent>,
}

impl TimedTrack {
    /// Creates a track and the receiver its ended notification arrives on
    pub fn new(length: Duration) -> (Self, mpsc::UnboundedReceiver<AudioEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let track = Self {
            length,
            position: Duration::ZERO,
            started_at: None,
            playthrough: 0,
            ended_task: None,
            events,
        };
        (track, receiver)
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Current playback position, clamped to the track length
    pub fn position(&self) -> Duration {
        let live = self
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default();
        (self.position + live).min(self.length)
    }

    fn cancel_ended_task(&mut self) {
        if let Some(task) = self.ended_task.take() {
            task.abort();
        }
    }
}

impl AudioPlayer for TimedTrack {
    fn play(&mut self) -> Result<(), AudioError> {
        if self.is_playing() {
            return Ok(());
        }
        let remaining = self.length.saturating_sub(self.position);
        if remaining.is_zero() {
            // Already at the end; a real element would need a rewind first
            return Err(AudioError::Blocked("track is at its end".to_string()));
        }

        let now = Instant::now();
        let ends_at = now
            .checked_add(remaining)
            .ok_or_else(|| AudioError::Backend("track is too long to schedule".to_string()))?;
        let events = self.events.clone();
        let playthrough = self.playthrough;
        self.ended_task = Some(tokio::spawn(async move {
            sleep_until(ends_at).await;
            let _ = events.send(AudioEvent::Ended { playthrough });
        }));
        self.started_at = Some(now);
        debug!(remaining_ms = remaining.as_millis() as u64, "track playing");
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.position = (self.position + started.elapsed()).min(self.length);
            self.cancel_ended_task();
            debug!(position_ms = self.position.as_millis() as u64, "track paused");
        }
    }

    fn rewind(&mut self) {
        let was_playing = self.is_playing();
        self.cancel_ended_task();
        self.started_at = None;
        self.position = Duration::ZERO;
        self.playthrough += 1;
        if was_playing {
            info!("track rewound while playing; playback halted");
        }
    }

    fn playthrough(&self) -> u64 {
        self.playthrough
    }
}

impl Drop for TimedTrack {
    fn drop(&mut self) {
        self.cancel_ended_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_track_reports_end() {
        let (mut track, mut events) = TimedTrack::new(Duration::from_secs(3));
        track.play().unwrap();

        advance(Duration::from_millis(2999)).await;
        assert!(events.try_recv().is_err());

        advance(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(events.recv().await, Some(AudioEvent::Ended { playthrough: 0 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_holds_position() {
        let (mut track, mut events) = TimedTrack::new(Duration::from_secs(2));
        track.play().unwrap();
        advance(Duration::from_millis(1500)).await;
        track.pause();
        assert_eq!(track.position(), Duration::from_millis(1500));

        // Time passing while paused must not end the track
        advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(events.try_recv().is_err());

        track.play().unwrap();
        advance(Duration::from_millis(501)).await;
        assert_eq!(events.recv().await, Some(AudioEvent::Ended { playthrough: 0 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewind_cancels_pending_end() {
        let (mut track, mut events) = TimedTrack::new(Duration::from_secs(1));
        track.play().unwrap();
        advance(Duration::from_millis(800)).await;
        track.rewind();
        assert!(!track.is_playing());
        assert_eq!(track.position(), Duration::ZERO);

        advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_at_end_is_refused() {
        let (mut track, _events) = TimedTrack::new(Duration::from_millis(100));
        track.play().unwrap();
        advance(Duration::from_millis(200)).await;
        track.pause();
        assert_eq!(track.position(), Duration::from_millis(100));
        assert!(matches!(track.play(), Err(AudioError::Blocked(_))));

        track.rewind();
        assert!(track.play().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewind_starts_new_playthrough() {
        let (mut track, mut events) = TimedTrack::new(Duration::from_millis(500));
        assert_eq!(track.playthrough(), 0);
        track.rewind();
        track.rewind();
        assert_eq!(track.playthrough(), 2);

        track.play().unwrap();
        assert_eq!(events.recv().await, Some(AudioEvent::Ended { playthrough: 2 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unschedulable_track_is_refused() {
        let (mut track, _events) = TimedTrack::new(Duration::MAX);
        assert!(matches!(track.play(), Err(AudioError::Backend(_))));
        assert!(!track.is_playing());
    }

    #[test]
    fn test_audio_error_messages() {
        assert_eq!(AudioError::NotReady.to_string(), "audio resource is not ready");
        assert_eq!(
            AudioError::Blocked("autoplay".to_string()).to_string(),
            "audio playback was blocked: autoplay"
        );
    }
}
