//! Presentation lifecycle: Idle, Playing, Paused and Finished
//!
//! [`Presentation`] ties a [`PlaybackClock`] to an [`AudioPlayer`] and owns
//! the lifecycle. It also answers the presentation shell's one question about
//! input: whether manual navigation is currently locked.

use crate::audio::{AudioError, AudioPlayer};
use crate::clock::PlaybackClock;
use crate::marks::TimeMarks;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle state of a presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationState {
    /// Not started, reset, or showing the text view
    #[default]
    Idle,
    /// Audio is playing and the clock is advancing slides
    Playing,
    /// Playback halted mid-presentation; elapsed time is retained
    Paused,
    /// The audio reached its end
    Finished,
}

impl fmt::Display for PresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PresentationState::Idle => "idle",
            PresentationState::Playing => "playing",
            PresentationState::Paused => "paused",
            PresentationState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Which screen the presentation shell should display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Idle landing view
    #[default]
    Landing,
    /// Idle textual fallback (the narration as plain text)
    Reading,
    /// Slides, while playing or paused
    Slides,
    /// End-of-presentation view
    Finished,
}

/// Navigation gestures a viewer can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Mouse wheel or trackpad scroll
    Scroll,
    PageUp,
    PageDown,
    Home,
    End,
    Space,
    ArrowUp,
    ArrowDown,
    /// Touch-based paging
    Swipe,
}

/// What the shell must do with a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureVerdict {
    /// Cancel the gesture's default handling
    Suppressed,
    /// Let the gesture through untouched
    PassThrough,
}

/// An audio-synchronized presentation
pub struct Presentation<A> {
    clock: PlaybackClock,
    audio: A,
    state: PresentationState,
    reading: bool,
}

impl<A: AudioPlayer> Presentation<A> {
    /// Creates an idle presentation
    ///
    /// `marks` must be strictly ascending; see [`TimeMarks`].
    pub fn new(marks: TimeMarks, audio: A) -> Self {
        Self {
            clock: PlaybackClock::new(marks),
            audio,
            state: PresentationState::Idle,
            reading: false,
        }
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    pub fn slide(&self) -> usize {
        self.clock.slide()
    }

    pub fn slide_count(&self) -> usize {
        self.clock.slide_count()
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn screen(&self) -> Screen {
        match self.state {
            PresentationState::Idle if self.reading => Screen::Reading,
            PresentationState::Idle => Screen::Landing,
            PresentationState::Playing | PresentationState::Paused => Screen::Slides,
            PresentationState::Finished => Screen::Finished,
        }
    }

    /// Whether manual navigation must be blocked
    ///
    /// True exactly while playing, so a viewer cannot page ahead of the
    /// narration.
    pub fn navigation_locked(&self) -> bool {
        self.state == PresentationState::Playing
    }

    /// Decides whether a navigation gesture may proceed
    pub fn filter_gesture(&self, gesture: Gesture) -> GestureVerdict {
        if self.navigation_locked() {
            debug!(?gesture, "navigation gesture suppressed while playing");
            GestureVerdict::Suppressed
        } else {
            GestureVerdict::PassThrough
        }
    }

    /// Plays from the beginning
    ///
    /// Works from any state. If the audio refuses to start the failure is
    /// logged and returned, and the presentation is left Idle.
    pub fn start(&mut self, now: Instant) -> Result<(), AudioError> {
        self.stop_audio();
        if let Err(e) = self.audio.play() {
            warn!("Failed to start audio playback: {}", e);
            self.clock.reset();
            self.transition(PresentationState::Idle);
            return Err(e);
        }
        self.clock.start(now);
        self.reading = false;
        self.transition(PresentationState::Playing);
        Ok(())
    }

    /// Pauses playback, keeping elapsed time
    pub fn pause(&mut self, now: Instant) {
        if self.state != PresentationState::Playing {
            return;
        }
        self.audio.pause();
        self.clock.pause(now);
        self.transition(PresentationState::Paused);
    }

    /// Continues a paused presentation
    ///
    /// Only a paused presentation can resume; a finished one always restarts
    /// from zero through [`Presentation::start`].
    pub fn resume(&mut self, now: Instant) -> Result<(), AudioError> {
        if self.state != PresentationState::Paused {
            return Ok(());
        }
        if let Err(e) = self.audio.play() {
            warn!("Failed to resume audio playback: {}", e);
            return Err(e);
        }
        self.clock.resume(now);
        self.transition(PresentationState::Playing);
        Ok(())
    }

    /// Play/pause button behavior
    pub fn toggle(&mut self, now: Instant) -> Result<(), AudioError> {
        match self.state {
            PresentationState::Idle | PresentationState::Finished => self.start(now),
            PresentationState::Playing => {
                self.pause(now);
                Ok(())
            }
            PresentationState::Paused => self.resume(now),
        }
    }

    /// Stops everything and returns to the landing view at slide 0
    pub fn reset(&mut self) {
        self.stop_audio();
        self.clock.reset();
        self.reading = false;
        self.transition(PresentationState::Idle);
    }

    /// Switches to the textual fallback view
    pub fn read_text(&mut self) {
        self.stop_audio();
        self.clock.reset();
        self.reading = true;
        self.transition(PresentationState::Idle);
    }

    /// Handles the audio's ended notification
    pub fn on_playback_ended(&mut self) {
        self.audio.pause();
        self.clock.reset();
        self.reading = false;
        self.transition(PresentationState::Finished);
    }

    /// Samples the clock; returns the new slide when it changed
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        if self.state != PresentationState::Playing {
            return None;
        }
        self.clock.tick(now)
    }

    fn stop_audio(&mut self) {
        self.audio.pause();
        self.audio.rewind();
    }

    fn transition(&mut self, next: PresentationState) {
        if self.state != next {
            info!("Presentation {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Audio double that records the commands it receives
    #[derive(Default)]
    struct RecordingAudio {
        commands: Vec<&'static str>,
        refuse: Option<AudioError>,
        playing: bool,
        rewinds: u64,
    }

    impl AudioPlayer for RecordingAudio {
        fn play(&mut self) -> Result<(), AudioError> {
            self.commands.push("play");
            if let Some(e) = self.refuse.clone() {
                return Err(e);
            }
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.commands.push("pause");
            self.playing = false;
        }

        fn rewind(&mut self) {
            self.commands.push("rewind");
            self.rewinds += 1;
        }

        fn playthrough(&self) -> u64 {
            self.rewinds
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn presentation() -> Presentation<RecordingAudio> {
        Presentation::new(
            TimeMarks::new(vec![1000, 3000, 6000]),
            RecordingAudio::default(),
        )
    }

    #[test]
    fn test_initial_state() {
        let p = presentation();
        assert_eq!(p.state(), PresentationState::Idle);
        assert_eq!(p.screen(), Screen::Landing);
        assert_eq!(p.slide(), 0);
        assert_eq!(p.slide_count(), 4);
        assert!(!p.navigation_locked());
    }

    #[test]
    fn test_start_plays_audio_from_zero() {
        let mut p = presentation();
        let t0 = Instant::now();
        p.start(t0).unwrap();

        assert_eq!(p.state(), PresentationState::Playing);
        assert_eq!(p.screen(), Screen::Slides);
        assert!(p.audio().playing);
        assert_eq!(p.audio().commands, vec!["pause", "rewind", "play"]);
    }

    #[test]
    fn test_failed_start_stays_idle() {
        let mut p = presentation();
        p.audio.refuse = Some(AudioError::Blocked("autoplay".to_string()));

        let result = p.start(Instant::now());
        assert_eq!(result, Err(AudioError::Blocked("autoplay".to_string())));
        assert_eq!(p.state(), PresentationState::Idle);
        assert!(!p.navigation_locked());
        assert_eq!(p.tick(Instant::now() + ms(5000)), None);
    }

    #[test]
    fn test_failed_restart_after_finish_returns_to_idle() {
        let mut p = presentation();
        let t0 = Instant::now();
        p.start(t0).unwrap();
        p.on_playback_ended();

        p.audio.refuse = Some(AudioError::NotReady);
        assert!(p.toggle(t0 + ms(100)).is_err());
        assert_eq!(p.state(), PresentationState::Idle);
        assert_eq!(p.screen(), Screen::Landing);
        assert_eq!(p.slide(), 0);
    }

    #[test]
    fn test_ticks_drive_slides_only_while_playing() {
        let mut p = presentation();
        let t0 = Instant::now();
        assert_eq!(p.tick(t0 + ms(1500)), None);

        p.start(t0).unwrap();
        assert_eq!(p.tick(t0 + ms(500)), None);
        assert_eq!(p.tick(t0 + ms(1500)), Some(1));
        assert_eq!(p.tick(t0 + ms(3000)), Some(2));
        assert_eq!(p.tick(t0 + ms(9000)), Some(3));
    }

    #[test]
    fn test_pause_and_resume_preserve_elapsed() {
        let mut p = presentation();
        let t0 = Instant::now();
        p.start(t0).unwrap();
        p.tick(t0 + ms(2000));

        p.pause(t0 + ms(2200));
        assert_eq!(p.state(), PresentationState::Paused);
        assert_eq!(p.screen(), Screen::Slides);
        assert_eq!(p.elapsed(), ms(2200));
        assert_eq!(p.tick(t0 + ms(8000)), None);

        p.resume(t0 + ms(8000)).unwrap();
        assert_eq!(p.state(), PresentationState::Playing);
        assert_eq!(p.elapsed(), ms(2200));
        assert_eq!(p.tick(t0 + ms(8800)), Some(2));
        assert_eq!(p.elapsed(), ms(3000));
    }

    #[test]
    fn test_failed_resume_stays_paused() {
        let mut p = presentation();
        let t0 = Instant::now();
        p.start(t0).unwrap();
        p.pause(t0 + ms(1200));

        p.audio.refuse = Some(AudioError::NotReady);
        assert_eq!(p.resume(t0 + ms(2000)), Err(AudioError::NotReady));
        assert_eq!(p.state(), PresentationState::Paused);
        assert_eq!(p.elapsed(), ms(1200));
    }

    #[test]
    fn test_resume_only_from_paused() {
        let mut p = presentation();
        let t0 = Instant::now();
        p.resume(t0).unwrap();
        assert_eq!(p.state(), PresentationState::Idle);

        p.start(t0).unwrap();
        p.on_playback_ended();
        p.resume(t0 + ms(100)).unwrap();
        assert_eq!(p.state(), PresentationState::Finished);
    }

    #[test]
    fn test_toggle_cycle() {
        let mut p = presentation();
        let t0 = Instant::now();

        p.toggle(t0).unwrap();
        assert_eq!(p.state(), PresentationState::Playing);
        p.toggle(t0 + ms(1500)).unwrap();
        assert_eq!(p.state(), PresentationState::Paused);
        assert_eq!(p.slide(), 1);
        p.toggle(t0 + ms(4000)).unwrap();
        assert_eq!(p.state(), PresentationState::Playing);
        assert_eq!(p.elapsed(), ms(1500));

        p.on_playback_ended();
        p.toggle(t0 + ms(5000)).unwrap();
        assert_eq!(p.state(), PresentationState::Playing);
        assert_eq!(p.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_reset_from_every_state() {
        let t0 = Instant::now();
        let setups: [fn(&mut Presentation<RecordingAudio>, Instant); 4] = [
            |_, _| {},
            |p, t| {
                p.start(t).unwrap();
                p.tick(t + ms(3500));
            },
            |p, t| {
                p.start(t).unwrap();
                p.tick(t + ms(3500));
                p.pause(t + ms(3600));
            },
            |p, t| {
                p.start(t).unwrap();
                p.on_playback_ended();
            },
        ];

        for setup in setups {
            let mut p = presentation();
            setup(&mut p, t0);
            p.reset();
            assert_eq!(p.state(), PresentationState::Idle);
            assert_eq!(p.screen(), Screen::Landing);
            assert_eq!(p.slide(), 0);
            assert_eq!(p.elapsed(), Duration::ZERO);
            assert!(!p.audio().playing);
        }
    }

    #[test]
    fn test_ended_resets_to_first_slide() {
        let mut p = presentation();
        let t0 = Instant::now();
        p.start(t0).unwrap();
        assert_eq!(p.tick(t0 + ms(7000)), Some(3));

        p.on_playback_ended();
        assert_eq!(p.state(), PresentationState::Finished);
        assert_eq!(p.screen(), Screen::Finished);
        assert_eq!(p.slide(), 0);
        assert_eq!(p.elapsed(), Duration::ZERO);
        assert!(!p.navigation_locked());
        assert_eq!(p.tick(t0 + ms(8000)), None);
    }

    #[test]
    fn test_read_text_shows_reading_view() {
        let mut p = presentation();
        let t0 = Instant::now();
        p.start(t0).unwrap();
        p.on_playback_ended();

        p.read_text();
        assert_eq!(p.state(), PresentationState::Idle);
        assert_eq!(p.screen(), Screen::Reading);

        p.start(t0 + ms(100)).unwrap();
        assert_eq!(p.screen(), Screen::Slides);
        p.reset();
        assert_eq!(p.screen(), Screen::Landing);
    }

    #[test]
    fn test_page_down_suppressed_only_while_playing() {
        let mut p = presentation();
        let t0 = Instant::now();
        assert_eq!(p.filter_gesture(Gesture::PageDown), GestureVerdict::PassThrough);

        p.start(t0).unwrap();
        p.tick(t0 + ms(1500));
        for gesture in [
            Gesture::Scroll,
            Gesture::PageUp,
            Gesture::PageDown,
            Gesture::Home,
            Gesture::End,
            Gesture::Space,
            Gesture::ArrowUp,
            Gesture::ArrowDown,
            Gesture::Swipe,
        ] {
            assert_eq!(p.filter_gesture(gesture), GestureVerdict::Suppressed);
        }
        assert_eq!(p.slide(), 1);

        p.pause(t0 + ms(1600));
        assert_eq!(p.filter_gesture(Gesture::PageDown), GestureVerdict::PassThrough);
        assert_eq!(p.slide(), 1);

        p.on_playback_ended();
        assert_eq!(p.filter_gesture(Gesture::Swipe), GestureVerdict::PassThrough);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PresentationState::Idle.to_string(), "idle");
        assert_eq!(PresentationState::Playing.to_string(), "playing");
        assert_eq!(PresentationState::Paused.to_string(), "paused");
        assert_eq!(PresentationState::Finished.to_string(), "finished");
    }
}
