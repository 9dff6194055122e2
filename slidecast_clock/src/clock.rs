//! Playback clock and slide selector
//!
//! The clock accumulates elapsed playback time only while playing and maps it
//! onto a slide index through [`TimeMarks`]. Every operation takes the current
//! instant explicitly, so the clock can be driven by a frame timer, a test, or
//! anything else that can produce an [`Instant`].

use crate::marks::TimeMarks;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Elapsed-time clock that selects the active slide
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    marks: TimeMarks,
    /// Wall-clock instant of the last start or resume. `Some` exactly while
    /// playing.
    anchor: Option<Instant>,
    /// Playback time accumulated before `anchor`
    banked: Duration,
    /// Elapsed playback time as of the last tick or pause
    elapsed: Duration,
    slide: usize,
}

impl PlaybackClock {
    pub fn new(marks: TimeMarks) -> Self {
        Self {
            marks,
            anchor: None,
            banked: Duration::ZERO,
            elapsed: Duration::ZERO,
            slide: 0,
        }
    }

    pub fn marks(&self) -> &TimeMarks {
        &self.marks
    }

    /// Current slide index (0-based)
    pub fn slide(&self) -> usize {
        self.slide
    }

    pub fn slide_count(&self) -> usize {
        self.marks.slide_count()
    }

    /// Elapsed playback time as of the last tick, pause or resume
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_playing(&self) -> bool {
        self.anchor.is_some()
    }

    /// Restarts playback from zero
    pub fn start(&mut self, now: Instant) {
        self.banked = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        self.slide = 0;
        self.anchor = Some(now);
        debug!("clock started");
    }

    /// Stops accumulating time, freezing elapsed at its value for `now`
    pub fn pause(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor.take() {
            self.elapsed = self.banked + now.saturating_duration_since(anchor);
            self.banked = self.elapsed;
            self.slide = self.marks.slide_for(self.elapsed);
            debug!(elapsed_ms = self.elapsed.as_millis() as u64, "clock paused");
        }
    }

    /// Continues from the frozen elapsed time
    ///
    /// The wall-clock reference is re-anchored at `now`, so elapsed time picks
    /// up exactly where the pause left it.
    pub fn resume(&mut self, now: Instant) {
        if self.anchor.is_some() {
            return;
        }
        self.banked = self.elapsed;
        self.anchor = Some(now);
        debug!(elapsed_ms = self.elapsed.as_millis() as u64, "clock resumed");
    }

    /// Stops playback and returns to the first slide at time zero
    pub fn reset(&mut self) {
        self.anchor = None;
        self.banked = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        self.slide = 0;
    }

    /// Samples the clock at `now` and recomputes the slide
    ///
    /// Returns `Some(slide)` only when the slide changed, so callers can skip
    /// redundant re-renders. Does nothing while not playing.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let anchor = self.anchor?;
        self.elapsed = self.banked + now.saturating_duration_since(anchor);
        let slide = self.marks.slide_for(self.elapsed);
        if slide == self.slide {
            return None;
        }
        debug!(
            from = self.slide,
            to = slide,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "slide advanced"
        );
        self.slide = slide;
        Some(slide)
    }
}
