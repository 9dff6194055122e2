//! Slidecast Clock - audio-synchronized slide timing
//!
//! This crate provides the timing core of a narrated slide presentation:
//! slides advance on their own in lockstep with an audio track, following a
//! fixed list of time marks.
//!
//! - [`TimeMarks`] maps elapsed playback time to a slide index
//! - [`PlaybackClock`] accumulates playback time across pauses
//! - [`Presentation`] runs the Idle / Playing / Paused / Finished lifecycle
//!   and decides when manual navigation is locked
//! - [`FrameTimer`] is the cancellable per-frame timer that samples the clock
//! - [`PresentationSession`] runs all of the above in one tokio task
//!
//! Rendering is left to the caller, who follows [`Snapshot`]s.

pub mod audio;
pub mod clock;
pub mod lifecycle;
pub mod marks;
pub mod session;
pub mod timer;

pub use audio::{AudioError, AudioEvent, AudioPlayer, TimedTrack};
pub use clock::PlaybackClock;
pub use lifecycle::{Gesture, GestureVerdict, Presentation, PresentationState, Screen};
pub use marks::TimeMarks;
pub use session::{PresentationSession, SessionConfig, SessionError, SessionHandle, Snapshot};
pub use timer::{FrameTimer, DEFAULT_FRAME_PERIOD};
