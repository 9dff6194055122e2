//! Presentation content: slides, time marks, transcript and track length.
//!
//! Decks are read from YAML. Times may be written as plain milliseconds or as
//! strings accepted by [`parse_millis`] ("3s", "1:02.5").
//!
//! ```yaml
//! title: Tides
//! track: 0:12
//! marks: [3s, 6s, 9s]
//! slides:
//!   - title: Why the sea moves
//!   - title: The moon's pull
//!     body: Gravity, mostly.
//! transcript:
//!   - The sea rises and falls twice a day.
//! ```

use crate::utils::parse_millis;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use slidecast_clock::TimeMarks;
use std::path::Path;
use std::time::Duration;

/// Track length used when neither deck nor command line gives one and there
/// are no marks to go by
const FALLBACK_TRACK_MS: u64 = 5000;

/// How long the last slide stays up when the track length is derived from
/// the marks
const LAST_SLIDE_HOLD_MS: u64 = 2000;

/// A time written either as milliseconds or as a human-readable string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Millis(u64),
    Text(String),
}

impl TimeValue {
    fn to_millis(&self) -> Result<u64> {
        match self {
            TimeValue::Millis(ms) => Ok(*ms),
            TimeValue::Text(text) => parse_millis(text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeckFile {
    title: String,
    #[serde(default)]
    track: Option<TimeValue>,
    #[serde(default)]
    marks: Vec<TimeValue>,
    #[serde(default)]
    slides: Vec<Slide>,
    #[serde(default)]
    transcript: Vec<String>,
}

/// Content of one slide
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Everything the shell needs to present
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub title: String,
    pub marks: Vec<u64>,
    pub slides: Vec<Slide>,
    pub transcript: Vec<String>,
    pub track: Option<Duration>,
}

impl Deck {
    /// Reads a deck from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read deck '{}': {}", path.display(), e))?;
        Self::from_yaml(&text).map_err(|e| anyhow!("Invalid deck '{}': {}", path.display(), e))
    }

    /// Parses a deck from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        let file: DeckFile = serde_yaml::from_str(text)?;
        let marks = file
            .marks
            .iter()
            .map(TimeValue::to_millis)
            .collect::<Result<Vec<_>>>()?;
        let track = file
            .track
            .as_ref()
            .map(TimeValue::to_millis)
            .transpose()?
            .map(Duration::from_millis);

        Ok(Self {
            title: file.title,
            marks,
            slides: file.slides,
            transcript: file.transcript,
            track,
        })
    }

    /// Built-in deck shown when no deck file is given
    pub fn demo() -> Self {
        let slide = |title: &str, body: &str| Slide {
            title: title.to_string(),
            body: body.to_string(),
        };
        Self {
            title: "Slidecast demo".to_string(),
            marks: vec![2500, 5500, 9000],
            slides: vec![
                slide("Welcome", "Slides follow the narration on their own."),
                slide("The clock", "Elapsed playback time picks the slide."),
                slide("Pausing", "Pause keeps your place; resume carries on."),
                slide("The end", "When the audio ends the deck returns to the start."),
            ],
            transcript: vec![
                "Welcome. These slides follow the narration on their own.".to_string(),
                "A clock counts playback time and picks the slide for each moment.".to_string(),
                "Pausing keeps your place, and resuming carries on from there.".to_string(),
                "When the audio ends, the deck goes back to the first slide.".to_string(),
            ],
            track: Some(Duration::from_millis(12_000)),
        }
    }

    pub fn time_marks(&self) -> TimeMarks {
        TimeMarks::new(self.marks.clone())
    }

    /// Number of slides the marks call for
    pub fn slide_count(&self) -> usize {
        self.marks.len() + 1
    }

    /// Title of slide `index`, numbered when the deck has no content for it
    pub fn slide_title(&self, index: usize) -> String {
        self.slides
            .get(index)
            .map(|slide| slide.title.clone())
            .unwrap_or_else(|| format!("Slide {}", index + 1))
    }

    /// Length of the narration track
    ///
    /// Falls back to holding the last slide for a moment past the last mark.
    pub fn track_length(&self) -> Duration {
        self.track.unwrap_or_else(|| {
            let ms = self
                .marks
                .last()
                .map(|last| last.saturating_add(LAST_SLIDE_HOLD_MS))
                .unwrap_or(FALLBACK_TRACK_MS);
            Duration::from_millis(ms)
        })
    }
}
