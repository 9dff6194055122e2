//! Command-line argument types for Slidecast
//!
//! This module contains the CLI argument parsing types: the main Args struct
//! and the value parsers for time marks and durations.

use crate::utils::{parse_duration, parse_millis};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for configuring the presentation
#[derive(Parser, Debug)]
#[command(name = "slidecast")]
#[command(about = "Narrated slide presentation that advances in lockstep with its audio")]
pub struct Args {
    /// YAML deck with slides, time marks, transcript and track length
    #[arg(short, long)]
    pub deck: Option<PathBuf>,

    /// Time marks at which the next slide appears, comma separated
    /// (e.g., "1000,3s,1:02.5"). Overrides the deck's marks.
    #[arg(short, long, value_delimiter = ',', value_parser = parse_millis)]
    pub marks: Option<Vec<u64>>,

    /// Length of the narration track (e.g., "90s", "1:30"). Defaults to the
    /// deck's track length, or two seconds past the last mark.
    #[arg(short, long, value_parser = parse_duration)]
    pub track: Option<Duration>,

    /// Interval between clock samples in milliseconds (one display refresh)
    #[arg(long, default_value = "16")]
    pub frame_ms: u64,

    /// Start playing immediately instead of waiting on the landing screen
    #[arg(short, long, default_value = "false")]
    pub autoplay: bool,

    /// Quiet mode: no frames, only slide changes as machine-readable lines
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Args {
    /// Frame period, never shorter than one millisecond
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["slidecast"]).unwrap();
        assert!(args.deck.is_none());
        assert!(args.marks.is_none());
        assert!(args.track.is_none());
        assert_eq!(args.frame_ms, 16);
        assert!(!args.autoplay);
        assert!(!args.quiet);
        assert_eq!(args.frame_period(), Duration::from_millis(16));
    }

    #[test]
    fn test_marks_accept_mixed_units() {
        let args = Args::try_parse_from(["slidecast", "--marks", "1000,3s,1:02.5"]).unwrap();
        assert_eq!(args.marks, Some(vec![1000, 3000, 62_500]));
    }

    #[test]
    fn test_invalid_mark_rejected() {
        let result = Args::try_parse_from(["slidecast", "--marks", "1000,soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_track_and_deck() {
        let args =
            Args::try_parse_from(["slidecast", "-d", "talk.yaml", "--track", "1:30", "-a"])
                .unwrap();
        assert_eq!(args.deck, Some(PathBuf::from("talk.yaml")));
        assert_eq!(args.track, Some(Duration::from_secs(90)));
        assert!(args.autoplay);
    }

    #[test]
    fn test_zero_frame_period_clamped() {
        let args = Args::try_parse_from(["slidecast", "--frame-ms", "0"]).unwrap();
        assert_eq!(args.frame_period(), Duration::from_millis(1));
    }
}
