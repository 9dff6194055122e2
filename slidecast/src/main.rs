//! Slidecast - a narrated slide presentation for the terminal
//!
//! Slides advance on their own in lockstep with a narration track, following
//! a list of time marks. While the narration plays, manual navigation is
//! locked; pausing unlocks it and resuming carries on where playback stopped.

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn};

use slidecast::args::Args;
use slidecast::deck::Deck;
use slidecast::shell::TerminalShell;
use slidecast::utils::format_elapsed;
use slidecast_clock::{Presentation, PresentationSession, SessionConfig, TimedTrack};

// ============================================================================
// Helper Functions for main() orchestration
// ============================================================================

/// Initialize tracing subscriber for structured logging
fn setup_logging(quiet: bool) {
    let default_level = if quiet { "error" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new(default_level)),
        )
        .init();
}

/// Load the deck and apply command-line overrides
fn build_deck(args: &Args) -> Result<Deck> {
    let mut deck = match &args.deck {
        Some(path) => Deck::load(path)?,
        None => Deck::demo(),
    };

    if let Some(marks) = &args.marks {
        deck.marks = marks.clone();
    }
    if let Some(track) = args.track {
        deck.track = Some(track);
    }

    // Marks are a precondition of the clock, not something it checks
    if !deck.time_marks().is_strictly_ascending() {
        warn!(
            "Time marks are not strictly ascending ({:?}); slide selection will be unreliable",
            deck.marks
        );
    }
    if !deck.slides.is_empty() && deck.slides.len() != deck.slide_count() {
        warn!(
            "Deck has {} slides but {} time marks call for {}",
            deck.slides.len(),
            deck.marks.len(),
            deck.slide_count()
        );
    }
    if deck.track_length().is_zero() {
        return Err(anyhow!("Track length must be greater than zero"));
    }

    Ok(deck)
}

/// Print startup information including deck, slides and timing
fn print_startup_info(args: &Args, deck: &Deck) {
    if args.quiet {
        return;
    }

    info!("Starting Slidecast - {}", deck.title);
    info!(
        "Slides: {}, Time marks: {:?}, Track: {}, Frame period: {}ms",
        deck.slide_count(),
        deck.marks,
        format_elapsed(deck.track_length()),
        args.frame_period().as_millis()
    );
    if deck.transcript.is_empty() {
        info!("No transcript: the reading view will be empty");
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main entry point for Slidecast
///
/// 1. Parse command-line arguments and load the deck
/// 2. Open the narration track
/// 3. Spawn the presentation session
/// 4. Hand the terminal to the shell until the viewer quits
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.quiet);

    let deck = build_deck(&args)?;
    print_startup_info(&args, &deck);

    let (track, ended) = TimedTrack::new(deck.track_length());
    let presentation = Presentation::new(deck.time_marks(), track);
    let session = PresentationSession::spawn(
        presentation,
        ended,
        SessionConfig {
            frame_period: args.frame_period(),
        },
    );

    TerminalShell::new(deck, args.quiet)
        .run(session, args.autoplay)
        .await?;

    if !args.quiet {
        info!("Slidecast finished");
    }
    Ok(())
}
