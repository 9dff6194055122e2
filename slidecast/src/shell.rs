//! Terminal presentation shell
//!
//! The shell is the presentational side of Slidecast. It draws whatever the
//! session publishes, turns typed commands into session requests, and asks
//! the session before acting on any navigation gesture.

use crate::deck::Deck;
use crate::utils::format_elapsed;
use anyhow::{anyhow, Result};
use slidecast_clock::{
    Gesture, GestureVerdict, PresentationState, Screen, SessionError, SessionHandle, Snapshot,
};
use std::io::{self, Write};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// How often the slide screen is redrawn to keep the elapsed time moving
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// ANSI colors for the slide bar
const BRIGHT_RED: &str = "\x1b[38;5;196m";
const DIM_RED: &str = "\x1b[38;5;52m";
const RESET: &str = "\x1b[0m";

const HELP: &str = "commands: p play/pause, s start over, r reset, t read text, \
n/b page down/up, home, end, space, up, down, wheel, swipe, q quit";

/// A line typed by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Toggle,
    Start,
    Reset,
    ReadText,
    Navigate(Gesture),
    Help,
    Quit,
}

impl Input {
    /// Parses one line of input; unknown commands yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let input = match line.trim().to_lowercase().as_str() {
            "p" | "play" | "pause" => Input::Toggle,
            "s" | "start" => Input::Start,
            "r" | "reset" => Input::Reset,
            "t" | "text" | "read" => Input::ReadText,
            "n" | "pgdn" | "pagedown" => Input::Navigate(Gesture::PageDown),
            "b" | "pgup" | "pageup" => Input::Navigate(Gesture::PageUp),
            "home" => Input::Navigate(Gesture::Home),
            "end" => Input::Navigate(Gesture::End),
            "space" => Input::Navigate(Gesture::Space),
            "up" => Input::Navigate(Gesture::ArrowUp),
            "down" => Input::Navigate(Gesture::ArrowDown),
            "wheel" | "scroll" => Input::Navigate(Gesture::Scroll),
            "swipe" => Input::Navigate(Gesture::Swipe),
            "h" | "help" | "?" => Input::Help,
            "q" | "quit" | "exit" => Input::Quit,
            _ => return None,
        };
        Some(input)
    }
}

/// Draws snapshots and forwards input to a session
pub struct TerminalShell {
    deck: Deck,
    quiet: bool,
    /// Transcript paragraph shown on the reading screen
    paragraph: usize,
}

impl TerminalShell {
    pub fn new(deck: Deck, quiet: bool) -> Self {
        Self {
            deck,
            quiet,
            paragraph: 0,
        }
    }

    /// Runs until the viewer quits, or until input closes and nothing is playing
    pub async fn run(mut self, session: SessionHandle, autoplay: bool) -> Result<()> {
        let mut updates = session.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut redraw = interval(REDRAW_INTERVAL);
        let mut input_open = true;

        if !self.quiet {
            println!("{}", HELP);
        }
        if autoplay {
            self.start(&session).await?;
        }
        self.draw(&session.snapshot());

        loop {
            select! {
                line = lines.next_line(), if input_open => match line? {
                    Some(line) => {
                        let Some(input) = Input::parse(&line) else {
                            if !line.trim().is_empty() {
                                warn!("Unknown command '{}' (h for help)", line.trim());
                            }
                            continue;
                        };
                        if input == Input::Quit {
                            break;
                        }
                        self.apply(&session, input).await?;
                        self.draw(&session.snapshot());
                    }
                    None => {
                        debug!("input closed");
                        input_open = false;
                    }
                },
                changed = updates.changed() => {
                    if changed.is_err() {
                        return Err(anyhow!("Presentation session stopped unexpectedly"));
                    }
                    let snapshot = *updates.borrow_and_update();
                    if self.quiet {
                        println!("{}", report_line(&snapshot));
                    } else {
                        self.draw(&snapshot);
                    }
                }
                _ = redraw.tick(), if !self.quiet => {
                    let snapshot = session.snapshot();
                    if snapshot.state == PresentationState::Playing {
                        self.draw(&snapshot);
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }

            if !input_open && session.snapshot().state != PresentationState::Playing {
                break;
            }
        }

        if !self.quiet {
            println!();
        }
        session.shutdown().await;
        Ok(())
    }

    async fn apply(&mut self, session: &SessionHandle, input: Input) -> Result<()> {
        match input {
            Input::Toggle => {
                if let Err(e) = session.toggle().await {
                    self.report_failure(e)?;
                }
            }
            Input::Start => self.start(session).await?,
            Input::Reset => session.reset().await?,
            Input::ReadText => {
                session.read_text().await?;
                self.paragraph = 0;
                self.print_paragraph();
            }
            Input::Navigate(gesture) => {
                let verdict = session.gesture(gesture).await?;
                let screen = session.snapshot().screen;
                self.navigate(gesture, verdict, screen);
            }
            Input::Help => println!("\n{}", HELP),
            Input::Quit => {}
        }
        Ok(())
    }

    async fn start(&self, session: &SessionHandle) -> Result<()> {
        if let Err(e) = session.start().await {
            self.report_failure(e)?;
        }
        Ok(())
    }

    /// Audio refusals are shown and survived; a closed session is not
    fn report_failure(&self, error: SessionError) -> Result<()> {
        match error {
            SessionError::Audio(e) => {
                warn!("Could not start playback: {}", e);
                Ok(())
            }
            SessionError::Closed => Err(SessionError::Closed.into()),
        }
    }

    /// Applies a navigation gesture the session has ruled on
    ///
    /// Gestures only move through the transcript on the reading screen; slides
    /// follow the narration and are never paged by hand.
    pub fn navigate(&mut self, gesture: Gesture, verdict: GestureVerdict, screen: Screen) {
        if verdict == GestureVerdict::Suppressed {
            info!("Navigation is locked while the narration plays");
            return;
        }
        if screen != Screen::Reading {
            debug!(?gesture, ?screen, "gesture has no effect on this screen");
            return;
        }

        let last = self.deck.transcript.len().saturating_sub(1);
        self.paragraph = match gesture {
            Gesture::PageDown
            | Gesture::ArrowDown
            | Gesture::Space
            | Gesture::Scroll
            | Gesture::Swipe => (self.paragraph + 1).min(last),
            Gesture::PageUp | Gesture::ArrowUp => self.paragraph.saturating_sub(1),
            Gesture::Home => 0,
            Gesture::End => last,
        };
        self.print_paragraph();
    }

    pub fn paragraph(&self) -> usize {
        self.paragraph
    }

    fn print_paragraph(&self) {
        if self.quiet {
            return;
        }
        match self.deck.transcript.get(self.paragraph) {
            Some(text) => println!(
                "\n[{}/{}] {}",
                self.paragraph + 1,
                self.deck.transcript.len(),
                text
            ),
            None => println!("\n(no transcript)"),
        }
    }

    fn draw(&self, snapshot: &Snapshot) {
        if self.quiet {
            return;
        }
        print!("\r{}\x1b[K", self.render(snapshot));
        // A failed flush only delays the frame
        let _ = io::stdout().flush();
    }

    /// Renders the one-line frame for a snapshot
    pub fn render(&self, snapshot: &Snapshot) -> String {
        match snapshot.screen {
            Screen::Landing => format!(
                "{}: {} slides, press p to play or t to read",
                self.deck.title, snapshot.slide_count
            ),
            Screen::Reading => format!(
                "{}: reading ({}/{}), p to play",
                self.deck.title,
                (self.paragraph + 1).min(self.deck.transcript.len().max(1)),
                self.deck.transcript.len().max(1)
            ),
            Screen::Slides => {
                let marker = if snapshot.state == PresentationState::Paused {
                    "||"
                } else {
                    ">"
                };
                format!(
                    "[{}] {}/{} {}  {} {}",
                    slide_bar(snapshot.slide, snapshot.slide_count),
                    snapshot.slide + 1,
                    snapshot.slide_count,
                    self.deck.slide_title(snapshot.slide),
                    format_elapsed(snapshot.elapsed),
                    marker
                )
            }
            Screen::Finished => format!(
                "{}: finished, p to play again or t to read",
                self.deck.title
            ),
        }
    }
}

/// One block per slide; slides already shown are lit
fn slide_bar(slide: usize, slide_count: usize) -> String {
    (0..slide_count)
        .map(|i| {
            let color = if i <= slide { BRIGHT_RED } else { DIM_RED };
            format!("{}█{}", color, RESET)
        })
        .collect()
}

/// Machine-readable line for quiet mode
fn report_line(snapshot: &Snapshot) -> String {
    format!(
        "state={} slide={} slides={} elapsed_ms={}",
        snapshot.state,
        snapshot.slide,
        snapshot.slide_count,
        snapshot.elapsed.as_millis()
    )
}
