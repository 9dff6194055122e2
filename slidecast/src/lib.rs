//! Slidecast - narrated slide presentations in the terminal
//!
//! This library holds the presentational side of the Slidecast tool: command
//! line arguments, deck content and the terminal shell. Timing and lifecycle
//! live in the `slidecast_clock` crate.

pub mod args;
pub mod deck;
pub mod shell;
pub mod utils;

// Re-export commonly used types
pub use args::Args;
pub use deck::{Deck, Slide};
pub use shell::{Input, TerminalShell};
