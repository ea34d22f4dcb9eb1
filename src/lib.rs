//! imgsort - sort a folder of images into category folders from the terminal
//!
//! The library holds the triage session (image queue, preview resolution and
//! moves with single-step undo) so it can be driven without the TUI.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod preview;
pub mod session;
pub mod tui;

// Re-export primary types for convenience
pub use config::SorterConfig;
pub use domain::{
    discover_images, ImageQueue, MoveExecutor, MoveRecord, QueueOrder, SubstitutionRules,
    UndoOutcome,
};
pub use error::{Result, SorterError};
pub use session::{DisplayState, Intent, IntentOutcome, SessionSettings, TriageSession};
