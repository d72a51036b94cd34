//! REELBOARD - Looping image-sequence players with a global transport
//!
//! Re-exports all modules for use by the binary target.

// Core engine (scheduler, intents, players, coordinator, workers)
pub mod core;

// Board wiring and surfaces
pub mod board;
pub mod cli;
pub mod config;
pub mod entities;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use board::Board;
pub use config::BoardSettings;
pub use crate::core::{GlobalCoordinator, Intent, IntentEmitter, Player};
pub use entities::{Frame, FrameSequence, PlayerId, ResourceLoader, SequenceSource};
