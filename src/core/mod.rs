//! Core engine modules - scheduler, intents, players, coordinator, workers
//!
//! These modules form the playback engine, independent of any surface.

pub mod coordinator;
pub mod event_bus;
pub mod expanded;
pub mod player;
pub mod player_events;
pub mod scheduler;
pub mod workers;

// Re-exports for convenience
pub use coordinator::{GlobalCoordinator, Players};
pub use event_bus::{IntentBus, IntentEmitter};
pub use expanded::ExpandedView;
pub use player::{LoadState, PlaybackState, Player};
pub use player_events::{ExpandedCommand, GlobalCommand, Intent, ParseIntentError, Transport};
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, TaskHandle, TimerTarget};
pub use workers::Workers;
