//! Entities - data types shared by the playback engine and its surfaces.
//!
//! Nothing in here schedules or mutates playback; the engine in `core`
//! depends on these types, never the other way round.

pub mod controls;
pub mod frame;
pub mod loader;
pub mod placeholder;
pub mod rect;
pub mod source;
pub mod traits;

pub use controls::ControlState;
pub use frame::{Frame, FrameOrigin, FrameSequence};
pub use loader::{FileFetcher, LoadError, LoadOutcome, LoadResult, ResourceLoader};
pub use placeholder::PlaceholderStyle;
pub use rect::Rect;
pub use source::{FramePattern, SequenceSource};
pub use traits::{ControlSurface, Fetch, RenderSurface};

use serde::{Deserialize, Serialize};

/// Player identity. Panels are numbered from 1 in the order they are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}
