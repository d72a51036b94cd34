//! Control enablement snapshot pushed to control surfaces.

/// What a control surface should show for one player.
///
/// Derived from the player's live state on every change; surfaces never
/// store playback state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub play: bool,
    pub pause: bool,
    pub cover: bool,
    pub speed: bool,
    /// Frame buttons (go to frame)
    pub scrub: bool,
    pub speed_ms: u32,
    /// Highlighted frame button, None while the cover is shown
    pub active_frame: Option<usize>,
    /// The global coordinator owns this player right now
    pub globally_driven: bool,
}

impl ControlState {
    /// Everything disabled (loading, or locked by the coordinator)
    pub fn disabled(speed_ms: u32) -> Self {
        Self {
            speed_ms,
            ..Default::default()
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.play || self.pause || self.cover || self.speed || self.scrub
    }

    /// Speed as shown next to the slider, e.g. "2.0 img/sec"
    pub fn rate_label(&self) -> String {
        rate_label(self.speed_ms)
    }
}

/// Frames per second for a per-frame delay, formatted with one decimal
pub fn rate_label(speed_ms: u32) -> String {
    format!("{:.1} img/sec", 1000.0 / speed_ms.max(1) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_label() {
        assert_eq!(rate_label(500), "2.0 img/sec");
        assert_eq!(rate_label(200), "5.0 img/sec");
        assert_eq!(rate_label(3000), "0.3 img/sec");
        assert_eq!(rate_label(0), "1000.0 img/sec");
    }

    #[test]
    fn test_disabled_has_nothing_enabled() {
        let state = ControlState::disabled(250);
        assert!(!state.any_enabled());
        assert_eq!(state.rate_label(), "4.0 img/sec");
        assert_eq!(state.active_frame, None);
    }
}
