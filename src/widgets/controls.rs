//! Control surface for the headless runner: logs enablement changes.

use log::debug;

use crate::entities::{ControlState, ControlSurface};

pub struct LogControls {
    owner: String,
    last: Option<ControlState>,
    refreshes: u64,
}

impl LogControls {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            last: None,
            refreshes: 0,
        }
    }

    pub fn last(&self) -> Option<&ControlState> {
        self.last.as_ref()
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl ControlSurface for LogControls {
    fn refresh(&mut self, state: &ControlState) {
        self.refreshes += 1;
        // Frame highlight moves every tick; only enablement changes are logged
        let changed = self.last.is_none_or(|last| {
            (last.play, last.pause, last.cover, last.speed, last.scrub, last.speed_ms)
                != (state.play, state.pause, state.cover, state.speed, state.scrub, state.speed_ms)
        });
        if changed {
            debug!(
                "{} controls: play={} pause={} cover={} speed={} scrub={} [{}]{}",
                self.owner,
                state.play,
                state.pause,
                state.cover,
                state.speed,
                state.scrub,
                state.rate_label(),
                if state.globally_driven { " (global)" } else { "" }
            );
        }
        self.last = Some(*state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_last_state() {
        let mut controls = LogControls::new("Panel 1");
        assert!(controls.last().is_none());

        let state = ControlState {
            play: true,
            speed_ms: 500,
            ..Default::default()
        };
        controls.refresh(&state);
        controls.refresh(&ControlState {
            active_frame: Some(3),
            ..state
        });

        assert_eq!(controls.refreshes(), 2);
        assert_eq!(controls.last().and_then(|s| s.active_frame), Some(3));
    }
}
