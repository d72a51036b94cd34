//! Expanded view: a second, larger window onto one player.
//!
//! The view keeps no playback state of its own. On every redraw tick it reads
//! the bound player's displayable frame and control state, fits the frame into
//! its surface keeping the aspect ratio, and paints. Transport calls from its
//! controls are routed by the board straight to the bound player, so they obey
//! the same authority rules as the panel's own controls.

use std::time::Duration;

use log::{debug, trace};

use super::player::Player;
use super::scheduler::{Scheduler, TaskHandle, TimerTarget};
use crate::entities::{ControlState, ControlSurface, PlayerId, Rect, RenderSurface};

pub struct ExpandedView {
    bound: Option<PlayerId>,
    title: String,
    surface: Box<dyn RenderSurface>,
    controls: Box<dyn ControlSurface>,
    timer: Option<TaskHandle>,
    redraw_interval: Duration,
    redraws: u64,
    last_speed_ms: u32,
}

impl ExpandedView {
    pub fn new(surface: Box<dyn RenderSurface>, controls: Box<dyn ControlSurface>, redraw_interval: Duration) -> Self {
        Self {
            bound: None,
            title: String::new(),
            surface,
            controls,
            timer: None,
            redraw_interval: redraw_interval.max(Duration::from_millis(1)),
            redraws: 0,
            last_speed_ms: 0,
        }
    }

    pub fn bound(&self) -> Option<PlayerId> {
        self.bound
    }

    pub fn is_visible(&self) -> bool {
        self.bound.is_some()
    }

    /// Display name of the bound player, empty when unbound
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Redraws since the last bind
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    /// Attach to `player`, replacing any previous binding, and start the
    /// redraw loop. The first redraw happens immediately.
    pub fn bind(&mut self, player: &Player, sched: &mut Scheduler) {
        if self.bound.is_some() {
            self.unbind(sched);
        }
        self.bound = Some(player.id());
        self.title = player.name().to_string();
        self.redraws = 0;
        debug!("Expanded view bound to {} ({})", player.id(), self.title);

        self.redraw(player);
        self.arm(sched);
    }

    /// Stop the redraw loop and drop the binding. Nothing paints the surface
    /// afterwards.
    pub fn unbind(&mut self, sched: &mut Scheduler) {
        if let Some(handle) = self.timer.take() {
            sched.cancel(handle);
        }
        let Some(id) = self.bound.take() else {
            return;
        };
        debug!("Expanded view released {}", id);
        self.title.clear();
        self.controls.refresh(&ControlState::disabled(self.last_speed_ms));
    }

    /// Resize the surface; the next redraw refits.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        debug!("Expanded view resized to {}x{}", width, height);
    }

    /// Redraw timer callback. `player` is the bound player as currently found
    /// on the board; if it is gone the view unbinds itself.
    pub fn on_redraw(&mut self, handle: TaskHandle, player: Option<&Player>, sched: &mut Scheduler) -> bool {
        if self.timer != Some(handle) {
            trace!("Stale redraw ignored");
            return false;
        }
        self.timer = None;

        match player {
            Some(player) if Some(player.id()) == self.bound => {
                self.redraw(player);
                self.arm(sched);
                true
            }
            _ => {
                self.unbind(sched);
                false
            }
        }
    }

    fn redraw(&mut self, player: &Player) {
        self.redraws += 1;
        self.surface.clear();

        if let Some(frame) = player.displayable() {
            match Rect::fit_centered(frame.size(), self.surface.size()) {
                Some(dest) => self.surface.paint(frame, dest),
                None => trace!("Expanded view: nothing to fit"),
            }
        }
        let state = player.control_state();
        self.last_speed_ms = state.speed_ms;
        self.controls.refresh(&state);
    }

    fn arm(&mut self, sched: &mut Scheduler) {
        if let Some(handle) = self.timer.take() {
            sched.cancel(handle);
        }
        self.timer = Some(sched.schedule(self.redraw_interval, TimerTarget::Redraw));
    }
}

impl std::fmt::Debug for ExpandedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpandedView")
            .field("bound", &self.bound)
            .field("title", &self.title)
            .field("timer", &self.timer)
            .field("redraws", &self.redraws)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::ManualClock;
    use crate::test_support::{ControlProbe, PaintProbe, loaded, run_until};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct Rig {
        clock: ManualClock,
        sched: Scheduler,
        player: Player,
        view: ExpandedView,
        paints: PaintProbe,
        controls: ControlProbe,
    }

    fn rig() -> Rig {
        let clock = ManualClock::new();
        let sched = Scheduler::new(clock.clone());
        let mut player = Player::new(PlayerId(1), "Panel 1", 100, Box::new(PaintProbe::new(40, 40)), Box::new(ControlProbe::new()));
        player.finish_loading(loaded(24));
        let paints = PaintProbe::new(96, 64);
        let controls = ControlProbe::new();
        let view = ExpandedView::new(Box::new(paints.clone()), Box::new(controls.clone()), ms(16));
        Rig { clock, sched, player, view, paints, controls }
    }

    fn run_to(rig: &mut Rig, t: u64) {
        let Rig { clock, sched, player, view, .. } = rig;
        run_until(clock, sched, ms(t), |handle, target, sched| match target {
            TimerTarget::Advance(_) => {
                player.on_advance(handle, sched);
            }
            TimerTarget::Redraw => {
                view.on_redraw(handle, Some(&*player), sched);
            }
            TimerTarget::GlobalTick => {}
        });
    }

    #[test]
    fn test_bind_paints_cover_fitted() {
        let mut rig = rig();
        rig.view.bind(&rig.player, &mut rig.sched);

        assert!(rig.view.is_visible());
        assert_eq!(rig.view.title(), "Panel 1");
        assert_eq!(rig.paints.last_label().as_deref(), Some("cover"));
        // loaded() frames are square: 96x64 fits 64x64 centered
        assert_eq!(rig.paints.last_dest(), Some(Rect::new(16.0, 0.0, 64.0, 64.0)));
        assert_eq!(rig.sched.pending(TimerTarget::Redraw), 1);
        assert!(rig.controls.last().unwrap().play);
    }

    #[test]
    fn test_mirrors_player_without_advancing() {
        let mut rig = rig();
        rig.view.bind(&rig.player, &mut rig.sched);
        rig.player.play(&mut rig.sched);

        run_to(&mut rig, 250);
        assert_eq!(rig.player.current_index(), Some(2));
        assert_eq!(rig.paints.last_label().as_deref(), Some("frame 3"));
        assert!(rig.view.redraws() > 10);
        assert!(rig.controls.last().unwrap().pause);
        assert_eq!(rig.controls.last().unwrap().active_frame, Some(2));
    }

    #[test]
    fn test_unbind_stops_painting() {
        let mut rig = rig();
        rig.view.bind(&rig.player, &mut rig.sched);
        rig.player.play(&mut rig.sched);
        run_to(&mut rig, 100);

        rig.view.unbind(&mut rig.sched);
        let paints = rig.paints.count();
        assert_eq!(rig.sched.pending(TimerTarget::Redraw), 0);
        assert!(!rig.view.is_visible());
        assert_eq!(rig.view.title(), "");

        run_to(&mut rig, 500);
        assert_eq!(rig.paints.count(), paints);
        assert_eq!(rig.player.current_index(), Some(5));
    }

    #[test]
    fn test_unbind_disables_controls_at_last_speed() {
        let mut rig = rig();
        rig.view.unbind(&mut rig.sched);
        assert_eq!(rig.controls.count(), 0);

        rig.view.bind(&rig.player, &mut rig.sched);
        rig.view.unbind(&mut rig.sched);
        let state = rig.controls.last().unwrap();
        assert!(!state.any_enabled());
        assert_eq!(state.speed_ms, 100);
        assert_eq!(state.rate_label(), "10.0 img/sec");

        let refreshes = rig.controls.count();
        rig.view.unbind(&mut rig.sched);
        assert_eq!(rig.controls.count(), refreshes);
    }

    #[test]
    fn test_rebind_switches_player() {
        let mut rig = rig();
        let mut other = Player::new(PlayerId(2), "Panel 2", 100, Box::new(PaintProbe::new(4, 4)), Box::new(ControlProbe::new()));
        other.finish_loading(loaded(24));
        other.go_to_frame(9, &mut rig.sched);

        rig.view.bind(&rig.player, &mut rig.sched);
        rig.view.bind(&other, &mut rig.sched);

        assert_eq!(rig.view.bound(), Some(PlayerId(2)));
        assert_eq!(rig.view.title(), "Panel 2");
        assert_eq!(rig.sched.pending(TimerTarget::Redraw), 1);
        assert_eq!(rig.paints.last_label().as_deref(), Some("frame 10"));
    }

    #[test]
    fn test_missing_player_unbinds() {
        let mut rig = rig();
        rig.view.bind(&rig.player, &mut rig.sched);
        rig.clock.set(ms(16));
        let (handle, _) = rig.sched.pop_due().unwrap();

        assert!(!rig.view.on_redraw(handle, None, &mut rig.sched));
        assert!(!rig.view.is_visible());
        assert!(rig.sched.is_empty());
    }

    #[test]
    fn test_resize_refits_on_next_redraw() {
        let mut rig = rig();
        rig.view.bind(&rig.player, &mut rig.sched);
        rig.view.resize(50, 100);
        run_to(&mut rig, 16);
        assert_eq!(rig.paints.last_dest(), Some(Rect::new(0.0, 25.0, 50.0, 50.0)));
    }

    #[test]
    fn test_controls_disabled_under_global_drive() {
        let mut rig = rig();
        rig.view.bind(&rig.player, &mut rig.sched);
        rig.player.join_global(0, 200, &mut rig.sched);
        run_to(&mut rig, 16);
        let state = rig.controls.last().unwrap();
        assert!(!state.any_enabled());
        assert!(state.globally_driven);
    }

    #[test]
    fn test_unloaded_player_clears_only() {
        let mut rig = rig();
        let loading = Player::new(PlayerId(3), "Panel 3", 100, Box::new(PaintProbe::new(4, 4)), Box::new(ControlProbe::new()));
        rig.view.bind(&loading, &mut rig.sched);
        assert_eq!(rig.paints.count(), 0);
        assert!(rig.paints.clears() >= 1);
        assert!(!rig.controls.last().unwrap().any_enabled());
    }
}
