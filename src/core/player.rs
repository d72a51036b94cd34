//! Playback state machine for one panel.
//!
//! **Architecture**: Player owns its frame sequence, position, speed and the
//! handle of its pending advance task. The scheduler is passed in by the board
//! whenever a transition needs to arm or cancel a timer; nothing else writes
//! player fields. The global coordinator and the expanded view go through the
//! same methods as the panel's own control surface.
//!
//! # States
//!
//! ```text
//!            play            pause
//!   Cover ─────────► Playing ─────► Paused
//!     ▲   ◄──────────   │  ▲  ◄─────── │
//!     │   show_cover    │  └── play ───┘
//!     │                 │ go_to_frame
//!     └── show_cover ── StoppedOnFrame ── play ──► Playing
//! ```
//!
//! # Authority
//!
//! While the coordinator drives a player (`Authority::Global`) every local
//! transport call is rejected and the player's own timer is never armed: the
//! coordinator tick is the only thing that moves the frame.
//!
//! # Timing Model
//!
//! Fixed delay. Each advance renders, then arms the next advance `speed_ms`
//! later. `set_speed` while playing re-arms from the moment of the call.
//!
//! Transport calls return `true` when applied and `false` when rejected
//! (not loaded yet, wrong state, or locked by the coordinator).

use std::time::Duration;

use log::{debug, info, trace};

use super::scheduler::{Scheduler, TaskHandle, TimerTarget};
use crate::entities::{
    ControlState, ControlSurface, Frame, FrameSequence, LoadOutcome, LoadResult, PlayerId, Rect,
    RenderSurface,
};

/// Load progress of the frame sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    /// Load failed, placeholders were substituted
    Substituted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Cover,
    Playing,
    Paused,
    StoppedOnFrame,
}

/// Who may move this player's frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Authority {
    Local,
    Global,
}

pub struct Player {
    id: PlayerId,
    name: String,
    sequence: Option<FrameSequence>,
    load_state: LoadState,
    playback: PlaybackState,
    current_index: usize,
    speed_ms: u32,
    authority: Authority,
    /// Pending advance task; at most one per player
    timer: Option<TaskHandle>,
    surface: Box<dyn RenderSurface>,
    controls: Box<dyn ControlSurface>,
}

impl Player {
    /// Create an empty player. It stays inert until [`finish_loading`](Self::finish_loading).
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        speed_ms: u32,
        surface: Box<dyn RenderSurface>,
        controls: Box<dyn ControlSurface>,
    ) -> Self {
        let mut player = Self {
            id,
            name: name.into(),
            sequence: None,
            load_state: LoadState::Loading,
            playback: PlaybackState::Cover,
            current_index: 0,
            speed_ms: speed_ms.max(1),
            authority: Authority::Local,
            timer: None,
            surface,
            controls,
        };
        player.publish_controls();
        player
    }

    // === Accessors ===

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Sequence present (loaded or substituted)
    pub fn is_ready(&self) -> bool {
        self.load_state != LoadState::Loading
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback == PlaybackState::Playing
    }

    /// Frame position; None on cover or before loading
    pub fn current_index(&self) -> Option<usize> {
        if !self.is_ready() || self.playback == PlaybackState::Cover {
            return None;
        }
        Some(self.current_index)
    }

    pub fn speed_ms(&self) -> u32 {
        self.speed_ms
    }

    /// Sequence length, 0 before loading
    pub fn frame_count(&self) -> usize {
        self.sequence.as_ref().map_or(0, FrameSequence::len)
    }

    pub fn sequence(&self) -> Option<&FrameSequence> {
        self.sequence.as_ref()
    }

    pub fn is_globally_driven(&self) -> bool {
        self.authority == Authority::Global
    }

    /// An own advance task is armed
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    /// What a view of this player should show right now: the cover, or the
    /// frame at the current index. None before loading.
    pub fn displayable(&self) -> Option<&Frame> {
        let sequence = self.sequence.as_ref()?;
        match self.playback {
            PlaybackState::Cover => Some(sequence.cover()),
            _ => sequence.frame(self.current_index),
        }
    }

    /// Control enablement derived from live state
    pub fn control_state(&self) -> ControlState {
        if !self.is_ready() || self.authority == Authority::Global {
            return ControlState {
                active_frame: self.current_index(),
                globally_driven: self.authority == Authority::Global,
                ..ControlState::disabled(self.speed_ms)
            };
        }

        let playing = self.is_playing();
        ControlState {
            play: !playing,
            pause: playing,
            cover: true,
            speed: !playing,
            scrub: true,
            speed_ms: self.speed_ms,
            active_frame: self.current_index(),
            globally_driven: false,
        }
    }

    // === Loading ===

    /// Install the loaded sequence and show the cover.
    pub fn finish_loading(&mut self, result: LoadResult) {
        self.load_state = match result.outcome {
            LoadOutcome::Loaded => LoadState::Loaded,
            LoadOutcome::Substituted { .. } => LoadState::Substituted,
        };
        info!(
            "{} ({}): {} frames, {:?}",
            self.name,
            self.id,
            result.sequence.len(),
            self.load_state
        );
        self.sequence = Some(result.sequence);
        self.playback = PlaybackState::Cover;
        self.current_index = 0;
        self.render_cover();
        self.publish_controls();
    }

    // === Local transport ===

    /// Start or resume autonomous playback.
    ///
    /// From the cover playback restarts at the first frame and paints it right
    /// away, so the first advance shows frame 1; from a paused or stopped frame
    /// it continues where it was.
    pub fn play(&mut self, sched: &mut Scheduler) -> bool {
        if !self.accepts_local("play") || self.is_playing() {
            return false;
        }

        if self.playback == PlaybackState::Cover {
            self.current_index = 0;
            self.render(self.current_index);
        }
        self.playback = PlaybackState::Playing;
        self.arm(sched);
        debug!("{}: play from frame {} every {}ms", self.id, self.current_index, self.speed_ms);
        self.publish_controls();
        true
    }

    /// Freeze on the current frame.
    pub fn pause(&mut self, sched: &mut Scheduler) -> bool {
        if !self.accepts_local("pause") || !self.is_playing() {
            return false;
        }

        self.disarm(sched);
        self.playback = PlaybackState::Paused;
        debug!("{}: paused at frame {}", self.id, self.current_index);
        self.publish_controls();
        true
    }

    /// Same as [`show_cover`](Self::show_cover)
    pub fn stop(&mut self, sched: &mut Scheduler) -> bool {
        self.show_cover(sched)
    }

    /// Cancel playback and show the cover.
    pub fn show_cover(&mut self, sched: &mut Scheduler) -> bool {
        if !self.accepts_local("show_cover") {
            return false;
        }

        self.disarm(sched);
        self.playback = PlaybackState::Cover;
        self.render_cover();
        debug!("{}: cover", self.id);
        self.publish_controls();
        true
    }

    /// Stop on frame `index`, normalized modulo the sequence length.
    pub fn go_to_frame(&mut self, index: i64, sched: &mut Scheduler) -> bool {
        if !self.accepts_local("go_to_frame") {
            return false;
        }

        self.disarm(sched);
        self.current_index = self.normalize(index);
        self.playback = PlaybackState::StoppedOnFrame;
        self.render(self.current_index);
        debug!("{}: stopped on frame {}", self.id, self.current_index);
        self.publish_controls();
        true
    }

    /// Change the frame delay. While playing, the pending advance is replaced
    /// by one `speed_ms` from now, so no frame is skipped or repeated.
    pub fn set_speed(&mut self, speed_ms: u32, sched: &mut Scheduler) -> bool {
        if speed_ms == 0 {
            debug!("{}: ignoring zero speed", self.id);
            return false;
        }
        if !self.accepts_local("set_speed") {
            return false;
        }

        self.speed_ms = speed_ms;
        if self.is_playing() {
            self.arm(sched);
        }
        debug!("{}: speed {}ms", self.id, speed_ms);
        self.publish_controls();
        true
    }

    /// Advance timer callback. Stale handles (cancelled or replaced) are ignored.
    pub fn on_advance(&mut self, handle: TaskHandle, sched: &mut Scheduler) -> bool {
        if self.timer != Some(handle) {
            trace!("{}: stale advance task ignored", self.id);
            return false;
        }
        self.timer = None;
        if !self.is_playing() || self.authority == Authority::Global {
            return false;
        }

        let count = self.frame_count().max(1);
        self.current_index = (self.current_index + 1) % count;
        self.render(self.current_index);
        trace!("{}: advance -> {}", self.id, self.current_index);
        // Render completes before the next tick is armed
        self.arm(sched);
        self.publish_controls();
        true
    }

    // === Coordinator-facing transport ===

    /// Hand control to the coordinator and start synchronized playback at
    /// `index` with the global speed.
    ///
    /// A player that is still loading only records the hand-over; the board
    /// calls this again once the sequence arrives.
    pub fn join_global(&mut self, index: usize, speed_ms: u32, sched: &mut Scheduler) {
        self.disarm(sched);
        self.authority = Authority::Global;
        self.speed_ms = speed_ms.max(1);

        if self.is_ready() {
            self.current_index = self.normalize(index as i64);
            self.playback = PlaybackState::Playing;
            self.render(self.current_index);
        }
        debug!("{}: joined global playback at frame {}", self.id, index);
        self.publish_controls();
    }

    /// Render the coordinator's frame. Rejected unless globally driven.
    pub fn render_synced(&mut self, index: usize) -> bool {
        if self.authority != Authority::Global || !self.is_playing() {
            return false;
        }
        self.current_index = self.normalize(index as i64);
        self.render(self.current_index);
        self.publish_controls();
        true
    }

    /// Adopt the global speed while globally driven.
    pub fn apply_global_speed(&mut self, speed_ms: u32) -> bool {
        if self.authority != Authority::Global || speed_ms == 0 {
            return false;
        }
        self.speed_ms = speed_ms;
        self.publish_controls();
        true
    }

    /// Return control to the panel, frozen on the current frame. A released
    /// player is never left playing without its own advance timer.
    pub fn release_global(&mut self, sched: &mut Scheduler) {
        if self.authority != Authority::Global {
            return;
        }
        self.disarm(sched);
        self.authority = Authority::Local;
        if self.is_playing() {
            self.playback = PlaybackState::Paused;
        }
        debug!("{}: released from global playback at frame {}", self.id, self.current_index);
        self.publish_controls();
    }

    /// Cancel the pending advance before the player is dropped.
    pub fn teardown(&mut self, sched: &mut Scheduler) {
        self.disarm(sched);
        self.playback = PlaybackState::Cover;
        trace!("{}: torn down", self.id);
    }

    // === Internals ===

    fn accepts_local(&self, op: &str) -> bool {
        if !self.is_ready() {
            trace!("{}: {} ignored, still loading", self.id, op);
            return false;
        }
        if self.authority == Authority::Global {
            debug!("{}: {} rejected, globally driven", self.id, op);
            return false;
        }
        true
    }

    fn normalize(&self, index: i64) -> usize {
        let count = self.frame_count().max(1) as i64;
        index.rem_euclid(count) as usize
    }

    /// Replace any pending advance with one `speed_ms` from now.
    fn arm(&mut self, sched: &mut Scheduler) {
        self.disarm(sched);
        let delay = Duration::from_millis(self.speed_ms as u64);
        self.timer = Some(sched.schedule(delay, TimerTarget::Advance(self.id)));
    }

    fn disarm(&mut self, sched: &mut Scheduler) {
        if let Some(handle) = self.timer.take() {
            sched.cancel(handle);
        }
    }

    fn render(&mut self, index: usize) {
        let Some(frame) = self.sequence.as_ref().and_then(|s| s.frame(index)) else {
            trace!("{}: no frame {}, skipping paint", self.id, index);
            return;
        };
        let dest = Rect::fill(self.surface.size());
        self.surface.clear();
        self.surface.paint(frame, dest);
    }

    fn render_cover(&mut self) {
        let Some(sequence) = self.sequence.as_ref() else {
            return;
        };
        let dest = Rect::fill(self.surface.size());
        self.surface.clear();
        self.surface.paint(sequence.cover(), dest);
    }

    fn publish_controls(&mut self) {
        let state = self.control_state();
        self.controls.refresh(&state);
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("load_state", &self.load_state)
            .field("playback", &self.playback)
            .field("current_index", &self.current_index)
            .field("speed_ms", &self.speed_ms)
            .field("authority", &self.authority)
            .field("timer", &self.timer)
            .finish()
    }
}
