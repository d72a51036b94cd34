//! Global transport: lock-step playback across all member players.
//!
//! While active the coordinator owns a single tick timer and is the only
//! writer of its members' frame position. Members are switched to global
//! authority, their own timers are cancelled and every local transport call on
//! them is rejected until the coordinator lets go.

use std::time::Duration;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace};

use super::player::Player;
use super::scheduler::{Scheduler, TaskHandle, TimerTarget};
use crate::entities::PlayerId;

/// Player table as kept by the board, in panel order
pub type Players = IndexMap<PlayerId, Player>;

#[derive(Debug)]
pub struct GlobalCoordinator {
    active: bool,
    speed_ms: u32,
    current_index: usize,
    frame_count: usize,
    members: IndexSet<PlayerId>,
    timer: Option<TaskHandle>,
    ticks: u64,
}

impl GlobalCoordinator {
    pub fn new(speed_ms: u32, frame_count: usize) -> Self {
        Self {
            active: false,
            speed_ms: speed_ms.max(1),
            current_index: 0,
            frame_count: frame_count.max(1),
            members: IndexSet::new(),
            timer: None,
            ticks: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn speed_ms(&self) -> u32 {
        self.speed_ms
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn members(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.members.iter().copied()
    }

    pub fn is_member(&self, id: PlayerId) -> bool {
        self.members.contains(&id)
    }

    /// Ticks since the last activation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn add_member(&mut self, id: PlayerId) -> bool {
        self.members.insert(id)
    }

    /// Drop a member. An active session lets go of it and pauses it.
    pub fn remove_member(&mut self, id: PlayerId, players: &mut Players, sched: &mut Scheduler) -> bool {
        if !self.members.shift_remove(&id) {
            return false;
        }
        if self.active
            && let Some(player) = players.get_mut(&id)
        {
            player.release_global(sched);
        }
        true
    }

    /// Start lock-step playback from frame 0.
    ///
    /// `speed_ms` replaces the global speed when given. Calling this while
    /// already active restarts the session.
    pub fn activate(&mut self, speed_ms: Option<u32>, players: &mut Players, sched: &mut Scheduler) {
        if let Some(ms) = speed_ms.filter(|ms| *ms > 0) {
            self.speed_ms = ms;
        }
        self.disarm(sched);
        self.active = true;
        self.current_index = 0;
        self.ticks = 0;

        for id in &self.members {
            if let Some(player) = players.get_mut(id) {
                player.join_global(self.current_index, self.speed_ms, sched);
            }
        }
        self.arm(sched);
        info!(
            "Global playback on: {} members every {}ms",
            self.members.len(),
            self.speed_ms
        );
    }

    /// Stop the session and pause every member on its current frame.
    ///
    /// Members are paused even when no session is running, so this doubles
    /// as "pause all".
    pub fn deactivate(&mut self, players: &mut Players, sched: &mut Scheduler) {
        self.disarm(sched);
        if self.active {
            info!("Global playback off at frame {} after {} ticks", self.current_index, self.ticks);
        }
        self.active = false;

        for id in &self.members {
            if let Some(player) = players.get_mut(id) {
                player.release_global(sched);
                player.pause(sched);
            }
        }
    }

    /// Deactivate, then put every member on its cover.
    pub fn show_cover_all(&mut self, players: &mut Players, sched: &mut Scheduler) {
        self.deactivate(players, sched);
        for id in &self.members {
            if let Some(player) = players.get_mut(id) {
                player.show_cover(sched);
            }
        }
        debug!("Cover on all {} members", self.members.len());
    }

    /// Change the global speed. While active, members adopt it and the tick is
    /// re-armed from now; otherwise it only takes effect on the next activation.
    pub fn set_speed(&mut self, speed_ms: u32, players: &mut Players, sched: &mut Scheduler) -> bool {
        if speed_ms == 0 {
            return false;
        }
        self.speed_ms = speed_ms;
        if !self.active {
            debug!("Global speed {}ms (inactive)", speed_ms);
            return true;
        }

        for id in &self.members {
            if let Some(player) = players.get_mut(id) {
                player.apply_global_speed(speed_ms);
            }
        }
        self.arm(sched);
        debug!("Global speed {}ms", speed_ms);
        true
    }

    /// Send every member to frame `index`. Rejected while active.
    pub fn go_to_frame(&mut self, index: i64, players: &mut Players, sched: &mut Scheduler) -> bool {
        if self.active {
            debug!("Global go_to_frame rejected while playing");
            return false;
        }
        for id in &self.members {
            if let Some(player) = players.get_mut(id) {
                player.go_to_frame(index, sched);
            }
        }
        true
    }

    /// Tick timer callback. Stale handles are ignored.
    pub fn on_tick(&mut self, handle: TaskHandle, players: &mut Players, sched: &mut Scheduler) -> bool {
        if self.timer != Some(handle) {
            trace!("Stale global tick ignored");
            return false;
        }
        self.timer = None;
        if !self.active {
            return false;
        }

        self.current_index = (self.current_index + 1) % self.frame_count;
        self.ticks += 1;
        for id in &self.members {
            if let Some(player) = players.get_mut(id) {
                player.render_synced(self.current_index);
            }
        }
        trace!("Global tick {} -> frame {}", self.ticks, self.current_index);
        self.arm(sched);
        true
    }

    /// Pull a member into a running session, e.g. once its sequence has
    /// finished loading after activation.
    pub fn adopt(&mut self, id: PlayerId, players: &mut Players, sched: &mut Scheduler) -> bool {
        if !self.active || !self.members.contains(&id) {
            return false;
        }
        match players.get_mut(&id) {
            Some(player) => {
                player.join_global(self.current_index, self.speed_ms, sched);
                debug!("{} adopted into global playback at frame {}", id, self.current_index);
                true
            }
            None => false,
        }
    }

    fn arm(&mut self, sched: &mut Scheduler) {
        self.disarm(sched);
        let delay = Duration::from_millis(self.speed_ms as u64);
        self.timer = Some(sched.schedule(delay, TimerTarget::GlobalTick));
    }

    fn disarm(&mut self, sched: &mut Scheduler) {
        if let Some(handle) = self.timer.take() {
            sched.cancel(handle);
        }
    }
}
