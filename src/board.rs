//! Board - owns the players, the coordinator and the expanded view.
//!
//! The board is the single thread every playback mutation happens on. Each
//! [`Board::pump`] does three things in order:
//! 1. install sequences whose background load has finished
//! 2. apply queued intents from control surfaces
//! 3. fire every due timer (player advances, global ticks, redraws)
//!
//! The host calls `pump` in its loop and sleeps for [`Board::time_until_next`]
//! in between.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info, trace, warn};

use crate::config::BoardSettings;
use crate::core::{
    Clock, ExpandedCommand, ExpandedView, GlobalCommand, GlobalCoordinator, Intent, IntentBus, IntentEmitter, Player,
    Players, Scheduler, TaskHandle, TimerTarget, Transport, Workers,
};
use crate::entities::{ControlSurface, Fetch, LoadResult, PlayerId, RenderSurface, ResourceLoader, SequenceSource};

/// Finished background load for one player
struct LoadCompletion {
    id: PlayerId,
    result: LoadResult,
}

pub struct Board {
    settings: BoardSettings,
    players: Players,
    coordinator: GlobalCoordinator,
    expanded: ExpandedView,
    scheduler: Scheduler,
    bus: IntentBus,
    workers: Workers,
    loader: Arc<ResourceLoader>,
    completions_tx: Sender<LoadCompletion>,
    completions_rx: Receiver<LoadCompletion>,
    pending_loads: usize,
    next_id: u32,
}

impl Board {
    /// Build an empty board. Fails only if loader threads cannot be spawned.
    pub fn new(
        mut settings: BoardSettings,
        clock: impl Clock + 'static,
        fetcher: Arc<dyn Fetch>,
        expanded_surface: Box<dyn RenderSurface>,
        expanded_controls: Box<dyn ControlSurface>,
    ) -> std::io::Result<Self> {
        settings.sanitize();
        let workers = Workers::new(settings.worker_threads())?;
        let (completions_tx, completions_rx) = unbounded();
        let expanded = ExpandedView::new(expanded_surface, expanded_controls, settings.redraw_interval());

        info!(
            "Board: {} frames per player, {} loader threads",
            settings.frame_count,
            workers.threads()
        );
        Ok(Self {
            coordinator: GlobalCoordinator::new(settings.global_speed_ms, settings.frame_count),
            loader: Arc::new(ResourceLoader::new(fetcher, settings.placeholder)),
            scheduler: Scheduler::new(clock),
            players: Players::new(),
            bus: IntentBus::new(),
            expanded,
            workers,
            completions_tx,
            completions_rx,
            pending_loads: 0,
            next_id: 1,
            settings,
        })
    }

    // === Accessors ===

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn coordinator(&self) -> &GlobalCoordinator {
        &self.coordinator
    }

    pub fn expanded(&self) -> &ExpandedView {
        &self.expanded
    }

    /// Handle for control surfaces to raise intents, from any thread
    pub fn emitter(&self) -> IntentEmitter {
        self.bus.emitter()
    }

    pub fn pending_loads(&self) -> usize {
        self.pending_loads
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// How long the host may sleep before the next timer is due
    pub fn time_until_next(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }

    // === Players ===

    /// Add a panel and start loading its sequence in the background.
    ///
    /// The player stays inert until the load completes in a later pump.
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        source: SequenceSource,
        speed_ms: Option<u32>,
        surface: Box<dyn RenderSurface>,
        controls: Box<dyn ControlSurface>,
    ) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id += 1;

        let speed_ms = self.settings.clamp_speed(speed_ms.unwrap_or(self.settings.speed_ms));
        let player = Player::new(id, name, speed_ms, surface, controls);
        debug!("Adding {} ({}) from {}", id, player.name(), source.frames);
        self.players.insert(id, player);
        self.coordinator.add_member(id);
        // Joins a running session now; playback starts once loaded
        self.coordinator.adopt(id, &mut self.players, &mut self.scheduler);

        let loader = Arc::clone(&self.loader);
        let tx = self.completions_tx.clone();
        let count = self.settings.frame_count;
        self.workers.execute(move || {
            let result = loader.load(&source, count);
            let _ = tx.send(LoadCompletion { id, result });
        });
        self.pending_loads += 1;
        id
    }

    /// Remove a panel. Its timer is cancelled and the expanded view lets go of it.
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        if self.expanded.bound() == Some(id) {
            self.expanded.unbind(&mut self.scheduler);
        }
        self.coordinator.remove_member(id, &mut self.players, &mut self.scheduler);
        match self.players.shift_remove(&id) {
            Some(mut player) => {
                player.teardown(&mut self.scheduler);
                info!("Removed {} ({})", id, player.name());
                true
            }
            None => false,
        }
    }

    // === Intents ===

    /// Apply one intent now. Returns false when it was rejected or its target
    /// does not exist.
    pub fn apply(&mut self, intent: Intent) -> bool {
        trace!("Intent {:?}", intent);
        match intent {
            Intent::Player(id, transport) => {
                let transport = self.bounded(transport);
                match self.players.get_mut(&id) {
                    Some(player) => dispatch(player, transport, &mut self.scheduler),
                    None => {
                        warn!("Intent for unknown {}", id);
                        false
                    }
                }
            }
            Intent::Global(command) => self.apply_global(command),
            Intent::Expanded(command) => self.apply_expanded(command),
        }
    }

    fn apply_global(&mut self, command: GlobalCommand) -> bool {
        let players = &mut self.players;
        let sched = &mut self.scheduler;
        match command {
            GlobalCommand::Activate(speed_ms) => {
                let speed_ms = speed_ms.map(|ms| self.settings.clamp_speed(ms));
                self.coordinator.activate(speed_ms, players, sched);
                true
            }
            GlobalCommand::Deactivate => {
                self.coordinator.deactivate(players, sched);
                true
            }
            GlobalCommand::ShowCoverAll => {
                self.coordinator.show_cover_all(players, sched);
                true
            }
            GlobalCommand::SetSpeed(ms) => {
                let ms = bounded_speed(&self.settings, ms);
                self.coordinator.set_speed(ms, players, sched)
            }
            GlobalCommand::GoToFrame(index) => self.coordinator.go_to_frame(index, players, sched),
        }
    }

    fn apply_expanded(&mut self, command: ExpandedCommand) -> bool {
        match command {
            ExpandedCommand::Open(id) => match self.players.get(&id) {
                Some(player) => {
                    self.expanded.bind(player, &mut self.scheduler);
                    true
                }
                None => {
                    warn!("Cannot expand unknown {}", id);
                    false
                }
            },
            ExpandedCommand::Close => {
                self.expanded.unbind(&mut self.scheduler);
                true
            }
            ExpandedCommand::Resize { width, height } => {
                self.expanded.resize(width, height);
                true
            }
            ExpandedCommand::Transport(transport) => {
                let transport = self.bounded(transport);
                let Some(player) = self.expanded.bound().and_then(|id| self.players.get_mut(&id)) else {
                    debug!("Expanded view transport with nothing bound");
                    return false;
                };
                dispatch(player, transport, &mut self.scheduler)
            }
        }
    }

    /// Clamp speeds into the configured bounds
    fn bounded(&self, transport: Transport) -> Transport {
        match transport {
            Transport::SetSpeed(ms) => Transport::SetSpeed(bounded_speed(&self.settings, ms)),
            other => other,
        }
    }

    // === Event loop ===

    /// Process finished loads, queued intents and due timers.
    ///
    /// Returns the number of events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;

        while let Ok(completion) = self.completions_rx.try_recv() {
            self.install(completion);
            handled += 1;
        }

        for intent in self.bus.poll() {
            self.apply(intent);
            handled += 1;
        }

        while let Some((handle, target)) = self.scheduler.pop_due() {
            self.fire(handle, target);
            handled += 1;
        }
        handled
    }

    /// Block until every background load has been installed or `timeout`
    /// passes. Returns true when nothing is pending anymore.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending_loads > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.completions_rx.recv_timeout(left) {
                Ok(completion) => self.install(completion),
                Err(_) => {
                    warn!("{} loads still pending after {:?}", self.pending_loads, timeout);
                    return false;
                }
            }
        }
        true
    }

    fn install(&mut self, completion: LoadCompletion) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
        let LoadCompletion { id, result } = completion;
        let Some(player) = self.players.get_mut(&id) else {
            debug!("Dropping load for removed {}", id);
            return;
        };
        player.finish_loading(result);
        self.coordinator.adopt(id, &mut self.players, &mut self.scheduler);
    }

    fn fire(&mut self, handle: TaskHandle, target: TimerTarget) {
        match target {
            TimerTarget::Advance(id) => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.on_advance(handle, &mut self.scheduler);
                }
            }
            TimerTarget::GlobalTick => {
                self.coordinator.on_tick(handle, &mut self.players, &mut self.scheduler);
            }
            TimerTarget::Redraw => {
                let player = self.expanded.bound().and_then(|id| self.players.get(&id));
                self.expanded.on_redraw(handle, player, &mut self.scheduler);
            }
        }
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("players", &self.players.len())
            .field("coordinator", &self.coordinator)
            .field("expanded", &self.expanded)
            .field("scheduler", &self.scheduler)
            .field("pending_loads", &self.pending_loads)
            .finish()
    }
}

/// Zero stays zero so the player rejects it; anything else is clamped
fn bounded_speed(settings: &BoardSettings, ms: u32) -> u32 {
    if ms == 0 { 0 } else { settings.clamp_speed(ms) }
}

/// Route one transport call to a player
fn dispatch(player: &mut Player, transport: Transport, sched: &mut Scheduler) -> bool {
    match transport {
        Transport::Play => player.play(sched),
        Transport::Pause => player.pause(sched),
        Transport::Stop => player.stop(sched),
        Transport::ShowCover => player.show_cover(sched),
        Transport::GoToFrame(index) => player.go_to_frame(index, sched),
        Transport::SetSpeed(ms) => player.set_speed(ms, sched),
    }
}
