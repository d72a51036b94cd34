//! Intent queue between control surfaces and the board.
//!
//! Architecture:
//! - Surfaces hold a cloneable [`IntentEmitter`] and call `emit()` from any thread
//! - The board drains the queue with `poll()` once per pump, on its own thread
//! - Order is FIFO across all emitters
//!
//! Deferred processing keeps every player mutation on the board's thread, so
//! a surface can never observe or cause a half-applied transition.

use std::sync::{Arc, Mutex};

use log::warn;

use super::player_events::Intent;

/// Maximum intents in queue before oldest are evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// Owning side of the queue, held by the board
#[derive(Clone, Default)]
pub struct IntentBus {
    queue: Arc<Mutex<Vec<Intent>>>,
}

impl IntentBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an emitter handle for passing to surfaces.
    pub fn emitter(&self) -> IntentEmitter {
        IntentEmitter {
            queue: Arc::clone(&self.queue),
        }
    }

    pub fn emit(&self, intent: Intent) {
        push(&self.queue, intent);
    }

    /// Take all queued intents in emission order.
    pub fn poll(&self) -> Vec<Intent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Lightweight emitter handle for control surfaces.
#[derive(Clone)]
pub struct IntentEmitter {
    queue: Arc<Mutex<Vec<Intent>>>,
}

impl std::fmt::Debug for IntentEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentEmitter")
            .field("queue_len", &self.queue.lock().map(|q| q.len()).unwrap_or(0))
            .finish()
    }
}

impl IntentEmitter {
    pub fn emit(&self, intent: Intent) {
        push(&self.queue, intent);
    }
}

fn push(queue: &Mutex<Vec<Intent>>, intent: Intent) {
    let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
    if queue.len() >= MAX_QUEUE_SIZE {
        let evict_count = queue.len() / 2;
        warn!("Intent queue full ({} intents), evicting oldest {}", queue.len(), evict_count);
        queue.drain(0..evict_count);
    }
    queue.push(intent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player_events::{GlobalCommand, Transport};
    use crate::entities::PlayerId;

    #[test]
    fn test_poll_returns_fifo_and_drains() {
        let bus = IntentBus::new();
        bus.emit(Intent::Player(PlayerId(1), Transport::Play));
        bus.emit(Intent::Global(GlobalCommand::ShowCoverAll));

        let intents = bus.poll();
        assert_eq!(
            intents,
            vec![
                Intent::Player(PlayerId(1), Transport::Play),
                Intent::Global(GlobalCommand::ShowCoverAll),
            ]
        );
        assert!(bus.poll().is_empty());
    }

    #[test]
    fn test_emitter_shares_queue_across_threads() {
        let bus = IntentBus::new();
        let emitter = bus.emitter();

        std::thread::spawn(move || {
            emitter.emit(Intent::Player(PlayerId(2), Transport::Pause));
        })
        .join()
        .unwrap();

        assert_eq!(bus.queue_len(), 1);
        assert_eq!(bus.poll(), vec![Intent::Player(PlayerId(2), Transport::Pause)]);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let bus = IntentBus::new();
        for i in 0..MAX_QUEUE_SIZE as i64 + 1 {
            bus.emit(Intent::Global(GlobalCommand::GoToFrame(i)));
        }
        let intents = bus.poll();
        assert_eq!(intents.len(), MAX_QUEUE_SIZE / 2 + 1);
        assert_eq!(intents.last(), Some(&Intent::Global(GlobalCommand::GoToFrame(MAX_QUEUE_SIZE as i64))));
    }
}
