//! Synchronous publish/subscribe bus
//!
//! Handlers run on the publishing thread, in subscription order, before
//! `trigger_event` returns. A handler may raise follow-up events through the
//! [`Emit`] it receives; those are delivered after the current event's
//! handlers finish, still inside the same `trigger_event` call.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::pool::KindId;

/// Event names used by gameplay code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// A spawned object left the playfield without being destroyed
    EnemyMissed,
    /// A spawned object was destroyed by the player
    EnemyKilled,
    /// Player picked up a heart
    HeartCollected,
    /// Player lost a life (`count` carries lives remaining)
    LifeLost,
    /// An object was taken from the pool and placed in the world
    BlockerSpawned,
    /// No lives left
    GameOver,
}

/// Payload carried by [`GameEvent`]s
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventArgs {
    pub kind: Option<KindId>,
    pub pos: Option<Vec2>,
    pub count: i32,
}

impl EventArgs {
    pub fn at(kind: KindId, pos: Vec2) -> Self {
        Self {
            kind: Some(kind),
            pos: Some(pos),
            count: 0,
        }
    }

    pub fn count(count: i32) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }
}

pub type GameBus = EventBus<GameEvent, EventArgs>;

/// Subscription token returned by [`EventBus::start_listening`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Follow-up events raised from inside a handler
#[derive(Debug)]
pub struct Emit<E, P> {
    queued: Vec<(E, P)>,
}

impl<E, P> Emit<E, P> {
    pub fn trigger(&mut self, event: E, payload: P) {
        self.queued.push((event, payload));
    }
}

type Handler<E, P> = Box<dyn FnMut(&P, &mut Emit<E, P>)>;

pub struct EventBus<E, P> {
    listeners: HashMap<E, Vec<(ListenerId, Handler<E, P>)>>,
    next_id: u64,
}

impl<E: Copy + Eq + Hash + std::fmt::Debug, P> EventBus<E, P> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn start_listening(
        &mut self,
        event: E,
        handler: impl FnMut(&P, &mut Emit<E, P>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Returns false when `id` was not subscribed to `event`
    pub fn stop_listening(&mut self, event: E, id: ListenerId) -> bool {
        let Some(handlers) = self.listeners.get_mut(&event) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(listener, _)| *listener != id);
        before != handlers.len()
    }

    /// Deliver `event` and any follow-ups; returns how many handler calls ran
    pub fn trigger_event(&mut self, event: E, payload: P) -> usize {
        let mut pending = VecDeque::from([(event, payload)]);
        let mut calls = 0;

        while let Some((event, payload)) = pending.pop_front() {
            log::trace!("event {:?}", event);
            let Some(handlers) = self.listeners.get_mut(&event) else {
                continue;
            };
            let mut emit = Emit { queued: Vec::new() };
            for (_, handler) in handlers.iter_mut() {
                handler(&payload, &mut emit);
                calls += 1;
            }
            pending.extend(emit.queued);
        }
        calls
    }

    pub fn listener_count(&self, event: E) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E: Copy + Eq + Hash + std::fmt::Debug, P> Default for EventBus<E, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: std::fmt::Debug, P> std::fmt::Debug for EventBus<E, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.listeners.iter().map(|(e, hs)| (e, hs.len())))
            .finish()
    }
}
