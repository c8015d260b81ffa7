//! Life total, driven entirely by bus events
//!
//! `EnemyMissed` costs a life and raises `LifeLost` (then `GameOver` at zero).
//! `HeartCollected` restores one, up to the cap.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::events::{EventArgs, GameBus, GameEvent, ListenerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lives {
    pub current: u8,
    pub max: u8,
}

#[derive(Debug)]
pub struct LifeTracker {
    lives: Rc<RefCell<Lives>>,
    listeners: Vec<(GameEvent, ListenerId)>,
}

impl LifeTracker {
    /// Subscribe to the bus. `max` is raised to `starting` if lower.
    pub fn attach(bus: &mut GameBus, starting: u8, max: u8) -> Self {
        let lives = Rc::new(RefCell::new(Lives {
            current: starting,
            max: max.max(starting),
        }));

        let on_missed = {
            let lives = lives.clone();
            bus.start_listening(GameEvent::EnemyMissed, move |_, emit| {
                let mut lives = lives.borrow_mut();
                if lives.current == 0 {
                    return;
                }
                lives.current -= 1;
                log::debug!("Life lost, {} left", lives.current);
                emit.trigger(GameEvent::LifeLost, EventArgs::count(lives.current.into()));
                if lives.current == 0 {
                    emit.trigger(GameEvent::GameOver, EventArgs::default());
                }
            })
        };

        let on_heart = {
            let lives = lives.clone();
            bus.start_listening(GameEvent::HeartCollected, move |_, _| {
                let mut lives = lives.borrow_mut();
                if lives.current > 0 && lives.current < lives.max {
                    lives.current += 1;
                }
            })
        };

        Self {
            lives,
            listeners: vec![
                (GameEvent::EnemyMissed, on_missed),
                (GameEvent::HeartCollected, on_heart),
            ],
        }
    }

    pub fn lives(&self) -> Lives {
        *self.lives.borrow()
    }

    pub fn is_game_over(&self) -> bool {
        self.lives.borrow().current == 0
    }

    /// Unsubscribe from the bus; the last known total is returned
    pub fn detach(self, bus: &mut GameBus) -> Lives {
        for (event, id) in &self.listeners {
            bus.stop_listening(*event, *id);
        }
        self.lives()
    }
}
