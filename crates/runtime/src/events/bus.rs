//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use combat_core::{BattleError, BattleId, BattleType, CombatAction, CombatActionResult, GridDimensions};

use super::types::BattleEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Resolved and rejected actions, plus their combat effects
    Combat,
    /// Battle creation, joins, start, pause and end
    Lifecycle,
    /// Turn ends, readiness and round resets
    Turn,
}

/// Event published on the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    BattleCreated {
        battle: BattleId,
        battle_type: BattleType,
        dimensions: GridDimensions,
    },
    /// A single engine event, in resolution order.
    Battle(BattleEvent),
    /// Full outcome record of a resolved action. Published before the
    /// action's individual engine events.
    ActionResolved {
        battle: BattleId,
        result: CombatActionResult,
    },
    ActionRejected {
        battle: BattleId,
        action: CombatAction,
        error: BattleError,
    },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::BattleCreated { .. } => Topic::Lifecycle,
            Event::Battle(event) => event.topic(),
            Event::ActionResolved { .. } | Event::ActionRejected { .. } => Topic::Combat,
        }
    }

    pub fn battle(&self) -> BattleId {
        match self {
            Event::BattleCreated { battle, .. }
            | Event::ActionResolved { battle, .. }
            | Event::ActionRejected { battle, .. } => *battle,
            Event::Battle(event) => event.battle,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

struct Channels {
    combat: broadcast::Sender<Event>,
    lifecycle: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Combat => &self.combat,
            Topic::Lifecycle => &self.lifecycle,
            Topic::Turn => &self.turn,
        }
    }
}

/// Topic-based event bus
///
/// Every topic has its own broadcast channel, created up front. Publishing
/// never blocks; events sent while a topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a bus with the given capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                combat: broadcast::channel(capacity).0,
                lifecycle: broadcast::channel(capacity).0,
                turn: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its topic.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            tracing::trace!(?topic, "no subscribers for topic");
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
