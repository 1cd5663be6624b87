use std::sync::Arc;

use tracing::{debug, warn};

use combat_core::{BattleId, CombatEvent};

use super::{CombatObserver, ObserverCriticality};

/// Ordered set of observers shared by all battle workers.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Arc<[Arc<dyn CombatObserver>]>,
}

impl ObserverRegistry {
    pub fn new(mut observers: Vec<Arc<dyn CombatObserver>>) -> Self {
        observers.sort_by_key(|observer| observer.priority());
        Self {
            observers: observers.into(),
        }
    }

    /// Delivers each event to every observer, event by event.
    pub fn notify(&self, battle: BattleId, events: &[CombatEvent]) {
        for event in events {
            for observer in self.observers.iter() {
                if let Err(error) = observer.on_event(battle, event) {
                    match observer.criticality() {
                        ObserverCriticality::Important => warn!(
                            target: "runtime::observers",
                            observer = observer.name(),
                            %battle,
                            %error,
                            "observer failed"
                        ),
                        ObserverCriticality::Optional => debug!(
                            target: "runtime::observers",
                            observer = observer.name(),
                            %battle,
                            %error,
                            "optional observer failed"
                        ),
                    }
                }
            }
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.observers.iter().map(|observer| observer.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
