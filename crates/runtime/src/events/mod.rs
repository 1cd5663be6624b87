//! Topic-based event bus for runtime events.
//!
//! Battle workers publish every engine event to the topic it belongs to, so
//! consumers can subscribe only to what they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::BattleEvent;
