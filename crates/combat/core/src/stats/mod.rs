//! Character stat model: attributes, styles, ranks and elements.

mod attributes;
mod element;

pub use attributes::{CombatAttributes, CombatStyle, MedicalRank, Rank};
pub use element::{Affinity, Element, apply_elemental};
