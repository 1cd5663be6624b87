//! Common error infrastructure for combat-core.
//!
//! Concrete error enums live next to the code that raises them
//! ([`crate::ActionError`] with the action pipeline, [`crate::BattleError`]
//! with the engine, [`crate::GridError`] with the grid). This module holds
//! the classification shared by all of them.
//!
//! Every combat error is caller input that the battle refused. None of them
//! is transient, so none of them is worth retrying unchanged.

/// Broad class of a combat error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// The action itself is malformed or unaffordable. Rejected before any
    /// mutation.
    Validation,

    /// The battle is in a lifecycle state that does not allow the operation.
    State,

    /// A referenced battle, participant, character or item does not exist.
    NotFound,

    /// A state inconsistency detected mid-resolution. The battle is restored
    /// to its pre-action snapshot; seeing this indicates a bug.
    Internal,
}

impl ErrorCategory {
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all combat-core errors.
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn category(&self) -> ErrorCategory;

    /// Stable identifier for logs, metrics and wire responses.
    fn error_code(&self) -> &'static str;

    /// Combat errors never succeed when retried unchanged.
    fn is_retryable(&self) -> bool {
        false
    }
}
