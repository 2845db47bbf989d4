//! First-class invariants for four-in-a-row.
//!
//! Invariants are logical properties that must hold after every placement.
//! The engine asserts them in debug builds; they can also be checked directly.

pub mod gravity;
pub mod history_consistent;

pub use gravity::GravityInvariant;
pub use history_consistent::HistoryConsistentInvariant;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants checked together.
pub trait InvariantSet<S> {
    /// Returns every violated invariant, or `Ok(())` when all hold.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// All engine invariants as a composable set.
pub type EngineInvariants = (GravityInvariant, HistoryConsistentInvariant);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameEngine, Marker};

    #[test]
    fn test_invariant_set_holds_for_new_engine() {
        assert!(EngineInvariants::check_all(&GameEngine::new()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_moves() {
        let mut engine = GameEngine::new();
        for (col, marker) in [(3, Marker::X), (3, Marker::O), (4, Marker::X), (2, Marker::O)] {
            engine.place(col, marker).unwrap();
        }
        assert!(EngineInvariants::check_all(&engine).is_ok());
    }
}
