//! Error types for the shared types layer.

/// Errors raised while validating shared data.
///
/// These only cover structural problems with data handed in from the
/// outside, such as a battle group of the wrong size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// The battle group does not have exactly the required number of slots.
    #[error("battle group has {actual} slots, expected {expected}")]
    WrongTeamSize { expected: usize, actual: usize },

    /// A slot still holds the empty sentinel.
    #[error("battle group slot {index} is empty")]
    EmptySlot { index: usize },
}
