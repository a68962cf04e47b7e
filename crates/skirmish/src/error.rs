//! Unified error type for the Skirmish crates.

use skirmish_arena::{ArenaError, CollaboratorError};
use skirmish_types::TypesError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attributes let `?` convert sub-crate errors, so code built
/// on the `skirmish` meta crate only has to name this one type.
#[derive(Debug, thiserror::Error)]
pub enum SkirmishError {
    /// A value could not be built (wrong team size, empty slot).
    #[error(transparent)]
    Types(#[from] TypesError),

    /// An arena operation was refused or the arena is gone.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// A collaborator implementation failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
