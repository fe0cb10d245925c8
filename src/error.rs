//! Error taxonomy for the solver.
//!
//! Most of the outcomes this crate treats as "non-fatal" (infeasible input, no
//! solutions, budget reached) are represented as `Ok` values carrying a
//! structured result and a literal message, not as `Err`. Only programmer-
//! visible invariant breaks and malformed construction inputs use this type.

use thiserror::Error;

/// Errors the solver can return.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Construction-time input is malformed: duplicate piece ids, a
    /// reserved id of `0`, an empty piece shape, or non-positive board
    /// dimensions.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A Dancing-Links invariant was violated (cover/uncover asymmetry, a
    /// corrupt link). This should never happen from valid input; it
    /// indicates a bug in this crate, not the caller.
    #[error("internal invariant violation: {0}")]
    Invariant(String),

    /// A session key used with `session_next_batch`/`delete_session` has
    /// no live session. Callers should treat this as "must initialize
    /// first", not retry blindly.
    #[error("no live session for key {0:?}")]
    SessionNotFound(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;
