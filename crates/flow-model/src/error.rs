//! Model-subsystem error type.
//!
//! Both variants are invariant violations, not expected runtime conditions:
//! under the dispatch loop's single-writer discipline neither should be
//! reachable, so call sites `debug_assert` and then degrade gracefully.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("operator {0:?} is already busy")]
    OperatorBusy(String),

    #[error("transport path needs at least two points, got {0}")]
    PathTooShort(usize),
}

pub type ModelResult<T> = Result<T, ModelError>;
