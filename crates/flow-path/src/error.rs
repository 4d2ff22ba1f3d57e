//! Path-subsystem error type.

use thiserror::Error;

use flow_core::NodeId;

/// Errors produced by `flow-path`.
///
/// Both variants are *recoverable* from the engine's point of view: a failed
/// path query makes the caller fall back to a straight-line distance
/// estimate, it never aborts a transfer.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("location {0:?} is not bound to a network node")]
    UnknownLocation(String),

    #[error("no path from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },
}

pub type PathResult<T> = Result<T, PathError>;
