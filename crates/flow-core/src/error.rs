//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `FlowError` via `From` impls or stay separate; prefer whichever keeps
//! error sites clean.  Expected runtime conditions (capacity denial, JOIN
//! under-supply, unknown names at dispatch time) are *not* errors anywhere in
//! the framework — they are recovered locally and at most logged.

use thiserror::Error;

/// The top-level error type for `flow-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `flow-*` crates.
pub type FlowResult<T> = Result<T, FlowError>;
