//! Engine error type.
//!
//! Builder-time validation errors only.  At dispatch time the engine never
//! fails: expected conditions (full buffers, under-supplied joins, unknown
//! arrival types) are recovered locally and logged, per the framework's
//! error discipline.

use flow_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine configuration error: {0}")]
    Config(String),

    #[error("duplicate location {0:?}")]
    DuplicateLocation(String),

    #[error("route for {route:?} references unknown station {station:?}")]
    UnknownStation { route: String, station: String },

    #[error("location {location:?} names unknown operator {operator:?}")]
    UnknownOperator { location: String, operator: String },

    #[error("join/location mismatch at {0:?}")]
    JoinMismatch(String),

    #[error("{referenced_by} produces {entity_type:?} which has no route")]
    MissingRoute { entity_type: String, referenced_by: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type EngineResult<T> = Result<T, EngineError>;
