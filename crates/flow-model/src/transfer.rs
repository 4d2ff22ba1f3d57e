//! Pending transfer requests.

use flow_core::{EntityId, SimTime};

/// A queued move, waiting for its destination to have room and its operator
/// (if any) to be free.
///
/// Requests are held in insertion order; the engine's scheduling policy is
/// greedy, non-preemptive, FIFO-within-readiness.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferRequest {
    pub entity: EntityId,
    /// Origin location name.
    pub from: String,
    /// Destination location name.
    pub to: String,
    /// Required operator, or `None` for an immediate handoff.
    pub operator: Option<String>,
    pub queued_at: SimTime,
}
