/*!
 * Error Types
 * Internal-consistency errors with thiserror, miette, and serde support
 *
 * Normal queue operation never fails: an empty queue or an expired wait is
 * reported as `None`. These errors describe broken invariants only, and are
 * surfaced by `FifoQueue::validate` and the wake handle.
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for queue consistency checks
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// Queue invariant violations
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum QueueError {
    #[error("Broken link at node {index}: {reason}")]
    #[diagnostic(
        code(queue::broken_link),
        help("A node's prev/next does not agree with its neighbour. FIFO order is no longer trustworthy.")
    )]
    BrokenLink { index: usize, reason: String },

    #[error("Endpoint mismatch: head={head:?}, tail={tail:?}, length={length}")]
    #[diagnostic(
        code(queue::endpoint_mismatch),
        help("head, tail and length must all be empty or all be non-empty.")
    )]
    EndpointMismatch {
        head: Option<usize>,
        tail: Option<usize>,
        length: usize,
    },

    #[error("Length mismatch: recorded {recorded}, counted {counted}")]
    #[diagnostic(
        code(queue::length_mismatch),
        help("The recorded length must equal the number of nodes reachable from head.")
    )]
    LengthMismatch { recorded: usize, counted: usize },

    #[error("Wake handle completed more than once")]
    #[diagnostic(
        code(queue::double_completion),
        help("A waiter must be taken out of its slot before it is signalled.")
    )]
    DoubleCompletion,
}
