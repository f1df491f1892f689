/*!
 * Queue Module
 * Unbounded FIFO queue with async and blocking waits
 *
 * - `list`: arena-backed doubly-linked node list
 * - `waiter`: one-shot wake handle
 * - `slot`: waiter registration (shared or fair)
 * - `fifo`: the public queue
 */

mod fifo;
mod list;
mod slot;
mod types;
mod waiter;

pub use fifo::FifoQueue;
pub use types::QueueStats;
