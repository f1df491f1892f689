/*!
 * Core Module
 * Configuration, limits, and error handling shared by the queue
 */

pub mod config;
pub mod errors;
pub mod limits;

// Re-export for convenience
pub use config::{QueueConfig, WakePolicy};
pub use errors::{QueueError, QueueResult};
