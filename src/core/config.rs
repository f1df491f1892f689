/*!
 * Queue Configuration
 *
 * Runtime configuration for wake-up policy selection
 */

use super::limits::WAKE_POLICY_ENV;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How waiting consumers are woken by `put`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakePolicy {
    /// One handle shared by every waiter; each `put` wakes all of them and
    /// they race to re-check the queue
    #[default]
    Shared,
    /// One handle per waiter, woken oldest first, one per `put`
    Fair,
}

impl WakePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Fair => "fair",
        }
    }
}

impl FromStr for WakePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "fair" => Ok(Self::Fair),
            other => Err(format!("unknown wake policy: {}", other)),
        }
    }
}

/// Queue configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Waiter wake-up policy
    pub wake_policy: WakePolicy,
    /// Emit a trace event for every put/get (very noisy)
    pub trace_operations: bool,
}

impl QueueConfig {
    /// Single shared waiter slot
    pub const fn shared() -> Self {
        Self {
            wake_policy: WakePolicy::Shared,
            trace_operations: false,
        }
    }

    /// Per-waiter handles, oldest waiter first
    pub const fn fair() -> Self {
        Self {
            wake_policy: WakePolicy::Fair,
            trace_operations: false,
        }
    }

    /// Enable per-operation trace events
    pub const fn with_trace_operations(mut self, enabled: bool) -> Self {
        self.trace_operations = enabled;
        self
    }

    /// Build from environment variables, falling back to defaults
    ///
    /// Environment variables:
    /// - FIFO_WAKE_POLICY: `shared` (default) or `fair`
    pub fn from_env() -> Self {
        let wake_policy = std::env::var(WAKE_POLICY_ENV)
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(policy) => Some(policy),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring {}", WAKE_POLICY_ENV);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            wake_policy,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_is_shared() {
        let config = QueueConfig::default();
        assert_eq!(config.wake_policy, WakePolicy::Shared);
        assert!(!config.trace_operations);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("fair".parse::<WakePolicy>(), Ok(WakePolicy::Fair));
        assert_eq!(" Shared ".parse::<WakePolicy>(), Ok(WakePolicy::Shared));
        assert!("lifo".parse::<WakePolicy>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(WAKE_POLICY_ENV, "fair");
        assert_eq!(QueueConfig::from_env().wake_policy, WakePolicy::Fair);

        std::env::set_var(WAKE_POLICY_ENV, "bogus");
        assert_eq!(QueueConfig::from_env().wake_policy, WakePolicy::Shared);

        std::env::remove_var(WAKE_POLICY_ENV);
        assert_eq!(QueueConfig::from_env().wake_policy, WakePolicy::Shared);
    }
}
