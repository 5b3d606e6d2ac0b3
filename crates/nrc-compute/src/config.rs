//! Device configuration.
//!
//! Settings come from JSON (all keys optional, unknown keys rejected) and can
//! be overridden by environment variables:
//! - `NRC_CUDA_DEVICE`: device ordinal (`usize`)
//! - `NRC_DEVICE_FAILURE`: `panic` or `abort`

use crate::FailurePolicy;
use nrc_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable selecting the device ordinal.
pub const ENV_DEVICE: &str = "NRC_CUDA_DEVICE";
/// Environment variable selecting the failure policy.
pub const ENV_FAILURE: &str = "NRC_DEVICE_FAILURE";

nrc_core::properties! {
    /// Which device to use and how fail-fast call sites react to errors.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub struct DeviceConfig {
        /// Device ordinal.
        rw device_id: usize = 0,
        /// Reaction of `check_or_abort` to a device error.
        rw failure_policy: FailurePolicy = FailurePolicy::Panic,
    }
}

impl DeviceConfig {
    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Apply `NRC_CUDA_DEVICE` / `NRC_DEVICE_FAILURE` when set.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(ENV_DEVICE).ok().as_deref(),
            std::env::var(ENV_FAILURE).ok().as_deref(),
        )
    }

    fn with_overrides(mut self, device: Option<&str>, failure: Option<&str>) -> Result<Self> {
        if let Some(raw) = device {
            self.device_id = raw.trim().parse().map_err(|_| {
                Error::Validation(format!("{ENV_DEVICE}: expected a device ordinal, got {raw:?}"))
            })?;
        }
        if let Some(raw) = failure {
            self.failure_policy = raw.parse()?;
        }
        Ok(self)
    }

    /// Install this config's failure policy process-wide.
    pub fn apply(&self) {
        crate::set_failure_policy(self.failure_policy);
    }
}
