//! # nrc-compute
//!
//! Device-to-host snapshot utilities for NRC.
//!
//! This crate provides:
//! - **Stream traits** ([`stream`]): the minimal runtime surface a snapshot needs
//! - **Host backend** ([`host`]): in-process emulation, always available
//! - **CUDA backend** (`cuda`): NVIDIA streams via `cudarc`, feature-gated
//! - **Snapshot** ([`snapshot`]): copy a device buffer to the host and drain the stream
//!
//! ## Error handling
//!
//! Every device operation returns [`nrc_core::DeviceResult`]. Call sites that
//! cannot continue after a device failure use [`check_or_abort`] (or the
//! [`check_data!`] macro), whose reaction is governed by the process-wide
//! [`FailurePolicy`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod host;
pub mod snapshot;
pub mod stream;

#[cfg(feature = "cuda")]
pub mod cuda;

pub use config::DeviceConfig;
pub use host::{HostBuffer, HostDevice, HostStream, StreamStats};
pub use snapshot::{snapshot, snapshot_all, snapshot_or_abort};
pub use stream::{DeviceBuffer, EnqueueCopy, ExecutionStream};

use nrc_core::{DeviceResult, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Reaction of fail-fast call sites to a device error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Panic with the diagnostic. Default.
    ///
    /// Unwinds like any other panic, so tests and `catch_unwind` can observe it.
    Panic = 0,
    /// Log the diagnostic and abort the process immediately.
    Abort = 1,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(FailurePolicy::Panic),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(Error::Validation(format!(
                "unknown failure policy {other:?} (expected \"panic\" or \"abort\")"
            ))),
        }
    }
}

static FAILURE_POLICY: AtomicU8 = AtomicU8::new(0); // 0 = Panic

/// Set the process-wide failure policy used by [`check_or_abort`].
pub fn set_failure_policy(policy: FailurePolicy) {
    FAILURE_POLICY.store(policy as u8, Ordering::Relaxed);
}

/// Get the current failure policy.
pub fn failure_policy() -> FailurePolicy {
    match FAILURE_POLICY.load(Ordering::Relaxed) {
        1 => FailurePolicy::Abort,
        _ => FailurePolicy::Panic,
    }
}

/// Unwrap a device result, failing fast on error.
///
/// The error is logged first, then the process panics or aborts according
/// to [`failure_policy`]. Never returns on error.
#[track_caller]
pub fn check_or_abort<T>(result: DeviceResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            log::error!("{err}");
            match failure_policy() {
                FailurePolicy::Panic => panic!("{err}"),
                FailurePolicy::Abort => std::process::abort(),
            }
        }
    }
}
