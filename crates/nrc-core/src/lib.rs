//! # nrc-core
//!
//! Core types for NRC.
//!
//! This crate holds everything that does not depend on an accelerator
//! runtime:
//! - the device error taxonomy ([`DeviceOperationError`], [`Error`])
//! - the host/device element marker ([`DeviceElement`])
//! - declarative accessor generation ([`properties!`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod property;
pub mod types;

pub use error::{DeviceOperationError, DevicePrimitive, DeviceResult, Error, Result};
pub use types::{DeviceElement, byte_len};

#[doc(hidden)]
pub use paste;
