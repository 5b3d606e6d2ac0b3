//! Host-emulated device backend.
//!
//! Priority P0: always available, used by tests, benches and CPU-only builds.
//!
//! A [`HostStream`] keeps the observable contract of an accelerator stream:
//! - operations run in issue order, lazily, when the stream drains
//! - a device-to-host copy observes exactly the operations queued before it
//! - a failing operation discards the work queued behind it, and its error
//!   is reported once, by the next [`ExecutionStream::synchronize`]
//!
//! Queued operations run while the stream is locked, so they must not
//! enqueue onto or synchronize the stream that runs them.

use crate::stream::{DeviceBuffer, EnqueueCopy, ExecutionStream};
use nrc_core::{DeviceElement, DeviceOperationError, DevicePrimitive, DeviceResult, byte_len};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type HostOp = Box<dyn FnOnce() -> Result<(), String> + Send>;

/// Emulated accelerator identified by an ordinal.
///
/// Buffers and streams remember the ordinal they were created with; copies
/// between different ordinals are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostDevice {
    ordinal: usize,
}

impl HostDevice {
    /// Create device `ordinal`.
    pub fn new(ordinal: usize) -> Self {
        Self { ordinal }
    }

    /// Device ordinal.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Create a new, empty stream on this device.
    pub fn new_stream(&self, name: &str) -> HostStream {
        let label = format!("host:{}/{name}", self.ordinal);
        log::debug!("created stream {label}");
        HostStream {
            ordinal: self.ordinal,
            label,
            state: Mutex::new(StreamState {
                pending: VecDeque::new(),
                deferred_error: None,
                stats: StreamStats::default(),
            }),
        }
    }

    /// Allocate `len` zero-initialised (default) elements.
    pub fn alloc_zeros<T: DeviceElement>(&self, len: usize) -> HostBuffer<T> {
        self.upload(&vec![T::default(); len])
    }

    /// Allocate a buffer holding a copy of `data`.
    pub fn upload<T: DeviceElement>(&self, data: &[T]) -> HostBuffer<T> {
        HostBuffer { ordinal: self.ordinal, data: Arc::new(RwLock::new(data.to_vec())) }
    }
}

/// Emulated device memory.
///
/// Cloning yields another handle to the same storage.
#[derive(Debug)]
pub struct HostBuffer<T> {
    ordinal: usize,
    data: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for HostBuffer<T> {
    fn clone(&self) -> Self {
        Self { ordinal: self.ordinal, data: Arc::clone(&self.data) }
    }
}

impl<T: DeviceElement> HostBuffer<T> {
    /// Ordinal of the device owning this buffer.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: DeviceElement> DeviceBuffer<T> for HostBuffer<T> {
    fn len(&self) -> usize {
        self.read().len()
    }
}

nrc_core::properties! {
    /// Counters describing the work a [`HostStream`] has done.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StreamStats {
        /// Queued operations that ran to completion.
        ro ops_executed: u64 = 0,
        /// Queued operations that failed.
        ro ops_failed: u64 = 0,
        /// Queued operations dropped behind a failure.
        ro ops_discarded: u64 = 0,
        /// Device-to-host copies performed.
        ro copies_to_host: u64 = 0,
        /// Bytes moved by device-to-host copies.
        ro bytes_to_host: u64 = 0,
        /// Calls to `synchronize`.
        ro synchronizations: u64 = 0,
    }
}

struct StreamState {
    pending: VecDeque<HostOp>,
    deferred_error: Option<String>,
    stats: StreamStats,
}

impl StreamState {
    /// Run queued operations in issue order.
    ///
    /// After a failure, everything still queued (and anything queued before
    /// the failure is reported) is discarded.
    fn drain(&mut self) {
        while let Some(op) = self.pending.pop_front() {
            if self.deferred_error.is_some() {
                self.stats.ops_discarded += 1;
                continue;
            }
            match op() {
                Ok(()) => self.stats.ops_executed += 1,
                Err(cause) => {
                    self.stats.ops_failed += 1;
                    self.deferred_error = Some(cause);
                }
            }
        }
    }
}

/// Emulated in-order execution stream.
pub struct HostStream {
    ordinal: usize,
    label: String,
    state: Mutex<StreamState>,
}

impl HostStream {
    /// Ordinal of the device this stream belongs to.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Queue an arbitrary operation. An `Err` is reported by the next `synchronize`.
    pub fn enqueue<F>(&self, op: F)
    where
        F: FnOnce() -> Result<(), String> + Send + 'static,
    {
        self.lock().pending.push_back(Box::new(op));
    }

    /// Queue an overwrite of `dst` with `data` (lengths must match when it runs).
    pub fn enqueue_write<T: DeviceElement>(
        &self,
        dst: &HostBuffer<T>,
        data: Vec<T>,
    ) -> DeviceResult<()> {
        self.check_ordinal(dst.ordinal, DevicePrimitive::EnqueueWrite)?;
        let dst = dst.clone();
        self.enqueue(move || {
            let mut guard = dst.write();
            if guard.len() != data.len() {
                return Err(format!(
                    "write of {} elements into a buffer of {}",
                    data.len(),
                    guard.len()
                ));
            }
            guard.copy_from_slice(&data);
            Ok(())
        });
        Ok(())
    }

    /// Queue a fill of every element of `dst` with `value`.
    pub fn enqueue_fill<T: DeviceElement>(
        &self,
        dst: &HostBuffer<T>,
        value: T,
    ) -> DeviceResult<()> {
        self.check_ordinal(dst.ordinal, DevicePrimitive::EnqueueWrite)?;
        let dst = dst.clone();
        self.enqueue(move || {
            dst.write().fill(value);
            Ok(())
        });
        Ok(())
    }

    /// Number of operations queued but not yet run.
    pub fn pending_ops(&self) -> usize {
        self.lock().pending.len()
    }

    /// Snapshot of the stream counters.
    pub fn stats(&self) -> StreamStats {
        self.lock().stats
    }

    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_ordinal(&self, ordinal: usize, primitive: DevicePrimitive) -> DeviceResult<()> {
        if ordinal == self.ordinal {
            Ok(())
        } else {
            Err(DeviceOperationError::new(
                primitive,
                format!(
                    "device/host mismatch: buffer on device {ordinal}, stream {} on device {}",
                    self.label, self.ordinal
                ),
            ))
        }
    }
}

impl ExecutionStream for HostStream {
    fn synchronize(&self) -> DeviceResult<()> {
        let mut state = self.lock();
        state.drain();
        state.stats.synchronizations += 1;
        match state.deferred_error.take() {
            None => Ok(()),
            Some(cause) => {
                log::warn!("stream {} reported a deferred failure: {cause}", self.label);
                Err(DeviceOperationError::new(DevicePrimitive::Synchronize, cause))
            }
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl<T: DeviceElement> EnqueueCopy<T, HostBuffer<T>> for HostStream {
    fn enqueue_copy_to_host(&self, src: &HostBuffer<T>, dst: &mut [T]) -> DeviceResult<()> {
        self.check_ordinal(src.ordinal, DevicePrimitive::EnqueueCopy)?;
        let bytes = byte_len::<T>(dst.len())?;

        let mut state = self.lock();
        state.drain();
        if state.deferred_error.is_some() {
            // The copy sits behind a failed operation; synchronize reports it.
            return Ok(());
        }

        let data = src.read();
        if dst.len() > data.len() {
            return Err(DeviceOperationError::new(
                DevicePrimitive::EnqueueCopy,
                format!("copy of {} elements from a buffer of {}", dst.len(), data.len()),
            ));
        }
        dst.copy_from_slice(&data[..dst.len()]);
        state.stats.copies_to_host += 1;
        state.stats.bytes_to_host += bytes as u64;
        Ok(())
    }
}
