//! CUDA execution streams (NVIDIA).
//!
//! Feature-gated behind `cuda`. Wraps a `cudarc` stream so device buffers
//! (`CudaSlice<T>`) can be snapshotted through the generic [`crate::snapshot`]
//! path.

use crate::config::DeviceConfig;
use crate::stream::{DeviceBuffer, EnqueueCopy, ExecutionStream};
use cudarc::driver::{CudaContext, CudaSlice, CudaStream, DeviceRepr, ValidAsZeroBits};
use nrc_core::{DeviceElement, DeviceOperationError, DevicePrimitive, DeviceResult};
use std::sync::Arc;

fn cuda_err(primitive: DevicePrimitive, msg: impl std::fmt::Display) -> DeviceOperationError {
    DeviceOperationError::new(primitive, format!("CUDA: {msg}"))
}

/// Stream on a CUDA device.
pub struct CudaExecStream {
    ctx: Arc<CudaContext>,
    stream: Arc<CudaStream>,
    label: String,
}

impl CudaExecStream {
    /// Check if CUDA is available at runtime (driver loaded, GPU present).
    pub fn is_available() -> bool {
        std::panic::catch_unwind(|| CudaContext::new(0).is_ok()).unwrap_or(false)
    }

    /// Default stream of device `device_id`.
    pub fn new(device_id: usize) -> DeviceResult<Self> {
        let ctx = Self::context(device_id)?;
        let stream = ctx.default_stream();
        Ok(Self::wrap(ctx, stream, device_id, "default"))
    }

    /// Fresh non-default stream on device `device_id`.
    pub fn forked(device_id: usize) -> DeviceResult<Self> {
        let ctx = Self::context(device_id)?;
        let stream = ctx
            .new_stream()
            .map_err(|e| cuda_err(DevicePrimitive::Context, format!("new stream: {e}")))?;
        Ok(Self::wrap(ctx, stream, device_id, "forked"))
    }

    /// Default stream of the device selected by `config`.
    pub fn from_config(config: &DeviceConfig) -> DeviceResult<Self> {
        Self::new(config.get_device_id())
    }

    fn context(device_id: usize) -> DeviceResult<Arc<CudaContext>> {
        match std::panic::catch_unwind(|| CudaContext::new(device_id)) {
            Ok(Ok(ctx)) => Ok(ctx),
            Ok(Err(e)) => Err(cuda_err(
                DevicePrimitive::Context,
                format!("context (device {device_id}): {e}"),
            )),
            Err(_) => Err(cuda_err(
                DevicePrimitive::Context,
                "context: CUDA driver library not available",
            )),
        }
    }

    fn wrap(ctx: Arc<CudaContext>, stream: Arc<CudaStream>, device_id: usize, kind: &str) -> Self {
        let label = format!("cuda:{device_id}/{kind}");
        log::debug!("created stream {label}");
        Self { ctx, stream, label }
    }

    /// Underlying `cudarc` stream, for launching kernels that feed snapshots.
    pub fn stream(&self) -> &Arc<CudaStream> {
        &self.stream
    }

    /// Device ordinal.
    pub fn ordinal(&self) -> usize {
        self.ctx.ordinal()
    }

    /// Allocate a device buffer holding a copy of `data` (Host → Device).
    pub fn upload<T: DeviceElement + DeviceRepr>(&self, data: &[T]) -> DeviceResult<CudaSlice<T>> {
        self.stream.clone_htod(data).map_err(|e| cuda_err(DevicePrimitive::Allocate, e))
    }

    /// Allocate `len` zeroed elements.
    pub fn alloc_zeros<T: DeviceElement + DeviceRepr + ValidAsZeroBits>(
        &self,
        len: usize,
    ) -> DeviceResult<CudaSlice<T>> {
        self.stream.alloc_zeros::<T>(len).map_err(|e| cuda_err(DevicePrimitive::Allocate, e))
    }
}

impl<T: DeviceElement + DeviceRepr> DeviceBuffer<T> for CudaSlice<T> {
    fn len(&self) -> usize {
        CudaSlice::len(self)
    }
}

impl ExecutionStream for CudaExecStream {
    fn synchronize(&self) -> DeviceResult<()> {
        self.stream.synchronize().map_err(|e| cuda_err(DevicePrimitive::Synchronize, e))
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl<T: DeviceElement + DeviceRepr> EnqueueCopy<T, CudaSlice<T>> for CudaExecStream {
    fn enqueue_copy_to_host(&self, src: &CudaSlice<T>, dst: &mut [T]) -> DeviceResult<()> {
        if dst.len() > src.len() {
            return Err(cuda_err(
                DevicePrimitive::EnqueueCopy,
                format!("copy of {} elements from a buffer of {}", dst.len(), src.len()),
            ));
        }
        let view = src.slice(0..dst.len());
        self.stream
            .memcpy_dtoh(&view, dst)
            .map_err(|e| cuda_err(DevicePrimitive::EnqueueCopy, e))
    }
}
