//! Device-agnostic stream and buffer traits.
//!
//! These traits define the minimal surface the snapshot path needs from an
//! accelerator runtime, independent of the concrete backend (host emulation
//! vs CUDA).

use nrc_core::{DeviceElement, DeviceResult};

/// Contiguous device-resident storage of `T`.
///
/// Owned by whoever allocated it; snapshot code only borrows it for reading.
pub trait DeviceBuffer<T: DeviceElement> {
    /// Number of elements.
    fn len(&self) -> usize;

    /// `true` when the buffer holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-order queue of asynchronous device operations.
pub trait ExecutionStream {
    /// Block until every operation enqueued so far has completed.
    ///
    /// Reports deferred failures of earlier asynchronous operations.
    fn synchronize(&self) -> DeviceResult<()>;

    /// Short label used in diagnostics (e.g. `"cuda:0/default"`).
    fn label(&self) -> &str;
}

/// Streams that can copy from buffers of type `B` back to the host.
pub trait EnqueueCopy<T: DeviceElement, B: DeviceBuffer<T> + ?Sized>: ExecutionStream {
    /// Enqueue a copy of `dst.len()` elements from the start of `src` into `dst`.
    ///
    /// The copy is ordered after everything already enqueued on this stream.
    /// `dst` is only guaranteed to be populated once [`ExecutionStream::synchronize`]
    /// returns `Ok`. Callers must ensure `dst.len() <= src.len()`.
    fn enqueue_copy_to_host(&self, src: &B, dst: &mut [T]) -> DeviceResult<()>;
}
