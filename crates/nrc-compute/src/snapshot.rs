//! Device-to-host snapshots.
//!
//! A snapshot allocates a host vector, enqueues one copy from device memory
//! into it and then synchronizes the stream. The synchronization is a full
//! barrier: every operation enqueued on the stream before the call, not only
//! the copy, has completed when a snapshot returns.

use crate::stream::{DeviceBuffer, EnqueueCopy};
use nrc_core::{DeviceElement, DeviceOperationError, DevicePrimitive, DeviceResult, byte_len};

/// Copy the first `count` elements of `src` to a new host vector.
///
/// Blocks until `stream` has drained. With `count == 0` no copy is enqueued,
/// but the stream is still synchronized.
///
/// # Errors
///
/// - [`DevicePrimitive::EnqueueCopy`] when `count` exceeds `src.len()`, the
///   byte count overflows, or the runtime refuses the copy
/// - [`DevicePrimitive::Synchronize`] when draining the stream reports a
///   failure, including failures of operations enqueued earlier
///
/// No partially populated vector is ever returned.
pub fn snapshot<T, B, S>(src: &B, count: usize, stream: &S) -> DeviceResult<Vec<T>>
where
    T: DeviceElement,
    B: DeviceBuffer<T> + ?Sized,
    S: EnqueueCopy<T, B> + ?Sized,
{
    let available = src.len();
    if count > available {
        return Err(DeviceOperationError::new(
            DevicePrimitive::EnqueueCopy,
            format!("requested {count} elements from a device buffer of {available}"),
        ));
    }
    let bytes = byte_len::<T>(count)?;

    let mut host = vec![T::default(); count];
    if count > 0 {
        stream.enqueue_copy_to_host(src, &mut host)?;
    }
    stream.synchronize()?;

    log::debug!(
        "snapshot: {count} x {} ({bytes} bytes) from {}",
        std::any::type_name::<T>(),
        stream.label()
    );
    Ok(host)
}

/// [`snapshot`] of the whole buffer.
pub fn snapshot_all<T, B, S>(src: &B, stream: &S) -> DeviceResult<Vec<T>>
where
    T: DeviceElement,
    B: DeviceBuffer<T> + ?Sized,
    S: EnqueueCopy<T, B> + ?Sized,
{
    snapshot(src, src.len(), stream)
}

/// [`snapshot`] that fails fast via [`crate::check_or_abort`].
#[track_caller]
pub fn snapshot_or_abort<T, B, S>(src: &B, count: usize, stream: &S) -> Vec<T>
where
    T: DeviceElement,
    B: DeviceBuffer<T> + ?Sized,
    S: EnqueueCopy<T, B> + ?Sized,
{
    crate::check_or_abort(snapshot(src, count, stream))
}

/// Bind a host snapshot of device data to a local variable.
///
/// `check_data!(name: T = src, count, stream)` expands to
/// `let name: Vec<T> = snapshot_or_abort(src, count, stream);`, so a device
/// failure panics or aborts per the process-wide
/// [`FailurePolicy`](crate::FailurePolicy).
///
/// ```
/// use nrc_compute::{HostDevice, check_data};
///
/// let dev = HostDevice::new(0);
/// let stream = dev.new_stream("debug");
/// let density = dev.upload(&[0.5f32, 0.25, 0.125]);
///
/// check_data!(host_density: f32 = &density, 2, &stream);
/// assert_eq!(host_density, vec![0.5, 0.25]);
/// ```
#[macro_export]
macro_rules! check_data {
    ($var:ident : $ty:ty = $src:expr, $count:expr, $stream:expr $(,)?) => {
        let $var: ::std::vec::Vec<$ty> =
            $crate::snapshot::snapshot_or_abort::<$ty, _, _>($src, $count, $stream);
    };
}
