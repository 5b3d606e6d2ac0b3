//! Element types that may cross the host/device boundary.

use crate::error::{DeviceOperationError, DevicePrimitive, DeviceResult};

/// Plain data with the same meaning in host code and in device kernels.
///
/// Only types marked with this trait can be snapshotted from device memory.
///
/// # Safety
///
/// Implementors must have a fixed, `#[repr(C)]`-compatible layout with no
/// pointers or references. A bytewise copy of a value written by sound device
/// code must yield the same valid value on the host. Types with invalid bit
/// patterns (such as `bool`) rely on device code only ever storing valid ones.
pub unsafe trait DeviceElement: Copy + Default + Send + Sync + 'static {}

macro_rules! impl_device_element {
    ($($t:ty),* $(,)?) => {
        $(unsafe impl DeviceElement for $t {})*
    };
}

impl_device_element!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, bool);

/// Size in bytes of `count` elements of `T`.
///
/// Fails with [`DevicePrimitive::EnqueueCopy`] when the byte count does not
/// fit in `usize`, since no host allocation of that size can succeed.
pub fn byte_len<T: DeviceElement>(count: usize) -> DeviceResult<usize> {
    count.checked_mul(std::mem::size_of::<T>()).ok_or_else(|| {
        DeviceOperationError::new(
            DevicePrimitive::EnqueueCopy,
            format!(
                "{count} elements of {} bytes overflow the host address space",
                std::mem::size_of::<T>()
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_len() {
        assert_eq!(byte_len::<f32>(4).unwrap(), 16);
        assert_eq!(byte_len::<u8>(0).unwrap(), 0);
        assert_eq!(byte_len::<f64>(3).unwrap(), 24);
    }

    #[test]
    fn test_byte_len_overflow() {
        let err = byte_len::<u64>(usize::MAX).unwrap_err();
        assert_eq!(err.primitive, DevicePrimitive::EnqueueCopy);
    }
}
