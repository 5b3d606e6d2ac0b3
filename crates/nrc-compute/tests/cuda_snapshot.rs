#![cfg(feature = "cuda")]

use nrc_compute::cuda::CudaExecStream;
use nrc_compute::{DeviceConfig, ExecutionStream, snapshot, snapshot_all};
use nrc_core::DevicePrimitive;

fn stream_or_skip() -> Option<CudaExecStream> {
    if !CudaExecStream::is_available() {
        eprintln!("SKIP: CUDA not available");
        return None;
    }
    Some(CudaExecStream::new(0).expect("CUDA stream"))
}

#[test]
fn cuda_snapshot_four_floats() {
    let Some(stream) = stream_or_skip() else { return };
    let buf = stream.upload(&[1.0f32, 2.0, 3.0, 4.0]).unwrap();

    let host = snapshot(&buf, 4, &stream).unwrap();
    assert_eq!(host, vec![1.0, 2.0, 3.0, 4.0]);
    stream.synchronize().unwrap();
}

#[test]
fn cuda_snapshot_prefix_and_zero() {
    let Some(stream) = stream_or_skip() else { return };
    let buf = stream.upload(&[7u32, 8, 9]).unwrap();

    assert_eq!(snapshot(&buf, 2, &stream).unwrap(), vec![7, 8]);
    assert!(snapshot(&buf, 0, &stream).unwrap().is_empty());
    assert_eq!(snapshot_all(&buf, &stream).unwrap(), vec![7, 8, 9]);
}

#[test]
fn cuda_zeroed_buffer_on_forked_stream() {
    if !CudaExecStream::is_available() {
        eprintln!("SKIP: CUDA not available");
        return;
    }
    let stream = CudaExecStream::forked(0).unwrap();
    assert_eq!(stream.label(), "cuda:0/forked");
    let buf = stream.alloc_zeros::<f64>(16).unwrap();

    assert_eq!(snapshot_all(&buf, &stream).unwrap(), vec![0.0; 16]);
}

#[test]
fn cuda_count_past_end_is_rejected() {
    let Some(stream) = stream_or_skip() else { return };
    let buf = stream.upload(&[1i32]).unwrap();

    let err = snapshot(&buf, 2, &stream).unwrap_err();
    assert_eq!(err.primitive, DevicePrimitive::EnqueueCopy);
}

#[test]
fn cuda_from_config_uses_device_id() {
    let Some(_) = stream_or_skip() else { return };
    let stream = CudaExecStream::from_config(&DeviceConfig::default()).unwrap();
    assert_eq!(stream.ordinal(), 0);
    assert_eq!(stream.label(), "cuda:0/default");
}
