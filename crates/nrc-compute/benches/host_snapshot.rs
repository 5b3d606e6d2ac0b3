use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nrc_compute::{HostDevice, snapshot};

fn bench_host_snapshot(c: &mut Criterion) {
    let dev = HostDevice::new(0);
    let stream = dev.new_stream("bench");

    let mut group = c.benchmark_group("host_snapshot");
    for &n in &[1_024usize, 65_536, 1 << 20] {
        let data: Vec<f32> = (0..n).map(|i| i as f32 * 0.5).collect();
        let buf = dev.upload(&data);

        group.throughput(Throughput::Bytes((n * std::mem::size_of::<f32>()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(snapshot(&buf, n, &stream).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_host_snapshot);
criterion_main!(benches);
