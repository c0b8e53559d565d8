//! Benchmarks for end-to-end stream latency
//!
//! Measures:
//! - Device write to record delivery over an in-memory serial pipe
//! - Whole-capture replay through the stream task, both delivery policies
//!
//! Platform: Cross-platform (duplex pipes stand in for serial ports)

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use imulink::test_utils::{capture, frames};
use imulink::{Delivery, ImuLink, PacketType, ReplaySource, StreamConfig};
use std::hint::black_box;
use tokio::io::AsyncWriteExt;

fn bench_live_record_latency(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let frame = frames::s1_counter(1);

    let (mut device, mut stream) = runtime.block_on(async {
        let (device, host) = tokio::io::duplex(64 * 1024);
        (device, ImuLink::connect(host, StreamConfig::new(PacketType::S1)))
    });

    let mut group = c.benchmark_group("live_latency");
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("device_write_to_record", |b| {
        b.iter(|| {
            runtime.block_on(async {
                device.write_all(&frame).await.unwrap();
                let record = stream.next_record().await.unwrap();
                black_box(record);
            })
        })
    });

    group.finish();
    stream.close();
}

fn bench_replay_throughput(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let bytes = capture(PacketType::OpenS1, 2000, 0, 0);

    let mut group = c.benchmark_group("replay_throughput");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    for (name, delivery) in
        [("backpressure", Delivery::default()), ("latest", Delivery::Latest)]
    {
        group.bench_function(name, |b| {
            b.iter(|| {
                runtime.block_on(async {
                    let source = ReplaySource::from_bytes(bytes.clone()).with_chunk_size(4096);
                    let config = StreamConfig::new(PacketType::OpenS1).with_delivery(delivery);
                    let mut stream = ImuLink::attach(source, config);
                    while let Some(event) = stream.next_event().await {
                        black_box(event);
                    }
                    black_box(stream.join().await.unwrap())
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_live_record_latency, bench_replay_throughput);
criterion_main!(benches);
