//! Integration tests for the stream handle
//!
//! These tests verify event delivery, latest-value access and shutdown with
//! in-memory replay sources and duplex pipes standing in for serial ports.

use super::*;
use crate::sink::Delivery;
use crate::sources::{LiveSource, ReplaySource};
use crate::test_utils::{capture, frames};
use crate::types::SyncLossReason;
use futures::StreamExt;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

fn config(packet_type: PacketType, delivery: Delivery) -> StreamConfig {
    StreamConfig::new(packet_type).with_delivery(delivery)
}

fn s1_frames(count: u16) -> Vec<u8> {
    (0..count).flat_map(|i| frames::s1_counter(i).to_vec()).collect()
}

#[tokio::test]
async fn replay_records_arrive_in_order() {
    let _ = tracing_subscriber::fmt::try_init();

    let source = ReplaySource::from_bytes(s1_frames(20)).with_chunk_size(13);
    let mut handle =
        StreamHandle::spawn(source, config(PacketType::S1, Delivery::Backpressure { capacity: 2 }));
    assert_eq!(handle.source_kind(), SourceKind::Replay);

    let counters: Vec<u16> = handle
        .records()
        .map(|record| match record {
            DecodedRecord::S1(s1) => s1.counter,
            other => panic!("unexpected record {:?}", other),
        })
        .collect()
        .await;
    assert_eq!(counters, (0..20).collect::<Vec<_>>());

    // The stream is exhausted; the last record stays available
    assert!(handle.next_event().await.is_none());
    assert!(matches!(handle.latest(), Some(DecodedRecord::S1(r)) if r.counter == 19));

    let summary = handle.join().await.unwrap();
    info!(?summary, "replay finished");
    assert_eq!(summary.records, 20);
    assert_eq!(summary.sync_losses, 0);
}

#[tokio::test]
async fn noisy_capture_reports_losses_and_keeps_records() {
    // 40 bytes of noise is longer than one 37-byte A2 frame
    let bytes = capture(PacketType::A2, 6, 2, 40);
    let mut handle = StreamHandle::spawn(
        ReplaySource::from_bytes(bytes),
        config(PacketType::A2, Delivery::default()),
    );

    let events: Vec<StreamEvent> = Box::pin(handle.events()).collect().await;
    let records = events.iter().filter(|e| e.record().is_some()).count();
    let losses = events.iter().filter(|e| matches!(e, StreamEvent::SyncLoss(_))).count();

    assert_eq!(records, 6);
    assert_eq!(losses, 3);
    let Some(StreamEvent::EndOfStream(summary)) = events.last() else {
        panic!("stream must end with a summary");
    };
    assert_eq!(summary.bytes_discarded, 120);
}

#[tokio::test]
async fn next_record_skips_sync_losses() {
    let mut bytes = vec![0u8; 40];
    bytes.extend_from_slice(&frames::s1_counter(5));
    let mut handle = StreamHandle::spawn(
        ReplaySource::from_bytes(bytes),
        config(PacketType::S1, Delivery::default()),
    );

    let record = handle.next_record().await.unwrap();
    assert!(matches!(record, DecodedRecord::S1(r) if r.counter == 5));
    assert!(handle.next_record().await.is_none());
}

#[tokio::test]
async fn latest_delivery_ends_with_the_final_record() {
    let source = ReplaySource::from_bytes(s1_frames(50)).with_chunk_size(31);
    let mut handle = StreamHandle::spawn(source, config(PacketType::S1, Delivery::Latest));

    // Intermediate values may be replaced, but the stream still terminates
    let mut last_end = None;
    while let Some(event) = handle.next_event().await {
        if let StreamEvent::EndOfStream(summary) = event {
            last_end = Some(summary);
        }
    }
    assert_eq!(last_end.map(|s| s.records), Some(50));
    assert!(matches!(handle.latest(), Some(DecodedRecord::S1(r)) if r.counter == 49));
}

#[tokio::test]
async fn close_while_the_queue_is_full_keeps_every_record() {
    let mut handle = StreamHandle::spawn(
        ReplaySource::from_bytes(s1_frames(10)),
        config(PacketType::S1, Delivery::Backpressure { capacity: 1 }),
    );

    // Let the producer fill the queue and park on the next record
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.close();

    let mut counters = Vec::new();
    while let Some(record) = handle.next_record().await {
        let DecodedRecord::S1(s1) = record else { panic!("unexpected {:?}", record) };
        counters.push(s1.counter);
    }
    assert_eq!(counters, (0..10).collect::<Vec<_>>());
    assert_eq!(handle.join().await.unwrap().records, 10);
}

#[tokio::test]
async fn live_garbage_surfaces_as_sync_loss() {
    // Wrong baud rate: the device never produces a preamble
    let (mut device, host) = tokio::io::duplex(4096);
    let mut handle =
        StreamHandle::spawn(LiveSource::new(host), config(PacketType::S1, Delivery::default()));
    device.write_all(&[0u8; 2000]).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), handle.next_event())
        .await
        .expect("sync loss within timeout");
    assert!(matches!(
        event,
        Some(StreamEvent::SyncLoss(loss)) if loss.reason == SyncLossReason::NoPreamble && loss.offset == 0
    ));
    handle.close();
}

#[tokio::test]
async fn subscribe_latest_requires_latest_delivery() {
    let handle = StreamHandle::spawn(
        ReplaySource::from_bytes(Vec::new()),
        config(PacketType::S1, Delivery::default()),
    );
    assert!(matches!(
        handle.subscribe_latest(UpdateRate::Native),
        Err(TelemetryError::Config { .. })
    ));
}

#[tokio::test]
async fn latest_subscription_follows_a_live_device() {
    let (mut device, host) = tokio::io::duplex(1024);
    let handle = StreamHandle::spawn(LiveSource::new(host), config(PacketType::S1, Delivery::Latest));
    let mut updates = handle.subscribe_latest(UpdateRate::Max(100)).unwrap();

    device.write_all(&frames::s1_counter(42)).await.unwrap();
    let record = tokio::time::timeout(Duration::from_secs(2), updates.next())
        .await
        .expect("record within timeout")
        .expect("subscription open");
    assert!(matches!(record, DecodedRecord::S1(r) if r.counter == 42));

    // Closing the stream ends every subscription
    handle.close();
    let end = tokio::time::timeout(Duration::from_secs(2), updates.next()).await.unwrap();
    assert!(end.is_none() || matches!(end, Some(DecodedRecord::S1(_))));
    let summary = handle.join().await.unwrap();
    assert_eq!(summary.records, 1);
}

#[tokio::test]
async fn reset_command_is_written_before_reading() {
    let (mut device, host) = tokio::io::duplex(256);
    let reset = vec![0x55, 0x55, 0x72, 0x53, 0x00, 0xFC, 0x88];
    let config = config(PacketType::S1, Delivery::default()).with_reset_command(reset.clone());
    let mut handle = StreamHandle::spawn(LiveSource::new(host), config);

    let mut received = vec![0u8; reset.len()];
    tokio::time::timeout(Duration::from_secs(2), device.read_exact(&mut received))
        .await
        .expect("reset within timeout")
        .unwrap();
    assert_eq!(received, reset);

    // Split a frame across writes like a slow UART
    let frame = frames::s1_counter(3);
    for chunk in frame.chunks(4) {
        device.write_all(chunk).await.unwrap();
        tokio::task::yield_now().await;
    }
    let record = tokio::time::timeout(Duration::from_secs(2), handle.next_record())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(record, DecodedRecord::S1(r) if r.counter == 3));

    handle.close();
    let mut tail = Vec::new();
    while let Some(event) = handle.next_event().await {
        tail.push(event);
    }
    assert!(matches!(tail.as_slice(), [StreamEvent::EndOfStream(_)]));
}

#[tokio::test]
async fn dropping_the_handle_stops_the_task() {
    let (mut device, host) = tokio::io::duplex(64);
    let handle = StreamHandle::spawn(LiveSource::new(host), config(PacketType::Nav, Delivery::default()));
    assert_eq!(handle.source_kind(), SourceKind::Live);
    drop(handle);

    // Once the task exits its transport is dropped and writes start failing
    let result = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if device.write_all(&[0u8; 16]).await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(result.is_ok(), "stream task kept running after drop");
}

#[tokio::test]
async fn join_surfaces_source_errors() {
    let missing = std::env::temp_dir().join("imulink-missing-capture.bin");
    assert!(matches!(
        ReplaySource::open(&missing).await,
        Err(TelemetryError::File { .. })
    ));

    struct Unplugged;

    #[async_trait::async_trait]
    impl ByteSource for Unplugged {
        async fn read(&mut self) -> Result<Option<bytes::Bytes>> {
            Err(TelemetryError::source_failed("device unplugged"))
        }

        async fn send_command(&mut self, _command: &[u8]) -> Result<()> {
            Ok(())
        }

        fn kind(&self) -> SourceKind {
            SourceKind::Live
        }
    }

    let handle = StreamHandle::spawn(Unplugged, config(PacketType::E3, Delivery::default()));
    let err = handle.join().await.unwrap_err();
    assert!(err.is_retryable());
}
