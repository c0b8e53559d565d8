//! Synchronous framing engine.

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use super::{FrameBuffer, SyncStep, Synchronizer};
use crate::catalog::{self, PacketDefinition};
use crate::types::{PacketType, StreamEvent, StreamSummary, SyncLoss, SyncLossReason};

/// Turns an arbitrary byte stream into [`StreamEvent`]s for one packet type.
///
/// Input is queued by [`feed`](Self::feed) and admitted into the frame
/// buffer only to top it up to one frame, so the buffer never holds more
/// than a frame's worth of unvalidated bytes. Events are produced lazily by
/// [`next_event`](Self::next_event); the output is independent of how the
/// input was chunked.
///
/// A run of bytes containing no preamble byte is reported as a single
/// `NoPreamble` sync loss once the run ends. A run that keeps going is
/// reported every [`GAP_REPORT_FRAMES`] frames' worth of bytes, as is a long
/// stretch of bytes skipped while hunting for a header that never validates,
/// so a misconfigured live device is never silent.
///
/// ```rust
/// use imulink::framing::{FrameDecoder, encode_frame};
/// use imulink::records::{DecodedRecord, S1Record};
/// use imulink::types::PacketType;
///
/// let record = DecodedRecord::S1(S1Record { counter: 7, ..Default::default() });
/// let frame = encode_frame(&record).unwrap();
///
/// let mut decoder = FrameDecoder::new(PacketType::S1);
/// decoder.feed(&[0x00, 0x13]); // line noise
/// decoder.feed(&frame);
///
/// let decoded: Vec<_> = decoder.events().filter_map(|e| e.into_record()).collect();
/// assert_eq!(decoded, vec![record]);
/// ```
/// Frames' worth of unreported discards after which a gap is reported.
pub const GAP_REPORT_FRAMES: usize = 16;

#[derive(Debug)]
pub struct FrameDecoder {
    sync: Synchronizer,
    buffer: FrameBuffer,
    pending: BytesMut,
    summary: StreamSummary,
    /// Open run of preamble-free bytes, reported when it ends.
    gap: Option<SyncLoss>,
    /// Bytes skipped without an open gap since the last event.
    quiet: Option<SyncLoss>,
    gap_limit: usize,
    /// Event held back while a gap is reported ahead of it.
    deferred: Option<StreamEvent>,
    closed: bool,
}

impl FrameDecoder {
    pub fn new(packet: PacketType) -> Self {
        Self::with_definition(catalog::definition(packet))
    }

    pub fn with_definition(definition: &'static PacketDefinition) -> Self {
        Self {
            sync: Synchronizer::new(definition),
            buffer: FrameBuffer::for_frame_size(definition.frame_size),
            pending: BytesMut::new(),
            summary: StreamSummary::default(),
            gap: None,
            quiet: None,
            gap_limit: GAP_REPORT_FRAMES * definition.frame_size,
            deferred: None,
            closed: false,
        }
    }

    pub fn definition(&self) -> &'static PacketDefinition {
        self.sync.definition()
    }

    /// Queue received bytes. Input fed after [`close`](Self::close) is ignored.
    pub fn feed(&mut self, data: &[u8]) {
        if self.closed {
            return;
        }
        self.summary.bytes_read += data.len() as u64;
        self.pending.extend_from_slice(data);
    }

    /// Mark the end of input. Remaining events can still be drained; bytes
    /// that never formed a frame are then counted as discarded.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Produce the next event, or `None` once all queued input is consumed
    /// and no complete frame remains.
    pub fn next_event(&mut self) -> Option<StreamEvent> {
        if let Some(event) = self.deferred.take() {
            return Some(event);
        }

        let def = self.sync.definition();
        loop {
            let start = self.buffer.offset();
            let (step, skipped) = self.sync.step(&mut self.buffer);
            self.absorb_skipped(start, skipped);

            let event = match step {
                Some(SyncStep::Lost(loss)) if loss.reason == SyncLossReason::NoPreamble => {
                    self.summary.bytes_discarded += loss.len as u64;
                    self.quiet = None;
                    match self.gap.as_mut() {
                        Some(gap) => gap.len += loss.len,
                        None => self.gap = Some(loss),
                    }
                    match self.overdue_gap() {
                        Some(gap) => return Some(self.report(gap)),
                        None => continue,
                    }
                }
                Some(SyncStep::Lost(loss)) => {
                    // integrity failures slide a single byte
                    self.summary.bytes_discarded += 1;
                    self.report(loss)
                }
                Some(SyncStep::Frame(frame)) => match def.decode_payload(def.payload(&frame)) {
                    Ok(record) => {
                        trace!(packet = %def.packet_type, offset = self.buffer.offset(), "frame decoded");
                        self.summary.records += 1;
                        StreamEvent::Record(record)
                    }
                    Err(e) => {
                        warn!(packet = %def.packet_type, error = %e, "validated frame failed to decode, skipping");
                        self.summary.bytes_discarded += frame.len() as u64;
                        self.quiet = None;
                        continue;
                    }
                },
                None if !self.pending.is_empty() => {
                    let take = self.pending.len().min(def.frame_size - self.buffer.len());
                    let chunk = self.pending.split_to(take);
                    self.buffer.extend(&chunk);
                    match self.overdue_gap() {
                        Some(gap) => return Some(self.report(gap)),
                        None => continue,
                    }
                }
                None if self.closed => {
                    let trailing = self.buffer.len();
                    if trailing > 0 {
                        debug!(packet = %def.packet_type, trailing, "dropping incomplete frame at end of input");
                        self.buffer.discard(trailing);
                        self.summary.bytes_discarded += trailing as u64;
                    }
                    self.quiet = None;
                    return self.gap.take().map(|gap| self.report(gap));
                }
                None => return self.overdue_gap().map(|gap| self.report(gap)),
            };

            self.quiet = None;
            return match self.gap.take() {
                Some(gap) => {
                    self.deferred = Some(event);
                    Some(self.report(gap))
                }
                None => Some(event),
            };
        }
    }

    /// Account for bytes skipped while hunting for a preamble byte. They
    /// extend an open gap; otherwise they only turn into one once the quiet
    /// run reaches the report limit.
    fn absorb_skipped(&mut self, offset: u64, skipped: usize) {
        if skipped == 0 {
            return;
        }
        self.summary.bytes_discarded += skipped as u64;
        if let Some(gap) = self.gap.as_mut() {
            gap.len += skipped;
            return;
        }
        let quiet = self.quiet.get_or_insert(SyncLoss {
            offset,
            len: 0,
            reason: SyncLossReason::NoPreamble,
        });
        quiet.len += skipped;
        if quiet.len >= self.gap_limit {
            self.gap = self.quiet.take();
        }
    }

    /// Take the open gap once it has grown past the report limit.
    fn overdue_gap(&mut self) -> Option<SyncLoss> {
        if self.gap.as_ref().is_some_and(|gap| gap.len >= self.gap_limit) {
            self.gap.take()
        } else {
            None
        }
    }

    fn report(&mut self, loss: SyncLoss) -> StreamEvent {
        warn!(
            packet = %self.sync.definition().packet_type,
            offset = loss.offset,
            len = loss.len,
            reason = ?loss.reason,
            "sync lost"
        );
        self.summary.sync_losses += 1;
        StreamEvent::SyncLoss(loss)
    }

    /// Iterate over every event the queued input produces.
    pub fn events(&mut self) -> impl Iterator<Item = StreamEvent> + '_ {
        std::iter::from_fn(move || self.next_event())
    }

    /// Bytes held in the frame buffer plus input not yet admitted.
    pub fn buffered(&self) -> usize {
        self.buffer.len() + self.pending.len()
    }

    /// Counters so far.
    pub fn summary(&self) -> StreamSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{DecodedRecord, S1Record};
    use crate::test_utils::frames;
    use proptest::prelude::*;

    fn drain(decoder: &mut FrameDecoder) -> Vec<StreamEvent> {
        decoder.events().collect()
    }

    #[test]
    fn zero_s1_frame_decodes_to_zero_record() {
        let mut decoder = FrameDecoder::new(PacketType::S1);
        decoder.feed(&frames::s1_counter(1));

        let events = drain(&mut decoder);
        assert_eq!(events.len(), 1);
        let Some(DecodedRecord::S1(record)) = events[0].record() else {
            panic!("expected an S1 record");
        };
        assert_eq!(record.accel, [0.0; 3]);
        assert_eq!(record.rate, [0.0; 3]);
        assert_eq!(record.temperature, [0.0; 4]);
        assert_eq!(record.counter, 1);
        assert_eq!(record.bit_status, 0);
    }

    #[test]
    fn partial_frame_waits_for_more_input() {
        let frame = frames::s1_counter(5);
        let mut decoder = FrameDecoder::new(PacketType::S1);
        decoder.feed(&frame[..20]);
        assert!(decoder.next_event().is_none());
        decoder.feed(&frame[20..]);
        assert!(matches!(decoder.next_event(), Some(StreamEvent::Record(_))));
        assert!(decoder.next_event().is_none());
    }

    #[test]
    fn buffer_stays_within_two_frames() {
        let mut decoder = FrameDecoder::new(PacketType::S1);
        let stream: Vec<u8> = (0..50).flat_map(|i| frames::s1_counter(i).to_vec()).collect();
        decoder.feed(&stream);
        let mut records = 0;
        while let Some(event) = decoder.next_event() {
            assert!(decoder.buffer.len() <= 31);
            if event.record().is_some() {
                records += 1;
            }
        }
        assert_eq!(records, 50);
    }

    #[test]
    fn corrupted_frame_between_valid_frames() {
        let mut bad = frames::s1_counter(2).to_vec();
        bad[12] ^= 0x80;

        let mut decoder = FrameDecoder::new(PacketType::S1);
        decoder.feed(&frames::s1_counter(1));
        decoder.feed(&bad);
        decoder.feed(&frames::s1_counter(3));

        let events = drain(&mut decoder);
        let counters: Vec<u16> = events
            .iter()
            .filter_map(|e| match e.record() {
                Some(DecodedRecord::S1(r)) => Some(r.counter),
                _ => None,
            })
            .collect();
        assert_eq!(counters, vec![1, 3]);
        assert!(matches!(
            &events[1],
            StreamEvent::SyncLoss(loss) if loss.offset == 31
                && matches!(loss.reason, SyncLossReason::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn garbage_prefix_yields_one_record_and_at_most_one_loss() {
        let mut decoder = FrameDecoder::new(PacketType::S1);
        decoder.feed(&[0x00; 100]);
        decoder.feed(&frames::s1_counter(9));

        let events = drain(&mut decoder);
        let records = events.iter().filter(|e| e.record().is_some()).count();
        let losses = events.iter().filter(|e| matches!(e, StreamEvent::SyncLoss(_))).count();
        assert_eq!(records, 1);
        assert_eq!(losses, 1);
        assert!(matches!(
            &events[0],
            StreamEvent::SyncLoss(loss) if loss.offset == 0 && loss.len == 100
        ));
        assert_eq!(decoder.summary().records, 1);
        assert_eq!(decoder.summary().bytes_discarded, 100);
    }

    #[test]
    fn endless_garbage_is_reported_in_bounded_runs() {
        let mut decoder = FrameDecoder::new(PacketType::S1);
        decoder.feed(&[0x00; 2000]);

        // 64 full buffers of 31 bytes; every 16 of them close a run
        let events = drain(&mut decoder);
        let runs: Vec<(u64, usize)> = events
            .iter()
            .map(|e| match e {
                StreamEvent::SyncLoss(loss) if loss.reason == SyncLossReason::NoPreamble => {
                    (loss.offset, loss.len)
                }
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(runs, vec![(0, 496), (496, 496), (992, 496), (1488, 496)]);
        assert_eq!(decoder.summary().sync_losses, 4);
    }

    #[test]
    fn other_packet_type_on_the_wire_is_not_silent() {
        let mut decoder = FrameDecoder::new(PacketType::A2);
        for _ in 0..100 {
            decoder.feed(&frames::zeroed(PacketType::A1));
        }

        let events = drain(&mut decoder);
        assert!(events.iter().all(|e| e.record().is_none()));
        assert!(events.iter().any(|e| matches!(e, StreamEvent::SyncLoss(_))));
    }

    #[test]
    fn nav_frames_use_running_sum() {
        let mut decoder = FrameDecoder::new(PacketType::Nav);
        let frame = frames::zeroed(PacketType::Nav);
        assert_eq!(frame.len(), 127);
        decoder.feed(&[0xAF, 0x20, 0x01]);
        decoder.feed(&frame);
        let events = drain(&mut decoder);
        assert_eq!(events.iter().filter(|e| e.record().is_some()).count(), 1);
    }

    #[test]
    fn close_counts_trailing_bytes() {
        let mut decoder = FrameDecoder::new(PacketType::S1);
        decoder.feed(&frames::s1_counter(1));
        decoder.feed(&[0x55, 0x55, 0x53]);
        decoder.close();
        assert_eq!(drain(&mut decoder).len(), 1);
        let summary = decoder.summary();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.bytes_read, 34);
        assert_eq!(summary.bytes_discarded, 3);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn decoding_is_idempotent() {
        let frame = frames::s1_counter(42);
        let def = catalog::definition(PacketType::S1);
        let first = def.decode_payload(def.payload(&frame)).unwrap();
        let second = def.decode_payload(def.payload(&frame)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, DecodedRecord::S1(S1Record { counter: 42, ..Default::default() }));
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_output(
            counters in prop::collection::vec(any::<u16>(), 1..8),
            noise in prop::collection::vec(any::<u8>(), 0..64),
            chunk in 1usize..80,
        ) {
            let mut stream = noise.clone();
            for &c in &counters {
                stream.extend_from_slice(&frames::s1_counter(c));
            }

            let mut whole = FrameDecoder::new(PacketType::S1);
            whole.feed(&stream);
            let expected = drain(&mut whole);

            let mut bytewise = FrameDecoder::new(PacketType::S1);
            let mut actual = Vec::new();
            for piece in stream.chunks(chunk) {
                bytewise.feed(piece);
                actual.extend(drain(&mut bytewise));
            }
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn single_bit_flip_in_payload_is_rejected(
            counter in any::<u16>(),
            byte in 5usize..29,
            bit in 0u8..8,
        ) {
            let mut frame = frames::s1_counter(counter).to_vec();
            frame[byte] ^= 1 << bit;

            let mut decoder = FrameDecoder::new(PacketType::S1);
            decoder.feed(&frame);
            let events = drain(&mut decoder);
            prop_assert!(events.iter().all(|e| e.record().is_none()));
            prop_assert!(!events.is_empty());
        }
    }
}
