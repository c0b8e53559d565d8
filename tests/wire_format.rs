//! Wire-format tests through the public API
//!
//! Golden frames pin the checksum families and byte orders; the property
//! tests exercise resync behaviour on arbitrary input.

use imulink::records::{NavRecord, S1Record};
use imulink::{
    DecodedRecord, FrameDecoder, PacketType, StreamEvent, SyncLossReason, definition, encode_frame,
};
use proptest::prelude::*;

/// S1 frame: zero sensors, counter 1, status 0.
const S1_COUNTER_1: &str = "5555533118\
    000000000000000000000000000000000000000000000100\
    bf31";

fn decode_all(packet: PacketType, bytes: &[u8]) -> Vec<StreamEvent> {
    let mut decoder = FrameDecoder::new(packet);
    decoder.feed(bytes);
    decoder.close();
    decoder.events().collect()
}

fn records(events: &[StreamEvent]) -> Vec<DecodedRecord> {
    events.iter().filter_map(|e| e.record().cloned()).collect()
}

/// Record decoded from a payload filled with `byte`.
fn filled(packet: PacketType, byte: u8) -> DecodedRecord {
    let def = definition(packet);
    def.decode_payload(&vec![byte; def.payload_len()]).unwrap()
}

#[test]
fn s1_golden_frame_decodes_to_zero_sensors() {
    let frame = hex::decode(S1_COUNTER_1).unwrap();
    assert_eq!(frame.len(), 31);

    let events = decode_all(PacketType::S1, &frame);
    let [StreamEvent::Record(DecodedRecord::S1(record))] = events.as_slice() else {
        panic!("expected one S1 record, got {:?}", events);
    };
    assert_eq!(record.accel, [0.0; 3]);
    assert_eq!(record.rate, [0.0; 3]);
    assert_eq!(record.temperature, [0.0; 4]);
    assert_eq!(record.counter, 1);
    assert_eq!(record.bit_status, 0);
}

#[test]
fn encoder_reproduces_the_golden_frame() {
    let record = S1Record { counter: 1, ..Default::default() };
    let frame = encode_frame(&record.into()).unwrap();
    assert_eq!(hex::encode(&frame), S1_COUNTER_1);
}

#[test]
fn nav_golden_frame_uses_running_sum() {
    let mut frame = vec![0xAF, 0x20, 0x05, 0x0D, 0x77, 0x00];
    let mut payload = [0u8; 119];
    payload[0..8].copy_from_slice(&1.5f64.to_le_bytes());
    payload[8..16].copy_from_slice(&31.25f64.to_le_bytes());
    frame.extend_from_slice(&payload);
    frame.extend_from_slice(&[0xF6, 0x5F]);
    assert_eq!(frame.len(), 127);

    let events = decode_all(PacketType::Nav, &frame);
    let [StreamEvent::Record(DecodedRecord::Nav(nav))] = events.as_slice() else {
        panic!("expected one nav record, got {:?}", events);
    };
    assert_eq!(nav.time, 1.5);
    assert_eq!(nav.latitude, 31.25);
    assert_eq!(*nav, NavRecord { time: 1.5, latitude: 31.25, ..Default::default() });

    // Same bytes, wrong checksum
    frame[126] ^= 0x01;
    let events = decode_all(PacketType::Nav, &frame);
    assert!(records(&events).is_empty());
    assert!(events.iter().any(|e| matches!(
        e,
        StreamEvent::SyncLoss(loss) if matches!(loss.reason, SyncLossReason::ChecksumMismatch { .. })
    )));
}

#[test]
fn reset_command_is_a_well_formed_short_frame() {
    // 55 55 'S' 'R' len 0, crc 7E4F
    let command = hex::decode("55555352007E4F").unwrap();
    let span = &command[2..command.len() - 2];
    assert_eq!(imulink::framing::checksum::crc16(span), 0x7E4F);
}

#[test]
fn every_packet_type_round_trips() {
    for packet in PacketType::ALL {
        let record = filled(packet, 0x11);
        let frame = encode_frame(&record).unwrap();
        assert_eq!(frame.len(), definition(packet).frame_size, "{}", packet);

        let decoded = records(&decode_all(packet, &frame));
        assert_eq!(decoded, vec![record], "{}", packet);
    }
}

#[test]
fn wrong_packet_type_never_yields_records() {
    let frame = encode_frame(&filled(PacketType::A1, 0x11)).unwrap();
    let mut decoder = FrameDecoder::new(PacketType::A2);
    decoder.feed(&frame);
    decoder.close();
    let events: Vec<_> = decoder.events().collect();

    assert!(records(&events).is_empty());
    assert_eq!(decoder.summary().bytes_discarded, frame.len() as u64);
}

proptest! {
    #[test]
    fn garbage_prefix_yields_one_record_and_at_most_one_loss(
        garbage in prop::collection::vec(any::<u8>().prop_filter("no preamble", |b| *b != 0x55), 0..300),
        counter in any::<u16>(),
    ) {
        let record: DecodedRecord = S1Record { counter, ..Default::default() }.into();
        let mut bytes = garbage.clone();
        bytes.extend_from_slice(&encode_frame(&record).unwrap());

        let events = decode_all(PacketType::S1, &bytes);
        let losses = events.iter().filter(|e| matches!(e, StreamEvent::SyncLoss(_))).count();
        prop_assert_eq!(records(&events), vec![record]);
        prop_assert!(losses <= 1);
    }

    #[test]
    fn chunking_does_not_change_events(
        packet in prop::sample::select(PacketType::ALL.to_vec()),
        noise in prop::collection::vec(any::<u8>(), 0..80),
        chunk in 1usize..64,
    ) {
        let frame = encode_frame(&filled(packet, 0x11)).unwrap();
        let mut bytes = frame.to_vec();
        bytes.extend_from_slice(&noise);
        bytes.extend_from_slice(&frame);

        let whole = decode_all(packet, &bytes);

        let mut decoder = FrameDecoder::new(packet);
        let mut chunked = Vec::new();
        for piece in bytes.chunks(chunk) {
            decoder.feed(piece);
            chunked.extend(decoder.events());
        }
        decoder.close();
        chunked.extend(decoder.events());

        prop_assert_eq!(whole, chunked);
    }

    #[test]
    fn single_bit_flips_in_the_payload_are_rejected(
        packet in prop::sample::select(PacketType::ALL.to_vec()),
        bit in 0usize..8,
        position in any::<prop::sample::Index>(),
    ) {
        let def = definition(packet);
        let frame = encode_frame(&filled(packet, 0x11)).unwrap();
        let payload_range = def.payload_offset()..def.frame_size - 2;
        let index = payload_range.start + position.index(payload_range.len());

        let mut corrupted = frame.to_vec();
        corrupted[index] ^= 1 << bit;
        let events = decode_all(packet, &corrupted);
        prop_assert!(records(&events).is_empty());
    }
}
