//! Payload, lane word and simulated time tests.

use busfab_core::common::{
    BYTE_DISABLED, BYTE_ENABLED, BusWidth, LaneWord, ResponseStatus, SimTime, Transaction,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn byte_enables_repeat_cyclically() {
    let txn = Transaction::write(0x0, vec![0; 8]).with_byte_enable(vec![BYTE_ENABLED, BYTE_DISABLED]);
    let enabled: Vec<bool> = (0..8).map(|i| txn.byte_enabled(i)).collect();
    assert_eq!(
        enabled,
        vec![true, false, true, false, true, false, true, false]
    );
}

#[test]
fn missing_or_empty_enables_enable_everything() {
    let txn = Transaction::write(0x0, vec![0; 4]);
    assert!(txn.byte_enabled(3));
    let txn = txn.with_byte_enable(Vec::new());
    assert!(txn.byte_enabled(3));
}

#[test]
fn log_fields_pack_little_endian() {
    let txn = Transaction::write(0x0, vec![0xBE, 0xBA, 0xFE, 0xCA, 0x11])
        .with_byte_enable(vec![0xFF, 0x00, 0x00, 0xFF, 0xFF]);
    assert_eq!(txn.first_word(), 0xCAFE_BABE);
    assert_eq!(txn.enable_mask(), 0xFF00_00FF);

    let short = Transaction::write(0x0, vec![0x01, 0x02]);
    assert_eq!(short.first_word(), 0x0201);
    assert_eq!(short.enable_mask(), 0);
}

#[test]
fn new_transactions_are_incomplete() {
    let txn = Transaction::read(0x10, 4);
    assert_eq!(txn.status, ResponseStatus::Incomplete);
    assert!(!txn.dmi_allowed);
    assert!(!txn.is_response_error());
    assert_eq!(txn.streaming_width, 4);
}

#[rstest]
#[case(ResponseStatus::Incomplete, false)]
#[case(ResponseStatus::Ok, false)]
#[case(ResponseStatus::AddressError, true)]
#[case(ResponseStatus::CommandError, true)]
#[case(ResponseStatus::BurstError, true)]
#[case(ResponseStatus::ByteEnableError, true)]
#[case(ResponseStatus::GenericError, true)]
fn error_statuses(#[case] status: ResponseStatus, #[case] is_error: bool) {
    assert_eq!(status.is_error(), is_error);
}

#[rstest]
#[case(SimTime::ns(10), "10 ns")]
#[case(SimTime::ps(1500), "1500 ps")]
#[case(SimTime::ZERO, "0 ns")]
fn time_display(#[case] time: SimTime, #[case] text: &str) {
    assert_eq!(time.to_string(), text);
}

#[test]
fn time_arithmetic() {
    assert_eq!(SimTime::ns(1) * 3 + SimTime::ps(500), SimTime::ps(3500));
    assert_eq!(SimTime::ps(2999).as_ns(), 2);
    assert_eq!(SimTime::ns(u64::MAX), SimTime::ps(u64::MAX));
}

#[test]
fn unsupported_bus_widths_are_rejected() {
    assert!(BusWidth::new(3).is_err());
    assert!(BusWidth::new(16).is_err());
    assert_eq!(BusWidth::new(2).unwrap().lane_mask(), 0b11);
}

#[test]
fn lane_word_tracks_known_lanes() {
    let word = LaneWord::UNDEFINED.with_lane(1, 0xAB);
    assert_eq!(word.lane(1), Some(0xAB));
    assert_eq!(word.lane(0), None);
    assert_eq!(word.known_lanes(), 0b10);
    assert_eq!(word.value(BusWidth::W32), None);
}
