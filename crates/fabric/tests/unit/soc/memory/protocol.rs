//! Dense memory protocol-path tests.
//!
//! Verifies bounds checks, reported statuses, byte-enable handling, latency annotation and
//! access counters.

use busfab_core::common::{
    BusWidth, Command, FabricError, ResponseStatus, SimTime, Transaction,
};
use busfab_core::soc::memory::{DEFAULT_LATENCY, Memory};
use busfab_core::soc::traits::Target;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn memory() -> Memory {
    Memory::new("ram", 0x100)
}

// ══════════════════════════════════════════════════════════
// 1. Successful accesses
// ══════════════════════════════════════════════════════════

#[test]
fn write_then_read_annotates_latency() {
    let mut mem = memory();
    let mut delay = SimTime::ZERO;

    let mut write = Transaction::write(0x10, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    mem.transport(&mut write, &mut delay).unwrap();
    let mut read = Transaction::read(0x10, 4);
    mem.transport(&mut read, &mut delay).unwrap();

    assert_eq!(read.data, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(read.status, ResponseStatus::Ok);
    assert!(read.dmi_allowed);
    assert_eq!(delay, DEFAULT_LATENCY + DEFAULT_LATENCY);
    assert_eq!((mem.write_ops(), mem.read_ops()), (1, 1));
}

#[test]
fn last_word_is_addressable() {
    let mut mem = memory();
    let mut txn = Transaction::write(0xFC, vec![1, 2, 3, 4]);
    mem.transport(&mut txn, &mut SimTime::ZERO).unwrap();
    assert_eq!(mem.read(0xFC, 4).unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn byte_enables_apply_when_supported() {
    let mut mem = memory().with_byte_enables(true);
    mem.write(0x0, &[0x11, 0x22, 0x33, 0x44], None).unwrap();

    let mut txn = Transaction::write(0x0, vec![0xAA, 0xBB, 0xCC, 0xDD])
        .with_byte_enable(vec![0x00, 0xFF, 0x00, 0xFF]);
    mem.transport(&mut txn, &mut SimTime::ZERO).unwrap();

    assert_eq!(txn.status, ResponseStatus::Ok);
    assert_eq!(mem.read(0x0, 4).unwrap(), vec![0x11, 0xBB, 0x33, 0xDD]);
}

#[test]
fn wider_bus_allows_longer_accesses() {
    let mut mem = memory().with_bus_width(BusWidth::new(8).unwrap());
    let mut txn = Transaction::write(0x8, vec![7; 8]);
    mem.transport(&mut txn, &mut SimTime::ZERO).unwrap();
    assert_eq!(txn.status, ResponseStatus::Ok);
}

// ══════════════════════════════════════════════════════════
// 2. Rejected accesses
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::past_the_end(0xFD)]
#[case::start_past_the_end(0x100)]
#[case::wrapping(u64::MAX)]
fn out_of_range_is_fatal(#[case] address: u64) {
    let mut mem = memory();
    let mut txn = Transaction::read(address, 4);
    let mut delay = SimTime::ZERO;

    let err = mem.transport(&mut txn, &mut delay).unwrap_err();

    assert!(matches!(err, FabricError::AddressOutOfRange { size: 0x100, .. }));
    assert_eq!(txn.status, ResponseStatus::AddressError);
    assert_eq!(delay, SimTime::ZERO);
}

#[rstest]
#[case::longer_than_bus(Transaction::read(0x0, 8), ResponseStatus::BurstError)]
#[case::streaming_narrower_than_length(
    Transaction::read(0x0, 4).with_streaming_width(2),
    ResponseStatus::BurstError
)]
#[case::unsupported_byte_enables(
    Transaction::write(0x0, vec![0; 4]).with_byte_enable(vec![0xFF; 4]),
    ResponseStatus::ByteEnableError
)]
#[case::ignore(
    Transaction::read(0x0, 4).with_command(Command::Ignore),
    ResponseStatus::CommandError
)]
fn reported_errors_leave_the_store_untouched(
    #[case] txn: Transaction,
    #[case] status: ResponseStatus,
) {
    let mut txn = txn;
    let mut mem = memory();
    mem.write(0x0, &[9, 9, 9, 9], None).unwrap();
    let mut delay = SimTime::ZERO;

    mem.transport(&mut txn, &mut delay).unwrap();

    assert_eq!(txn.status, status);
    assert_eq!(delay, SimTime::ZERO);
    assert_eq!(mem.read(0x0, 4).unwrap(), vec![9, 9, 9, 9]);
    assert_eq!((mem.write_ops(), mem.read_ops()), (0, 0));
}

#[test]
fn address_is_checked_before_burst_shape() {
    let mut mem = memory();
    let mut txn = Transaction::read(0x200, 8);
    assert!(mem.transport(&mut txn, &mut SimTime::ZERO).is_err());
    assert_eq!(txn.status, ResponseStatus::AddressError);
}
