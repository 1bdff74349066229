//! Debug path and direct memory access tests.
//!
//! The debug path clips at the end of the store instead of failing. Direct-access handles share
//! the store with the protocol path and stop working once the store is resized.

use busfab_core::common::{FabricError, SimTime, Transaction};
use busfab_core::soc::memory::Memory;
use busfab_core::soc::memory::dmi::DmiAccess;
use busfab_core::soc::traits::Target;
use pretty_assertions::assert_eq;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Debug transport
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::inside(0x10, 8, 8)]
#[case::clipped(0xFC, 8, 4)]
#[case::at_end(0x100, 4, 0)]
#[case::beyond_end(0x1000, 4, 0)]
fn debug_read_clips_to_store(#[case] address: u64, #[case] length: u32, #[case] moved: usize) {
    let mut mem = Memory::new("ram", 0x100);
    let mut txn = Transaction::read(address, length);
    assert_eq!(mem.debug_transport(&mut txn), moved);
}

#[test]
fn debug_write_is_visible_on_the_protocol_path() {
    let mut mem = Memory::new("ram", 0x100);
    let mut poke = Transaction::write(0xFE, vec![0xAB, 0xCD, 0xEF, 0x01]);
    assert_eq!(mem.debug_transport(&mut poke), 2);

    let mut read = Transaction::read(0xFC, 4);
    mem.transport(&mut read, &mut SimTime::ZERO).unwrap();
    assert_eq!(read.data, vec![0, 0, 0xAB, 0xCD]);
    assert_eq!(mem.write_ops(), 0);
}

#[test]
fn debug_path_takes_no_time() {
    let mut mem = Memory::new("ram", 0x100);
    let mut txn = Transaction::read(0x0, 4);
    let _ = mem.debug_transport(&mut txn);
    assert_eq!(mem.read_ops(), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Direct memory interface
// ══════════════════════════════════════════════════════════

#[test]
fn handle_covers_whole_store_with_access_latency() {
    let mut mem = Memory::new("ram", 0x100).with_latency(SimTime::ns(7));
    let handle = mem.direct_access(0x40).unwrap();

    assert_eq!(handle.start_address(), 0);
    assert_eq!(handle.end_address(), 0xFF);
    assert_eq!(handle.read_latency(), SimTime::ns(7));
    assert_eq!(handle.write_latency(), SimTime::ns(7));
    assert_eq!(handle.access(), DmiAccess::ReadWrite);
    assert!(handle.is_valid());
}

#[test]
fn no_handle_outside_the_store() {
    let mut mem = Memory::new("ram", 0x100);
    assert!(mem.direct_access(0x100).is_none());
}

#[test]
fn direct_and_protocol_paths_share_the_store() {
    let mut mem = Memory::new("ram", 0x100);
    let handle = mem.direct_access(0).unwrap();

    let latency = handle.write(0x20, &[1, 2, 3, 4]).unwrap();
    assert_eq!(latency, mem.latency());
    let mut read = Transaction::read(0x20, 4);
    mem.transport(&mut read, &mut SimTime::ZERO).unwrap();
    assert_eq!(read.data, vec![1, 2, 3, 4]);

    let mut write = Transaction::write(0x30, vec![5, 6, 7, 8]);
    mem.transport(&mut write, &mut SimTime::ZERO).unwrap();
    let mut out = [0u8; 4];
    let _ = handle.read(0x30, &mut out).unwrap();
    assert_eq!(out, [5, 6, 7, 8]);
}

#[test]
fn handle_rejects_accesses_outside_its_window() {
    let mut mem = Memory::new("ram", 0x100);
    let handle = mem.direct_access(0).unwrap();
    let err = handle.write(0xFE, &[0; 4]).unwrap_err();
    assert!(matches!(err, FabricError::DmiOutOfWindow { address: 0xFE, .. }));
}

#[test]
fn resize_invalidates_granted_handles() {
    let mut mem = Memory::new("ram", 0x100);
    mem.write(0x0, &[0xAA; 4], None).unwrap();
    let stale = mem.direct_access(0).unwrap();

    mem.resize(0x200);

    assert!(!stale.is_valid());
    let mut out = [0u8; 4];
    assert!(matches!(
        stale.read(0x0, &mut out),
        Err(FabricError::DmiInvalidated { start: 0, end: 0xFF })
    ));

    let fresh = mem.direct_access(0x1FF).unwrap();
    assert_eq!(fresh.end_address(), 0x1FF);
    let _ = fresh.read(0x0, &mut out).unwrap();
    assert_eq!(out, [0xAA; 4]);
}
