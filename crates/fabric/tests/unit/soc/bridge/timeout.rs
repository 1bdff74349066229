//! Acknowledge timeout tests.

use busfab_core::common::{FabricError, LaneWord, SimTime, Transaction};
use busfab_core::sim::Initiator;
use busfab_core::soc::bridge::{BridgeState, DEFAULT_TIMEOUT, WishboneBridge};
use rstest::rstest;

use crate::common::harness::{bridged_ram, init_tracing};
use crate::common::mocks::slave::MockSlave;

#[rstest]
#[case(1)]
#[case(3)]
#[case(DEFAULT_TIMEOUT)]
fn silent_slave_times_out_after_exactly_k_wait_cycles(#[case] k: u32) {
    init_tracing();
    let mut bridge = WishboneBridge::new("bridge", MockSlave::never_ack());
    bridge.set_timeout(k);
    let mut txn = Transaction::write(0x20, vec![1, 2, 3, 4]);
    let mut delay = SimTime::ZERO;

    let err = bridge.submit(&mut txn, &mut delay).unwrap_err();

    match err {
        FabricError::ProtocolTimeout { cycles, address } => {
            assert_eq!(cycles, k);
            assert_eq!(address, 0x20);
        }
        other => panic!("expected a protocol timeout, got {other}"),
    }
    // One edge to issue the beat, then k wait cycles.
    assert_eq!(bridge.cycles(), u64::from(k) + 1);
    assert_eq!(bridge.state(), BridgeState::Idle);
    assert!(!bridge.master_signals().request());
}

#[test]
fn one_cycle_timeout_is_too_short_for_a_registered_slave() {
    let mut bridge = bridged_ram();
    bridge.set_timeout(1);
    let mut init = Initiator::new("init");

    let err = init.write_word(&mut bridge, 0x20, 0xBABE_CAFE).unwrap_err();
    assert!(matches!(err, FabricError::ProtocolTimeout { cycles: 1, .. }));
}

#[test]
fn two_cycle_timeout_is_enough() {
    let mut bridge = bridged_ram().with_timeout(2);
    let mut init = Initiator::new("init");

    let _ = init.write_word(&mut bridge, 0x20, 0xBABE_CAFE).unwrap();
    assert_eq!(init.read_word(&mut bridge, 0x20).unwrap(), 0xBABE_CAFE);
}

#[test]
fn bridge_recovers_after_a_timeout() {
    let mut bridge = bridged_ram();
    bridge.set_timeout(1);
    let mut init = Initiator::new("init");
    assert!(init.write_word(&mut bridge, 0x0, 1).is_err());

    bridge.set_timeout(DEFAULT_TIMEOUT);
    let _ = init.write_word(&mut bridge, 0x0, 0x1234).unwrap();
    assert_eq!(init.read_word(&mut bridge, 0x0).unwrap(), 0x1234);
}

#[test]
fn timed_out_write_is_not_committed() {
    let mut bridge = bridged_ram().with_timeout(1);
    let mut init = Initiator::new("init");

    assert!(init.write_word(&mut bridge, 0x0, 0x0403_0201).is_err());

    assert_eq!(bridge.slave().peek(0), LaneWord::UNDEFINED);
    assert_eq!(bridge.slave().write_ops(), 0);
}

#[test]
fn timeout_after_a_timeout_matches_a_fresh_bridge() {
    let mut bridge = bridged_ram().with_timeout(1);
    let mut init = Initiator::new("init");
    assert!(init.write_word(&mut bridge, 0x0, 0x0403_0201).is_err());

    bridge.set_timeout(2);
    let _ = init.write_word(&mut bridge, 0x4, 0x0807_0605).unwrap();

    let mut fresh = bridged_ram().with_timeout(2);
    let _ = init.write_word(&mut fresh, 0x4, 0x0807_0605).unwrap();
    assert_eq!(bridge.slave().peek(1), fresh.slave().peek(1));
    assert_eq!(bridge.state(), BridgeState::Idle);
}
