use busfab_core::common::SimTime;
use busfab_core::soc::bridge::WishboneBridge;
use busfab_core::soc::interconnect::{RouteEntry, Router};
use busfab_core::soc::memory::Memory;
use busfab_core::soc::memory::sparse::{DEFAULT_SIZE_WORDS, WordStore};
use busfab_core::soc::traits::Target;
use busfab_core::trace::{SharedBuffer, TransactionLog};

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A bridge in front of a 0x100-word sparse RAM, as used by most bridge tests.
pub fn bridged_ram() -> WishboneBridge<WordStore> {
    init_tracing();
    WishboneBridge::new("bridge", WordStore::new("RAM", DEFAULT_SIZE_WORDS))
}

/// Routes `[0,0x100)`, `[0x1000,0x1100)` and `[0x10000,0x10100)` to three dense memories.
///
/// Each route masks the address down to its 0x100-byte window.
pub struct ThreeTargetFabric {
    pub router: Router,
    pub log: SharedBuffer,
}

impl ThreeTargetFabric {
    pub const RANGES: [(u64, u64); 3] = [(0x0, 0x100), (0x1000, 0x1100), (0x10000, 0x10100)];

    pub fn new() -> Self {
        init_tracing();
        let targets: Vec<Box<dyn Target>> = (0..3)
            .map(|i| {
                Box::new(Memory::new(format!("mem{i}"), 0x100).with_latency(SimTime::ns(10)))
                    as Box<dyn Target>
            })
            .collect();
        let (log, buffer) = TransactionLog::in_memory();
        let mut router = Router::new("router", targets).with_log(log);
        for (i, (base, top)) in Self::RANGES.iter().enumerate() {
            router
                .set_route_entry(i, RouteEntry::new(*base, *top, 0xFF))
                .unwrap();
        }
        Self {
            router,
            log: buffer,
        }
    }
}

impl Default for ThreeTargetFabric {
    fn default() -> Self {
        Self::new()
    }
}
