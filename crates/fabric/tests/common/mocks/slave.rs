use busfab_core::common::Result;
use busfab_core::soc::bridge::signals::{MasterSignals, SlaveSignals};
use busfab_core::soc::memory::sparse::WordStore;
use busfab_core::soc::traits::HandshakeSlave;
use mockall::mock;

mock! {
    pub Clocked {
        pub fn on_clock(&mut self, inputs: &MasterSignals) -> Result<SlaveSignals>;
    }
}

/// A named handshake slave forwarding every edge to a mock.
pub struct MockSlave {
    pub mock: MockClocked,
}

impl MockSlave {
    /// A slave that never acknowledges anything.
    pub fn never_ack() -> Self {
        let mut mock = MockClocked::new();
        let _ = mock
            .expect_on_clock()
            .returning(|_| Ok(SlaveSignals::default()));
        Self { mock }
    }
}

impl HandshakeSlave for MockSlave {
    fn name(&self) -> &str {
        "mock_slave"
    }

    fn on_clock(&mut self, inputs: &MasterSignals) -> Result<SlaveSignals> {
        self.mock.on_clock(inputs)
    }
}

/// Wraps a `WordStore` and records the master outputs of every acknowledged beat.
pub struct RecordingSlave {
    pub store: WordStore,
    pub beats: Vec<MasterSignals>,
}

impl RecordingSlave {
    pub fn new(size_words: u64) -> Self {
        Self {
            store: WordStore::new("RAM", size_words),
            beats: Vec::new(),
        }
    }
}

impl HandshakeSlave for RecordingSlave {
    fn name(&self) -> &str {
        "recording_slave"
    }

    fn on_clock(&mut self, inputs: &MasterSignals) -> Result<SlaveSignals> {
        let out = self.store.on_clock(inputs)?;
        if out.ack {
            self.beats.push(*inputs);
        }
        Ok(out)
    }
}
