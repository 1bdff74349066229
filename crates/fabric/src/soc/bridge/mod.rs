//! Transaction-to-handshake protocol bridge.
//!
//! This module converts atomic transactions into timed request/acknowledge beats. It provides:
//! 1. **State machine:** `Idle → Executing{Write,Read} → WaitingForAck → (Idle | next beat)`.
//! 2. **Burst splitting:** A streaming width of `n` beats produces `n` handshakes at consecutive
//!    word addresses.
//! 3. **Byte masking:** Disabled write lanes are driven as don't-care with their select bit clear.
//! 4. **Timeout:** A beat that is not acknowledged within the configured cycles aborts the run.
//!
//! The bridge owns the clock edge of its bus. Each [`WishboneBridge::tick`] is one rising edge:
//! master and slave both evaluate against the values settled at the previous edge, then both
//! outputs update together.

/// Signal bundles of the handshake interface.
pub mod signals;

use tracing::{debug, error, trace, warn};

use self::signals::{MasterSignals, SlaveSignals};
use crate::common::{
    BusWidth, Command, FabricError, LaneWord, ResponseStatus, Result, SimTime, Transaction,
};
use crate::config::BusConfig;
use crate::soc::traits::{HandshakeSlave, Target};

/// Default acknowledge timeout in wait cycles.
pub const DEFAULT_TIMEOUT: u32 = 10;

/// Byte written into a read buffer for lanes the slave returned as unknown.
pub const UNDEFINED_FILL: u8 = 0xFF;

/// Bridge state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeState {
    /// No transaction in flight.
    Idle,
    /// Drive the next write beat on the coming edge.
    ExecutingWrite,
    /// Drive the next read beat on the coming edge.
    ExecutingRead,
    /// A beat is on the bus; waiting for the slave to acknowledge it.
    WaitingForAck,
}

/// Outcome of advancing the bridge by one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    /// The transaction still has beats outstanding.
    Pending,
    /// The transaction finished (or the bridge was idle).
    Complete,
}

/// Per-transaction cursor state; exists only while a transaction is in flight.
#[derive(Clone, Copy, Debug)]
struct BeatState {
    direction: Command,
    current_address: u64,
    remaining_width: u32,
    data_cursor: usize,
    byte_enable_cursor: usize,
    elapsed_wait_cycles: u32,
}

/// Bridge from the transaction level onto a clocked handshake slave.
#[derive(Debug)]
pub struct WishboneBridge<S> {
    name: String,
    width: BusWidth,
    clock_period: SimTime,
    timeout: u32,
    state: BridgeState,
    beat: Option<BeatState>,
    master: MasterSignals,
    slave_out: SlaveSignals,
    slave: S,
    cycles: u64,
}

impl<S: HandshakeSlave> WishboneBridge<S> {
    /// Creates a 32-bit bridge with a 1 ns clock and the default timeout.
    pub fn new(name: impl Into<String>, slave: S) -> Self {
        Self {
            name: name.into(),
            width: BusWidth::W32,
            clock_period: SimTime::ns(1),
            timeout: DEFAULT_TIMEOUT,
            state: BridgeState::Idle,
            beat: None,
            master: MasterSignals::default(),
            slave_out: SlaveSignals::default(),
            slave,
            cycles: 0,
        }
    }

    /// Creates a bridge from bus configuration, validating the bus width.
    pub fn from_config(name: impl Into<String>, config: &BusConfig, slave: S) -> Result<Self> {
        let width = BusWidth::new(config.width_bytes)?;
        Ok(Self::new(name, slave)
            .with_bus_width(width)
            .with_clock_period(SimTime::ns(config.clock_period_ns))
            .with_timeout(config.ack_timeout))
    }

    /// Sets the data bus width (and therefore the beat size).
    #[must_use]
    pub fn with_bus_width(mut self, width: BusWidth) -> Self {
        self.width = width;
        self
    }

    /// Sets the period of one clock edge.
    #[must_use]
    pub fn with_clock_period(mut self, period: SimTime) -> Self {
        self.clock_period = period;
        self
    }

    /// Sets the acknowledge timeout in wait cycles.
    #[must_use]
    pub fn with_timeout(mut self, cycles: u32) -> Self {
        self.timeout = cycles;
        self
    }

    /// Changes the acknowledge timeout; takes effect from the next wait cycle.
    pub fn set_timeout(&mut self, cycles: u32) {
        self.timeout = cycles;
    }

    /// Returns the acknowledge timeout in wait cycles.
    pub const fn timeout(&self) -> u32 {
        self.timeout
    }

    /// Returns the current state.
    pub const fn state(&self) -> BridgeState {
        self.state
    }

    /// Returns the bus width.
    pub const fn bus_width(&self) -> BusWidth {
        self.width
    }

    /// Returns the number of edges clocked since construction.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns the master outputs settled at the last edge.
    pub const fn master_signals(&self) -> &MasterSignals {
        &self.master
    }

    /// Returns the attached slave.
    pub const fn slave(&self) -> &S {
        &self.slave
    }

    /// Runs `txn` to completion, adding the elapsed clock time to `delay`.
    ///
    /// Blocks (in simulated time) across every beat. Fatal conditions return `Err` and leave
    /// the bridge idle; reported conditions set `txn.status` without driving any beat.
    pub fn submit(&mut self, txn: &mut Transaction, delay: &mut SimTime) -> Result<()> {
        let start = self.cycles;
        let mut status = self.begin(txn)?;
        while status == TickStatus::Pending {
            status = self.tick(txn)?;
        }
        *delay += self.clock_period * (self.cycles - start);
        Ok(())
    }

    /// Accepts `txn` and schedules its first beat for the next edge.
    ///
    /// Returns [`TickStatus::Complete`] when the transaction was rejected with an error status
    /// and no beat will be driven.
    pub fn begin(&mut self, txn: &mut Transaction) -> Result<TickStatus> {
        if self.state != BridgeState::Idle {
            return Err(FabricError::BridgeBusy {
                bridge: self.name.clone(),
            });
        }

        let next_state = match txn.command {
            Command::Write => BridgeState::ExecutingWrite,
            Command::Read => BridgeState::ExecutingRead,
            command @ Command::Ignore => {
                txn.status = ResponseStatus::CommandError;
                error!(bridge = %self.name, %command, "received an unsupported command");
                return Err(FabricError::UnsupportedCommand { command });
            }
        };

        if txn.streaming_width == 0 {
            warn!(
                bridge = %self.name,
                length = txn.length,
                "a streaming width of 0 is invalid; using the data length and proceeding"
            );
            txn.streaming_width = txn.length;
        }

        let beat_size = self.width.bytes();
        if txn.length == 0
            || txn.length > beat_size
            || txn.streaming_width % beat_size != 0
            || txn.data.len() < txn.streaming_width as usize
        {
            debug!(
                bridge = %self.name,
                length = txn.length,
                width = txn.streaming_width,
                "burst shape not supported by a {beat_size}-byte bus"
            );
            txn.status = ResponseStatus::BurstError;
            return Ok(TickStatus::Complete);
        }

        self.beat = Some(BeatState {
            direction: txn.command,
            current_address: txn.address,
            remaining_width: txn.streaming_width,
            data_cursor: 0,
            byte_enable_cursor: 0,
            elapsed_wait_cycles: 0,
        });
        self.state = next_state;
        Ok(TickStatus::Pending)
    }

    /// Clocks one rising edge for the transaction in flight.
    ///
    /// `txn` must be the transaction passed to [`WishboneBridge::begin`]; a buffer too short
    /// for the beats still outstanding fails with [`FabricError::BridgeBusy`] and aborts.
    ///
    /// With the bridge idle the edge still clocks the slave and reports
    /// [`TickStatus::Complete`].
    pub fn tick(&mut self, txn: &mut Transaction) -> Result<TickStatus> {
        let from_slave = self.slave_out;
        let to_slave = self.master;
        self.cycles += 1;

        // A failing edge aborts before the slave sees it, so nothing is committed.
        let (master, status) = match self.step(&from_slave, txn) {
            Ok(next) => next,
            Err(e) => {
                self.abort();
                return Err(e);
            }
        };
        match self.slave.on_clock(&to_slave) {
            Ok(slave_next) => self.slave_out = slave_next,
            Err(e) => {
                self.abort();
                return Err(e);
            }
        }
        self.master = master;
        Ok(status)
    }

    /// Computes the master outputs for this edge from the slave outputs of the previous one.
    fn step(
        &mut self,
        from_slave: &SlaveSignals,
        txn: &mut Transaction,
    ) -> Result<(MasterSignals, TickStatus)> {
        let Some(mut beat) = self.beat else {
            return Ok((self.master, TickStatus::Complete));
        };
        if txn.data.len() < beat.data_cursor + beat.remaining_width as usize {
            error!(
                bridge = %self.name,
                buffer = txn.data.len(),
                "edge clocked with a transaction other than the one in flight"
            );
            return Err(FabricError::BridgeBusy {
                bridge: self.name.clone(),
            });
        }

        match self.state {
            BridgeState::Idle => Ok((self.master, TickStatus::Complete)),
            BridgeState::ExecutingWrite | BridgeState::ExecutingRead => {
                let master = self.drive_beat(&beat, txn);
                trace!(
                    bridge = %self.name,
                    address = beat.current_address,
                    we = master.we,
                    sel = master.sel,
                    "beat issued"
                );
                beat.elapsed_wait_cycles = 0;
                self.beat = Some(beat);
                self.state = BridgeState::WaitingForAck;
                Ok((master, TickStatus::Pending))
            }
            BridgeState::WaitingForAck if from_slave.ack => {
                let mut master = self.master;
                master.cyc = false;
                master.stb = false;
                master.we = false;
                master.sel = 0;

                if beat.direction == Command::Read {
                    self.capture_read(&beat, from_slave.dat, txn);
                }

                let beat_size = self.width.bytes();
                beat.remaining_width -= beat_size;
                if beat.remaining_width == 0 {
                    txn.status = ResponseStatus::Ok;
                    self.beat = None;
                    self.state = BridgeState::Idle;
                    return Ok((master, TickStatus::Complete));
                }

                beat.current_address += u64::from(beat_size);
                beat.data_cursor += beat_size as usize;
                beat.byte_enable_cursor += beat_size as usize;
                self.beat = Some(beat);
                self.state = if beat.direction == Command::Write {
                    BridgeState::ExecutingWrite
                } else {
                    BridgeState::ExecutingRead
                };
                Ok((master, TickStatus::Pending))
            }
            BridgeState::WaitingForAck => {
                beat.elapsed_wait_cycles += 1;
                if beat.elapsed_wait_cycles >= self.timeout {
                    error!(
                        bridge = %self.name,
                        address = beat.current_address,
                        cycles = beat.elapsed_wait_cycles,
                        "acknowledge not received"
                    );
                    return Err(FabricError::ProtocolTimeout {
                        cycles: beat.elapsed_wait_cycles,
                        address: beat.current_address,
                    });
                }
                self.beat = Some(beat);
                Ok((self.master, TickStatus::Pending))
            }
        }
    }

    /// Builds the request for the beat at the current cursors.
    fn drive_beat(&self, beat: &BeatState, txn: &Transaction) -> MasterSignals {
        let mut master = MasterSignals {
            cyc: true,
            stb: true,
            we: beat.direction == Command::Write,
            adr: beat.current_address / u64::from(self.width.bytes()),
            dat: LaneWord::UNDEFINED,
            sel: 0,
        };
        if master.we {
            for lane in 0..self.width.lanes() {
                if txn.byte_enabled(beat.byte_enable_cursor + lane) {
                    master.dat = master.dat.with_lane(lane, txn.data[beat.data_cursor + lane]);
                    master.sel |= 1 << lane;
                }
            }
        }
        master
    }

    fn capture_read(&self, beat: &BeatState, word: LaneWord, txn: &mut Transaction) {
        let mut unknown = 0u8;
        for lane in 0..self.width.lanes() {
            txn.data[beat.data_cursor + lane] = word.lane(lane).unwrap_or_else(|| {
                unknown |= 1 << lane;
                UNDEFINED_FILL
            });
        }
        if unknown != 0 {
            debug!(
                bridge = %self.name,
                address = beat.current_address,
                lanes = unknown,
                "read returned undefined lanes"
            );
        }
    }

    /// Drops the transaction in flight and releases the bus.
    fn abort(&mut self) {
        self.beat = None;
        self.state = BridgeState::Idle;
        self.master = MasterSignals::default();
        self.slave_out = SlaveSignals::default();
        self.slave.reset();
    }
}

impl<S: HandshakeSlave> Target for WishboneBridge<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transport(&mut self, txn: &mut Transaction, delay: &mut SimTime) -> Result<()> {
        self.submit(txn, delay)
    }
}
