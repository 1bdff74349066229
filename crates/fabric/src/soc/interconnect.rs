//! Address-decoding transaction router.
//!
//! This module implements the interconnect between initiators and targets. It provides:
//! 1. **Route table:** One `[base, top)` entry with a post-decode mask per target index, fixed
//!    once the first transaction is routed.
//! 2. **Decode:** First matching entry in index order wins; the forwarded address is
//!    `address & mask`.
//! 3. **Forwarding:** Blocking and debug transport to the selected target, with per-target
//!    counters and an optional injected transaction log.
//! 4. **Ports:** Per-initiator upstream ports that tag transactions with the initiator id.

use tracing::{debug, error};

use crate::common::{Command, FabricError, ResponseStatus, Result, SimTime, Transaction};
use crate::config::{OverlapPolicy, RouteConfig};
use crate::soc::memory::Memory;
use crate::soc::traits::Target;
use crate::trace::{LogRecord, TransactionLog};

/// Address range and post-decode mask for one target index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// First address of the range.
    pub base: u64,
    /// First address past the range.
    pub top: u64,
    /// Mask applied to the address before forwarding.
    pub mask: u64,
}

impl RouteEntry {
    /// Creates an entry for `[base, top)` forwarding `address & mask`.
    pub const fn new(base: u64, top: u64, mask: u64) -> Self {
        Self { base, top, mask }
    }

    /// Returns `true` if `address` falls inside the range.
    pub const fn contains(&self, address: u64) -> bool {
        address >= self.base && address < self.top
    }

    /// Returns `true` if the two ranges share an address.
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.base < other.top && other.base < self.top
    }
}

impl From<RouteConfig> for RouteEntry {
    fn from(config: RouteConfig) -> Self {
        Self::new(config.base, config.top, config.mask)
    }
}

/// Completed accesses forwarded to one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetStats {
    /// Reads completed with an OK status.
    pub reads: u64,
    /// Writes completed with an OK status.
    pub writes: u64,
}

/// Router connecting any number of initiators to a fixed set of targets.
pub struct Router {
    name: String,
    targets: Vec<Box<dyn Target>>,
    routes: Vec<Option<RouteEntry>>,
    stats: Vec<TargetStats>,
    policy: OverlapPolicy,
    sealed: bool,
    local_time: SimTime,
    log: Option<TransactionLog>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.targets.iter().map(|t| t.name()).collect();
        f.debug_struct("Router")
            .field("name", &self.name)
            .field("targets", &names)
            .field("routes", &self.routes)
            .field("policy", &self.policy)
            .field("sealed", &self.sealed)
            .field("local_time", &self.local_time)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Creates a router bound to `targets`; every index starts without a route.
    pub fn new(name: impl Into<String>, targets: Vec<Box<dyn Target>>) -> Self {
        let count = targets.len();
        Self {
            name: name.into(),
            targets,
            routes: vec![None; count],
            stats: vec![TargetStats::default(); count],
            policy: OverlapPolicy::default(),
            sealed: false,
            local_time: SimTime::ZERO,
            log: None,
        }
    }

    /// Sets the overlap policy applied by later calls to [`Router::set_route_entry`].
    #[must_use]
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Injects the transaction log.
    #[must_use]
    pub fn with_log(mut self, log: TransactionLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Returns the router name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of bound targets.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` once a transaction has been routed.
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns the sum of the delays annotated by every routed transaction.
    pub const fn local_time(&self) -> SimTime {
        self.local_time
    }

    /// Returns the route entry of `index`, if configured.
    pub fn route_entry(&self, index: usize) -> Option<RouteEntry> {
        self.routes.get(index).copied().flatten()
    }

    /// Returns the counters of target `index`.
    pub fn stats(&self, index: usize) -> Option<TargetStats> {
        self.stats.get(index).copied()
    }

    /// Returns target `index`.
    pub fn target(&self, index: usize) -> Option<&dyn Target> {
        self.targets.get(index).map(AsRef::as_ref)
    }

    /// Returns target `index` mutably.
    pub fn target_mut(&mut self, index: usize) -> Option<&mut (dyn Target + 'static)> {
        self.targets.get_mut(index).map(AsMut::as_mut)
    }

    /// Returns target `index` if it is a dense memory.
    pub fn memory(&self, index: usize) -> Option<&Memory> {
        self.target(index).and_then(|t| t.as_memory())
    }

    /// Returns the injected transaction log.
    pub fn log_mut(&mut self) -> Option<&mut TransactionLog> {
        self.log.as_mut()
    }

    /// Configures the address range of target `index`.
    ///
    /// Only valid before the first routed transaction.
    pub fn set_route_entry(&mut self, index: usize, entry: RouteEntry) -> Result<()> {
        if self.sealed {
            return Err(FabricError::RouterSealed {
                router: self.name.clone(),
            });
        }
        if index >= self.targets.len() {
            return Err(FabricError::InvalidTargetIndex {
                index,
                count: self.targets.len(),
            });
        }
        if entry.base >= entry.top {
            return Err(FabricError::InvalidRoute {
                index,
                base: entry.base,
                top: entry.top,
            });
        }
        if self.policy == OverlapPolicy::Reject {
            let clash = self
                .routes
                .iter()
                .enumerate()
                .find(|(i, r)| *i != index && r.is_some_and(|r| r.overlaps(&entry)));
            if let Some((other, _)) = clash {
                return Err(FabricError::RouteOverlap { index, other });
            }
        }

        debug!(
            router = %self.name,
            index,
            base = entry.base,
            top = entry.top,
            mask = entry.mask,
            "route configured"
        );
        self.routes[index] = Some(entry);
        Ok(())
    }

    /// Selects the target for `address` and returns it with the forwarded address.
    pub fn decode_address(&self, address: u64) -> Result<(usize, u64)> {
        self.routes
            .iter()
            .enumerate()
            .find_map(|(i, r)| {
                r.filter(|r| r.contains(address))
                    .map(|r| (i, address & r.mask))
            })
            .ok_or(FabricError::AddressDecode { address })
    }

    fn decode_for(&mut self, txn: &mut Transaction) -> Result<usize> {
        self.sealed = true;
        match self.decode_address(txn.address) {
            Ok((index, masked)) => {
                txn.address = masked;
                Ok(index)
            }
            Err(e) => {
                error!(
                    router = %self.name,
                    address = txn.address,
                    "address does not match any defined subspace"
                );
                txn.status = ResponseStatus::AddressError;
                Err(e)
            }
        }
    }

    /// Forwards `txn` from initiator `initiator_id` to the target owning its address.
    ///
    /// The transaction leaves with its address rewritten into target-local space.
    pub fn route(
        &mut self,
        initiator_id: usize,
        txn: &mut Transaction,
        delay: &mut SimTime,
    ) -> Result<()> {
        let address = txn.address;
        let index = self.decode_for(txn)?;

        let before = *delay;
        self.targets[index].transport(txn, delay)?;
        if let Some(elapsed) = delay.as_ps().checked_sub(before.as_ps()) {
            self.local_time += SimTime::ps(elapsed);
        }

        if txn.status == ResponseStatus::Ok {
            let stats = &mut self.stats[index];
            match txn.command {
                Command::Read => stats.reads += 1,
                Command::Write => stats.writes += 1,
                Command::Ignore => {}
            }
        }

        debug!(
            router = %self.name,
            initiator = initiator_id,
            target = index,
            address,
            command = %txn.command,
            status = %txn.status,
            "transaction routed"
        );

        if let Some(log) = self.log.as_mut() {
            log.record(&LogRecord {
                time: self.local_time,
                target: index,
                initiator: initiator_id,
                address,
                txn,
            })?;
        }
        Ok(())
    }

    /// Forwards a debug transaction, returning the number of bytes the target moved.
    pub fn debug_route(&mut self, txn: &mut Transaction) -> Result<usize> {
        let index = self.decode_for(txn)?;
        Ok(self.targets[index].debug_transport(txn))
    }

    /// Returns the upstream port for initiator `initiator_id`.
    pub fn port(&mut self, initiator_id: usize) -> RouterPort<'_> {
        RouterPort {
            router: self,
            id: initiator_id,
        }
    }
}

/// Upstream side of the router as seen by one initiator.
#[derive(Debug)]
pub struct RouterPort<'a> {
    router: &'a mut Router,
    id: usize,
}

impl RouterPort<'_> {
    /// Returns the initiator id this port tags transactions with.
    pub const fn id(&self) -> usize {
        self.id
    }
}

impl Target for RouterPort<'_> {
    fn name(&self) -> &str {
        self.router.name()
    }

    fn transport(&mut self, txn: &mut Transaction, delay: &mut SimTime) -> Result<()> {
        self.router.route(self.id, txn, delay)
    }

    fn debug_transport(&mut self, txn: &mut Transaction) -> usize {
        self.router.debug_route(txn).unwrap_or(0)
    }
}
