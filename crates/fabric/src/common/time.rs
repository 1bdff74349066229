//! Simulated time.

use std::fmt;
use std::ops::{Add, AddAssign, Mul};

/// A span or point of simulated time with picosecond resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(u64);

impl SimTime {
    /// Zero time; the initial value of every annotated delay.
    pub const ZERO: Self = Self(0);

    /// Creates a time from picoseconds.
    pub const fn ps(ps: u64) -> Self {
        Self(ps)
    }

    /// Creates a time from nanoseconds.
    pub const fn ns(ns: u64) -> Self {
        Self(ns.saturating_mul(1_000))
    }

    /// Returns the time in picoseconds.
    pub const fn as_ps(self) -> u64 {
        self.0
    }

    /// Returns the time in whole nanoseconds (truncating).
    pub const fn as_ns(self) -> u64 {
        self.0 / 1_000
    }
}

impl Add for SimTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<u64> for SimTime {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1_000 == 0 {
            write!(f, "{} ns", self.0 / 1_000)
        } else {
            write!(f, "{} ps", self.0)
        }
    }
}
