//! Restart strategies for local search.
//!
//! A restart abandons the current assignment and draws a fresh random one,
//! the classic "max-tries" loop of GSAT and WalkSAT. The flip counter and the
//! overall budget are not reset by a restart.
//!
//! This module provides:
//! - The `Restarter` trait, a countdown consulted once per iteration.
//! - `Never`: keep improving one assignment forever (the base behaviour).
//! - `Fixed`: every try lasts the same number of flips.
//! - `Luby`: try `k` lasts `luby(k) * unit` flips, following the sequence
//!   1, 1, 2, 1, 1, 2, 4, 1, 1, 2, ...

use clap::ValueEnum;
use std::fmt::{Debug, Display};

/// Trait defining the interface for restart strategies.
pub trait Restarter: Debug + Clone {
    /// Number of flips remaining in the current try.
    fn restarts_in(&self) -> usize;

    /// Counts one flip against the current try.
    fn increment_restarts_in(&mut self);

    /// Starts a new try: bumps the restart count and arms the next interval.
    fn restart(&mut self);

    /// Total number of restarts performed so far.
    fn num_restarts(&self) -> usize;

    /// Called once per iteration, before flipping.
    ///
    /// Returns `true` (and arms the next try) when the current try has used
    /// up its flips; otherwise counts the coming flip and returns `false`.
    fn should_restart(&mut self) -> bool {
        if self.restarts_in() == 0 {
            self.restart();
            true
        } else {
            self.increment_restarts_in();
            false
        }
    }
}

/// Never restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Never;

impl Restarter for Never {
    fn restarts_in(&self) -> usize {
        usize::MAX
    }

    fn increment_restarts_in(&mut self) {}

    fn restart(&mut self) {}

    fn num_restarts(&self) -> usize {
        0
    }
}

/// Restarts every `interval` flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed {
    interval: usize,
    restarts_in: usize,
    restarts: usize,
}

impl Fixed {
    #[must_use]
    pub fn new(interval: usize) -> Self {
        let interval = interval.max(1);
        Self {
            interval,
            restarts_in: interval,
            restarts: 0,
        }
    }
}

impl Restarter for Fixed {
    fn restarts_in(&self) -> usize {
        self.restarts_in
    }

    fn increment_restarts_in(&mut self) {
        self.restarts_in = self.restarts_in.saturating_sub(1);
    }

    fn restart(&mut self) {
        self.restarts = self.restarts.wrapping_add(1);
        self.restarts_in = self.interval;
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }
}

/// Restart lengths scaled by the Luby sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Luby {
    unit: usize,
    restarts_in: usize,
    restarts: usize,
}

impl Luby {
    #[must_use]
    pub fn new(unit: usize) -> Self {
        let unit = unit.max(1);
        Self {
            unit,
            restarts_in: unit,
            restarts: 0,
        }
    }

    /// The `i`-th (1-based) element of the Luby sequence.
    #[must_use]
    pub fn luby(mut i: usize) -> usize {
        debug_assert!(i > 0);
        loop {
            let mut k = 1;
            while (1_usize << k) - 1 < i {
                k += 1;
            }
            if (1_usize << k) - 1 == i {
                return 1 << (k - 1);
            }
            i -= (1 << (k - 1)) - 1;
        }
    }
}

impl Restarter for Luby {
    fn restarts_in(&self) -> usize {
        self.restarts_in
    }

    fn increment_restarts_in(&mut self) {
        self.restarts_in = self.restarts_in.saturating_sub(1);
    }

    fn restart(&mut self) {
        self.restarts = self.restarts.wrapping_add(1);
        self.restarts_in = Self::luby(self.restarts + 1).saturating_mul(self.unit);
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }
}

/// Enum dispatch over the restart strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestarterImpls {
    Never(Never),
    Fixed(Fixed),
    Luby(Luby),
}

impl Restarter for RestarterImpls {
    fn restarts_in(&self) -> usize {
        match self {
            Self::Never(r) => r.restarts_in(),
            Self::Fixed(r) => r.restarts_in(),
            Self::Luby(r) => r.restarts_in(),
        }
    }

    fn increment_restarts_in(&mut self) {
        match self {
            Self::Never(r) => r.increment_restarts_in(),
            Self::Fixed(r) => r.increment_restarts_in(),
            Self::Luby(r) => r.increment_restarts_in(),
        }
    }

    fn restart(&mut self) {
        match self {
            Self::Never(r) => r.restart(),
            Self::Fixed(r) => r.restart(),
            Self::Luby(r) => r.restart(),
        }
    }

    fn num_restarts(&self) -> usize {
        match self {
            Self::Never(r) => r.num_restarts(),
            Self::Fixed(r) => r.num_restarts(),
            Self::Luby(r) => r.num_restarts(),
        }
    }
}

/// Which restart strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum RestarterType {
    /// Never restart.
    #[default]
    Never,
    /// Restart every `interval` flips.
    Fixed,
    /// Restart after `luby(k) * interval` flips on try `k`.
    Luby,
}

impl Display for RestarterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "Never"),
            Self::Fixed => write!(f, "Fixed"),
            Self::Luby => write!(f, "Luby"),
        }
    }
}

impl RestarterType {
    /// Converts the `RestarterType` to a concrete `RestarterImpls`.
    #[must_use]
    pub fn to_impl(self, interval: usize) -> RestarterImpls {
        match self {
            Self::Never => RestarterImpls::Never(Never),
            Self::Fixed => RestarterImpls::Fixed(Fixed::new(interval)),
            Self::Luby => RestarterImpls::Luby(Luby::new(interval)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn try_lengths<R: Restarter>(mut r: R, tries: usize) -> Vec<usize> {
        let mut lengths = Vec::new();
        let mut flips = 0;
        while lengths.len() < tries {
            if r.should_restart() {
                lengths.push(flips);
                flips = 0;
            } else {
                flips += 1;
            }
        }
        lengths
    }

    #[test]
    fn test_luby_sequence() {
        let seq: Vec<usize> = (1..=15).map(Luby::luby).collect();
        assert_eq!(seq, vec![1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8]);
    }

    #[test]
    fn test_fixed_try_lengths() {
        let r = Fixed::new(5);
        assert_eq!(try_lengths(r, 3), vec![5, 5, 5]);
    }

    #[test]
    fn test_luby_try_lengths() {
        let r = Luby::new(10);
        assert_eq!(try_lengths(r, 7), vec![10, 10, 20, 10, 10, 20, 40]);
    }

    #[test]
    fn test_never() {
        let mut r = Never;
        assert!((0..10_000).all(|_| !r.should_restart()));
        assert_eq!(r.num_restarts(), 0);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let r = RestarterType::Fixed.to_impl(0);
        assert_eq!(try_lengths(r, 2), vec![1, 1]);
    }

    #[test]
    fn test_restart_count() {
        let mut r = RestarterType::Luby.to_impl(1);
        for _ in 0..20 {
            r.should_restart();
        }
        assert!(r.num_restarts() > 0);
    }
}
