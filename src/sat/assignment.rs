#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The complete truth assignment (model) mutated by local search.
//!
//! Unlike a backtracking solver's partial assignment, every variable always
//! holds a value here: the search starts from a uniformly random model and
//! only ever changes it one flip at a time.

use crate::sat::error::{Result, SatError};
use bit_vec::BitVec;
use core::ops::Index;

/// A total assignment over dense indices `1..=N`.
///
/// Slot 0 is a sentinel that is never read so that indices line up with the
/// variable numbering used in reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(BitVec);

impl Assignment {
    /// Draws every variable independently and uniformly at random.
    #[must_use]
    pub fn random(num_vars: usize, rng: &mut fastrand::Rng) -> Self {
        let mut bits = BitVec::from_elem(num_vars + 1, false);
        for i in 1..=num_vars {
            bits.set(i, rng.bool());
        }
        Self(bits)
    }

    /// Builds an assignment from the values of indices `1..=values.len()`.
    #[must_use]
    pub fn from_values(values: &[bool]) -> Self {
        let mut bits = BitVec::with_capacity(values.len() + 1);
        bits.push(false);
        bits.extend(values.iter().copied());
        Self(bits)
    }

    /// Number of variables `N` covered by this assignment.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Checked read of the value at `index`.
    ///
    /// # Errors
    ///
    /// `SatError::UnknownVariable` if `index` is not in `1..=N`.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(self.0[index])
    }

    /// Inverts the value at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is past the end of the assignment. Use [`Self::try_flip`]
    /// for indices that come from outside the search.
    pub fn flip(&mut self, index: usize) {
        let value = self.0[index];
        self.0.set(index, !value);
    }

    /// Checked [`Self::flip`].
    ///
    /// # Errors
    ///
    /// `SatError::UnknownVariable` if `index` is not in `1..=N`.
    pub fn try_flip(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.flip(index);
        Ok(())
    }

    /// Iterates `(index, value)` pairs in ascending index order, skipping the sentinel.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.0.iter().enumerate().skip(1)
    }

    /// The values of indices `1..=N` in order.
    #[must_use]
    pub fn values(&self) -> Vec<bool> {
        self.iter().map(|(_, v)| v).collect()
    }

    fn check(&self, index: usize) -> Result<()> {
        if index == 0 || index > self.num_vars() {
            return Err(SatError::UnknownVariable {
                index,
                num_vars: self.num_vars(),
            });
        }
        Ok(())
    }
}

impl Index<usize> for Assignment {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_has_every_index() {
        let mut rng = fastrand::Rng::with_seed(7);
        let assignment = Assignment::random(5, &mut rng);
        assert_eq!(assignment.num_vars(), 5);
        assert_eq!(assignment.iter().count(), 5);
        assert_eq!(assignment.iter().next().map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_random_is_seeded() {
        let a = Assignment::random(64, &mut fastrand::Rng::with_seed(42));
        let b = Assignment::random(64, &mut fastrand::Rng::with_seed(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_flip() {
        let mut assignment = Assignment::from_values(&[true, false, true]);
        assignment.flip(2);
        assert_eq!(assignment.values(), vec![true, true, true]);
        assignment.flip(2);
        assert_eq!(assignment.values(), vec![true, false, true]);
    }

    #[test]
    fn test_checked_access_rejects_sentinel_and_overflow() {
        let mut assignment = Assignment::from_values(&[true, false]);
        assert!(matches!(
            assignment.get(0),
            Err(SatError::UnknownVariable { index: 0, num_vars: 2 })
        ));
        assert!(matches!(
            assignment.try_flip(3),
            Err(SatError::UnknownVariable { index: 3, num_vars: 2 })
        ));
        assert!(assignment.get(2).is_ok_and(|v| !v));
        assert!(assignment.try_flip(2).is_ok());
        assert!(assignment.get(2).is_ok_and(|v| v));
    }

    #[test]
    fn test_empty_assignment() {
        let assignment = Assignment::random(0, &mut fastrand::Rng::with_seed(1));
        assert_eq!(assignment.num_vars(), 0);
        assert!(assignment.values().is_empty());
    }
}
