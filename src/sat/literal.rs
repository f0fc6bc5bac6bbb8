#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literals over dense variable indices.
//!
//! Input clauses name variables by an arbitrary positive identity (`Variable`).
//! Once an instance is built every literal refers to a dense index in `1..=N`
//! instead, so it can address an [`Assignment`] directly.

use crate::sat::assignment::Assignment;
use core::ops::{Neg, Not};

/// Variable identity as it appears in the input (the magnitude of a signed literal).
pub type Variable = u32;

/// A literal: a dense variable index together with the polarity the clause requires.
///
/// `polarity == true` means the variable must be true, `false` means its
/// negation must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal {
    index: u32,
    polarity: bool,
}

impl Literal {
    /// Creates a literal over the given dense index.
    ///
    /// # Panics
    ///
    /// If `index` does not fit in a `u32`.
    #[must_use]
    pub fn new(index: usize, polarity: bool) -> Self {
        let index = u32::try_from(index).expect("literal index overflowed");
        Self { index, polarity }
    }

    /// The dense index this literal refers to.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// The required value of the variable.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.polarity
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity
    }

    /// The complementary literal.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self {
            index: self.index,
            polarity: !self.polarity,
        }
    }

    /// Whether the literal holds under `assignment`.
    #[must_use]
    pub fn is_satisfied(self, assignment: &Assignment) -> bool {
        assignment[self.index()] == self.polarity
    }

    /// Whether the literal would hold if `flipped` were inverted in `assignment`.
    #[must_use]
    pub fn is_satisfied_if_flipped(self, assignment: &Assignment, flipped: usize) -> bool {
        let value = assignment[self.index()] ^ (self.index() == flipped);
        value == self.polarity
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}
