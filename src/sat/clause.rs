//! Clauses as explicit literal lists.
//!
//! A clause keeps every distinct literal it was given. Repeating the same
//! literal is merged, but a variable occurring with both polarities keeps both
//! literals, so `x ∨ ¬x` stays a tautology instead of collapsing into a single
//! polarity constraint.

use crate::sat::assignment::Assignment;
use crate::sat::literal::Literal;
use core::ops::Index;
use itertools::Itertools;
use smallvec::SmallVec;

/// Inline storage for the literals of a clause; 3-SAT and friends never spill.
pub type LiteralStorage = SmallVec<[Literal; 8]>;

/// A disjunction of literals over dense indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    literals: LiteralStorage,
}

impl Clause {
    /// Builds a clause, dropping repeated literals while keeping first-seen order.
    pub fn new<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        Self {
            literals: literals.into_iter().unique().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    /// Distinct variable indices mentioned by the clause.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.literals.iter().map(|l| l.index()).unique()
    }

    /// Whether the clause mentions `index` at all.
    pub fn contains_index(&self, index: usize) -> bool {
        self.literals.iter().any(|l| l.index() == index)
    }

    /// True when the clause contains some literal together with its negation.
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .tuple_combinations()
            .any(|(a, b)| *a == b.negated())
    }

    /// At least one literal agrees with the assignment.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.literals.iter().any(|l| l.is_satisfied(assignment))
    }

    /// [`Self::is_satisfied`] evaluated as if `flipped` were inverted.
    pub fn is_satisfied_if_flipped(&self, assignment: &Assignment, flipped: usize) -> bool {
        self.literals
            .iter()
            .any(|l| l.is_satisfied_if_flipped(assignment, flipped))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self::new(literals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(index: usize, polarity: bool) -> Literal {
        Literal::new(index, polarity)
    }

    #[test]
    fn test_new_merges_repeated_literals() {
        let clause = Clause::new([lit(1, true), lit(2, false), lit(1, true)]);
        assert_eq!(clause.len(), 2);
        assert_eq!(clause[0], lit(1, true));
        assert_eq!(clause[1], lit(2, false));
    }

    #[test]
    fn test_opposite_polarities_are_kept() {
        let clause = Clause::new([lit(1, true), lit(1, false)]);
        assert_eq!(clause.len(), 2);
        assert!(clause.is_tautology());
        assert_eq!(clause.indices().collect::<Vec<_>>(), vec![1]);

        let assignment = Assignment::from_values(&[false]);
        assert!(clause.is_satisfied(&assignment));
        assert!(clause.is_satisfied_if_flipped(&assignment, 1));
    }

    #[test]
    fn test_is_satisfied() {
        let clause = Clause::new([lit(1, true), lit(2, false)]);
        assert!(clause.is_satisfied(&Assignment::from_values(&[true, true])));
        assert!(clause.is_satisfied(&Assignment::from_values(&[false, false])));
        assert!(!clause.is_satisfied(&Assignment::from_values(&[false, true])));
    }

    #[test]
    fn test_is_satisfied_if_flipped_leaves_assignment_alone() {
        let clause = Clause::new([lit(1, true), lit(2, false)]);
        let assignment = Assignment::from_values(&[false, true]);
        let before = assignment.clone();
        assert!(clause.is_satisfied_if_flipped(&assignment, 1));
        assert!(clause.is_satisfied_if_flipped(&assignment, 2));
        assert!(!clause.is_satisfied_if_flipped(&assignment, 3));
        assert_eq!(assignment, before);
    }

    #[test]
    fn test_unit_and_contains() {
        let clause: Clause = vec![lit(3, false)].into();
        assert!(clause.is_unit());
        assert!(clause.contains_index(3));
        assert!(!clause.contains_index(1));
        assert!(!clause.is_tautology());
    }
}
