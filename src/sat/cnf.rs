#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The CNF instance searched by the local search engine.
//!
//! A [`Cnf`] is built once from signed-integer clauses and is read-only
//! afterwards. Building it fixes a bijection between the variable identities
//! of the input and dense indices `1..=N` (assigned in ascending identity
//! order), translates every clause onto those indices and records, for each
//! index, the clauses it occurs in.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::error::{MalformedReason, Result, SatError};
use crate::sat::literal::{Literal, Variable};
use core::ops::{Index, Range};
use itertools::Itertools;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::fmt::Display;

/// An immutable CNF formula over dense variable indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    clauses: Vec<Clause>,
    /// `variables[i]` is the input identity of index `i`; slot 0 is an unused sentinel.
    variables: Vec<Variable>,
    indices: FxHashMap<Variable, usize>,
    /// `occurrences[i]` lists the clauses mentioning index `i`.
    occurrences: Vec<Vec<usize>>,
}

impl Cnf {
    /// Builds an instance from clauses of non-zero signed integers.
    ///
    /// # Errors
    ///
    /// `SatError::MalformedClause` if any clause is empty, contains `0`, or
    /// contains `i32::MIN` (whose magnitude has no positive `i32`).
    /// Nothing is constructed in that case.
    pub fn new<I, C>(clauses: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[i32]>,
    {
        let raw = clauses.into_iter().collect_vec();

        for (i, clause) in raw.iter().enumerate() {
            let clause = clause.as_ref();
            if clause.is_empty() {
                return Err(SatError::MalformedClause {
                    clause: i,
                    reason: MalformedReason::Empty,
                });
            }
            if clause.contains(&0) {
                return Err(SatError::MalformedClause {
                    clause: i,
                    reason: MalformedReason::ZeroLiteral,
                });
            }
            if clause.contains(&i32::MIN) {
                return Err(SatError::MalformedClause {
                    clause: i,
                    reason: MalformedReason::OutOfRange,
                });
            }
        }

        let variables: Vec<Variable> = std::iter::once(0)
            .chain(
                raw.iter()
                    .flat_map(|c| c.as_ref().iter().map(|l| l.unsigned_abs()))
                    .sorted_unstable()
                    .dedup(),
            )
            .collect();

        let indices: FxHashMap<Variable, usize> = variables
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &v)| (v, i))
            .collect();

        let clauses: Vec<Clause> = raw
            .iter()
            .map(|c| {
                c.as_ref()
                    .iter()
                    .map(|&l| Literal::new(indices[&l.unsigned_abs()], l > 0))
                    .collect()
            })
            .collect();

        let mut occurrences = vec![Vec::new(); variables.len()];
        for (ci, clause) in clauses.iter().enumerate() {
            for index in clause.indices() {
                occurrences[index].push(ci);
            }
        }

        for (i, clause) in clauses.iter().enumerate() {
            if clause.is_tautology() {
                warn!(
                    "clause #{i} ({}) contains a variable with both polarities and is always satisfied",
                    raw[i].as_ref().iter().join(" ")
                );
            }
        }

        let cnf = Self {
            clauses,
            variables,
            indices,
            occurrences,
        };
        debug!(
            "built instance: {} variables, {} clauses, {} literals",
            cnf.num_vars(),
            cnf.num_clauses(),
            cnf.num_literals()
        );
        Ok(cnf)
    }

    /// Number of distinct variables `N`.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.variables.len().saturating_sub(1)
    }

    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Total literal count over all clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    /// The clauses, in input order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// All dense indices `1..=N`.
    #[must_use]
    pub fn indices(&self) -> Range<usize> {
        1..self.num_vars() + 1
    }

    /// Clause positions that mention `index`.
    ///
    /// # Panics
    ///
    /// If `index` is past the end of the instance.
    #[must_use]
    pub fn occurrences(&self, index: usize) -> &[usize] {
        &self.occurrences[index]
    }

    /// The input identity of a dense index.
    ///
    /// # Errors
    ///
    /// `SatError::UnknownVariable` if `index` is not in `1..=N`.
    pub fn variable(&self, index: usize) -> Result<Variable> {
        self.check_index(index).map(|i| self.variables[i])
    }

    /// Passes `index` through if it names a variable of this instance.
    ///
    /// # Errors
    ///
    /// `SatError::UnknownVariable` if `index` is not in `1..=N`.
    pub fn check_index(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.num_vars() {
            return Err(SatError::UnknownVariable {
                index,
                num_vars: self.num_vars(),
            });
        }
        Ok(index)
    }

    /// The dense index of an input identity, if it occurs in the instance.
    #[must_use]
    pub fn index_of(&self, variable: Variable) -> Option<usize> {
        self.indices.get(&variable).copied()
    }

    /// Translates an assignment into signed literals, one per index in
    /// ascending order: magnitude is the input identity, sign is the value.
    ///
    /// # Errors
    ///
    /// `SatError::UnknownVariable` if the assignment does not cover exactly
    /// this instance's variables.
    pub fn to_literals(&self, assignment: &Assignment) -> Result<Vec<i32>> {
        if assignment.num_vars() != self.num_vars() {
            return Err(SatError::UnknownVariable {
                index: assignment.num_vars(),
                num_vars: self.num_vars(),
            });
        }

        Ok(assignment
            .iter()
            .map(|(i, value)| {
                let var = self.signed(i);
                if value { var } else { -var }
            })
            .collect())
    }

    /// Identities are magnitudes of non-`i32::MIN` literals, so they always fit.
    #[allow(clippy::cast_possible_wrap)]
    fn signed(&self, index: usize) -> i32 {
        self.variables[index] as i32
    }

    /// Rebuilds a fixed assignment from signed literals such as those produced
    /// by [`Self::to_literals`]. Order does not matter; a later literal for the
    /// same variable overrides an earlier one.
    ///
    /// # Errors
    ///
    /// - `SatError::UnknownLiteral` for `0` or a variable foreign to the instance.
    /// - `SatError::MissingVariable` if some variable receives no value.
    pub fn assignment_from_literals(&self, literals: &[i32]) -> Result<Assignment> {
        let mut values: Vec<Option<bool>> = vec![None; self.num_vars() + 1];
        for &lit in literals {
            let index = (lit != 0)
                .then(|| self.index_of(lit.unsigned_abs()))
                .flatten()
                .ok_or(SatError::UnknownLiteral(lit))?;
            values[index] = Some(lit > 0);
        }

        let values = values
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, v)| v.ok_or(SatError::MissingVariable(self.variables[i])))
            .collect::<Result<Vec<bool>>>()?;

        Ok(Assignment::from_values(&values))
    }

    /// Checks a literal-list solution against every clause.
    ///
    /// # Errors
    ///
    /// See [`Self::assignment_from_literals`].
    pub fn verify(&self, literals: &[i32]) -> Result<bool> {
        let assignment = self.assignment_from_literals(literals)?;
        Ok(self.iter().all(|c| c.is_satisfied(&assignment)))
    }
}

impl Index<usize> for Cnf {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl Display for Cnf {
    /// Writes the instance back in the plain one-clause-per-line text format.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for clause in &self.clauses {
            let line = clause
                .iter()
                .map(|l| {
                    let var = self.signed(l.index());
                    if l.polarity() { var } else { -var }
                })
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<i32>>> for Cnf {
    type Error = SatError;

    fn try_from(clauses: Vec<Vec<i32>>) -> Result<Self> {
        Self::new(clauses)
    }
}
