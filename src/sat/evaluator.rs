//! Side-effect-free clause satisfaction checks.
//!
//! Every function here only reads the instance and the assignment. Scoring a
//! hypothetical flip evaluates literals as if one index were inverted, so the
//! assignment is never touched, not even temporarily.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::error::Result;

/// True iff some literal of `clause` agrees with `assignment`.
#[must_use]
pub fn clause_satisfied(clause: &Clause, assignment: &Assignment) -> bool {
    clause.is_satisfied(assignment)
}

/// True iff every clause is satisfied. This is the search's termination predicate.
#[must_use]
pub fn all_satisfied(cnf: &Cnf, assignment: &Assignment) -> bool {
    cnf.iter().all(|c| clause_satisfied(c, assignment))
}

/// Number of clauses currently satisfied.
#[must_use]
pub fn satisfied_count(cnf: &Cnf, assignment: &Assignment) -> usize {
    cnf.iter().filter(|c| clause_satisfied(c, assignment)).count()
}

/// Positions (into [`Cnf::clauses`]) of the clauses currently unsatisfied, in input order.
#[must_use]
pub fn unsatisfied_clauses(cnf: &Cnf, assignment: &Assignment) -> Vec<usize> {
    cnf.iter()
        .enumerate()
        .filter(|(_, c)| !clause_satisfied(c, assignment))
        .map(|(i, _)| i)
        .collect()
}

/// Number of clauses that would be satisfied if `index` were flipped,
/// computed by re-evaluating every clause.
///
/// # Errors
///
/// `SatError::UnknownVariable` if `index` is not in `1..=N`.
pub fn flip_score(cnf: &Cnf, assignment: &Assignment, index: usize) -> Result<usize> {
    let index = cnf.check_index(index)?;
    Ok(cnf
        .iter()
        .filter(|c| c.is_satisfied_if_flipped(assignment, index))
        .count())
}

/// Change in the satisfied-clause count caused by flipping `index`.
///
/// Only the clauses containing `index` can change state, so this looks at
/// those alone. `satisfied_count + flip_delta == flip_score` for every index.
///
/// # Errors
///
/// `SatError::UnknownVariable` if `index` is not in `1..=N`.
pub fn flip_delta(cnf: &Cnf, assignment: &Assignment, index: usize) -> Result<isize> {
    let index = cnf.check_index(index)?;
    Ok(delta_unchecked(cnf, assignment, index))
}

/// [`flip_delta`] for an index already known to be in `1..=N`.
pub(crate) fn delta_unchecked(cnf: &Cnf, assignment: &Assignment, index: usize) -> isize {
    cnf.occurrences(index)
        .iter()
        .map(|&ci| {
            let clause = &cnf[ci];
            let before = clause.is_satisfied(assignment);
            let after = clause.is_satisfied_if_flipped(assignment, index);
            isize::from(after) - isize::from(before)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::error::SatError;

    fn fixture() -> Cnf {
        Cnf::new([vec![1, 2], vec![-1, 3], vec![-2, -3], vec![2, -2], vec![4]]).unwrap()
    }

    #[test]
    fn test_all_satisfied_matches_clausewise_definition() {
        let cnf = fixture();
        for bits in 0u32..16 {
            let values: Vec<bool> = (0..4).map(|i| bits & (1 << i) != 0).collect();
            let assignment = Assignment::from_values(&values);
            let expected = cnf.iter().all(|c| clause_satisfied(c, &assignment));
            assert_eq!(all_satisfied(&cnf, &assignment), expected, "bits {bits:04b}");
        }
    }

    #[test]
    fn test_counts() {
        let cnf = fixture();
        let assignment = Assignment::from_values(&[true, false, false, false]);
        // [1,2] sat, [-1,3] unsat, [-2,-3] sat, [2,-2] sat, [4] unsat
        assert_eq!(satisfied_count(&cnf, &assignment), 3);
        assert_eq!(unsatisfied_clauses(&cnf, &assignment), vec![1, 4]);
        assert!(!all_satisfied(&cnf, &assignment));

        let model = Assignment::from_values(&[true, false, true, true]);
        assert!(all_satisfied(&cnf, &model));
        assert!(unsatisfied_clauses(&cnf, &model).is_empty());
    }

    #[test]
    fn test_flip_score_does_not_mutate() {
        let cnf = fixture();
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..32 {
            let assignment = Assignment::random(cnf.num_vars(), &mut rng);
            let before = assignment.clone();
            for index in cnf.indices() {
                flip_score(&cnf, &assignment, index).unwrap();
                flip_delta(&cnf, &assignment, index).unwrap();
            }
            assert_eq!(assignment, before);
        }
    }

    #[test]
    fn test_flip_score_equals_actual_flip() {
        let cnf = fixture();
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..32 {
            let assignment = Assignment::random(cnf.num_vars(), &mut rng);
            for index in cnf.indices() {
                let mut flipped = assignment.clone();
                flipped.flip(index);
                assert_eq!(
                    flip_score(&cnf, &assignment, index).unwrap(),
                    satisfied_count(&cnf, &flipped)
                );
            }
        }
    }

    #[test]
    fn test_flip_delta_agrees_with_full_recount() {
        let cnf = fixture();
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..32 {
            let assignment = Assignment::random(cnf.num_vars(), &mut rng);
            let base = satisfied_count(&cnf, &assignment);
            for index in cnf.indices() {
                let delta = flip_delta(&cnf, &assignment, index).unwrap();
                let incremental = base.checked_add_signed(delta);
                assert_eq!(incremental, Some(flip_score(&cnf, &assignment, index).unwrap()));
            }
        }
    }

    #[test]
    fn test_scoring_rejects_unknown_index() {
        let cnf = Cnf::new([vec![1, 2], vec![-1]]).unwrap();
        let assignment = Assignment::from_values(&[true, false]);
        for index in [0, 3, 9] {
            assert!(matches!(
                flip_score(&cnf, &assignment, index),
                Err(SatError::UnknownVariable { num_vars: 2, .. })
            ));
            assert!(matches!(
                flip_delta(&cnf, &assignment, index),
                Err(SatError::UnknownVariable { num_vars: 2, .. })
            ));
        }
    }

    #[test]
    fn test_empty_instance_is_satisfied() {
        let cnf = Cnf::new(Vec::<Vec<i32>>::new()).unwrap();
        let assignment = Assignment::from_values(&[]);
        assert!(all_satisfied(&cnf, &assignment));
        assert_eq!(satisfied_count(&cnf, &assignment), 0);
    }
}
