//! Random k-SAT instances for benchmarks and tests.
//!
//! Instances are drawn in the fixed clause-length model: each clause picks `k`
//! variables uniformly from `1..=num_vars` and negates each one with
//! probability one half. At `k = 3` the satisfiability threshold sits near a
//! clause-to-variable ratio of [`THRESHOLD_RATIO_3SAT`], where instances are
//! hardest for local search.

use crate::sat::error::{Result, SatError};
use crate::sat::literal::Variable;

/// Clause-to-variable ratio of the random 3-SAT phase transition.
pub const THRESHOLD_RATIO_3SAT: f64 = 4.267;

fn check(num_vars: usize, ratio: f64, k: usize) -> Result<usize> {
    if num_vars == 0 || k == 0 {
        return Err(SatError::InvalidConfig(format!(
            "random instance needs at least one variable and one literal per clause (got {num_vars} variables, k = {k})"
        )));
    }
    if i32::try_from(num_vars).is_err() {
        return Err(SatError::InvalidConfig(format!(
            "{num_vars} variables do not fit signed literals"
        )));
    }
    if !ratio.is_finite() || ratio < 0.0 {
        return Err(SatError::InvalidConfig(format!(
            "clause ratio must be a non-negative number, got {ratio}"
        )));
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_clauses = (num_vars as f64 * ratio).floor() as usize;
    Ok(num_clauses)
}

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn literal(rng: &mut fastrand::Rng, num_vars: usize) -> i32 {
    let var: Variable = rng.u32(1..=num_vars as u32);
    if rng.bool() { var as i32 } else { -(var as i32) }
}

/// Draws `floor(num_vars * ratio)` clauses of `k` literals each.
///
/// Variables may repeat within a clause, as in the plain fixed-length model.
///
/// # Errors
///
/// `SatError::InvalidConfig` if `num_vars` or `k` is zero, `num_vars`
/// exceeds `i32::MAX`, or `ratio` is negative or not finite.
pub fn random_ksat(
    num_vars: usize,
    ratio: f64,
    k: usize,
    rng: &mut fastrand::Rng,
) -> Result<Vec<Vec<i32>>> {
    let num_clauses = check(num_vars, ratio, k)?;
    Ok((0..num_clauses)
        .map(|_| (0..k).map(|_| literal(rng, num_vars)).collect())
        .collect())
}

/// Like [`random_ksat`], but every clause is satisfied by a hidden random
/// assignment, so the instance is guaranteed satisfiable.
///
/// Clauses falsified by the hidden assignment get one literal's sign flipped.
///
/// # Errors
///
/// See [`random_ksat`].
pub fn planted_ksat(
    num_vars: usize,
    ratio: f64,
    k: usize,
    rng: &mut fastrand::Rng,
) -> Result<Vec<Vec<i32>>> {
    let num_clauses = check(num_vars, ratio, k)?;
    let hidden: Vec<bool> = (0..=num_vars).map(|_| rng.bool()).collect();
    let agrees = |lit: i32| hidden[lit.unsigned_abs() as usize] == (lit > 0);

    Ok((0..num_clauses)
        .map(|_| {
            let mut clause: Vec<i32> = (0..k).map(|_| literal(rng, num_vars)).collect();
            if !clause.iter().any(|&l| agrees(l)) {
                let i = rng.usize(..k);
                clause[i] = -clause[i];
            }
            clause
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::cnf::Cnf;
    use crate::sat::evaluator::all_satisfied;
    use crate::sat::solver::{Budget, SearchConfig, search};

    #[test]
    fn test_shape() {
        let mut rng = fastrand::Rng::with_seed(0);
        let clauses = random_ksat(100, THRESHOLD_RATIO_3SAT, 3, &mut rng).unwrap();
        assert_eq!(clauses.len(), 426);
        assert!(clauses.iter().all(|c| c.len() == 3));
        assert!(
            clauses
                .iter()
                .flatten()
                .all(|&l| l != 0 && l.unsigned_abs() <= 100)
        );
        assert!(Cnf::new(&clauses).is_ok());
    }

    #[test]
    fn test_seeded() {
        let a = random_ksat(20, 3.0, 3, &mut fastrand::Rng::with_seed(5)).unwrap();
        let b = random_ksat(20, 3.0, 3, &mut fastrand::Rng::with_seed(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let mut rng = fastrand::Rng::with_seed(0);
        assert!(random_ksat(0, 4.0, 3, &mut rng).is_err());
        assert!(random_ksat(10, 4.0, 0, &mut rng).is_err());
        assert!(random_ksat(10, -1.0, 3, &mut rng).is_err());
        assert!(planted_ksat(10, f64::NAN, 3, &mut rng).is_err());
    }

    #[test]
    fn test_planted_is_satisfiable() {
        let mut rng = fastrand::Rng::with_seed(9);
        let clauses = planted_ksat(30, 4.0, 3, &mut rng).unwrap();
        let cnf = Cnf::new(&clauses).unwrap();

        let config = SearchConfig::default()
            .with_budget(Budget::flips(200_000))
            .with_seed(9);
        let report = search(&cnf, &config, &mut config.rng(), ()).unwrap();
        let model = report.outcome.assignment().unwrap();
        assert!(all_satisfied(&cnf, model));
        assert_eq!(model.num_vars(), cnf.num_vars());
    }
}
