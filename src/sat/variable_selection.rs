#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Variable selection heuristics for local search.
//!
//! Both heuristics share one primitive, [`greedy_best`]: score every candidate
//! index by the number of clauses satisfied after flipping it, then pick
//! uniformly among the best. They differ only in the candidate set:
//!
//! - [`Gsat`] considers every variable of the instance.
//! - [`WalkSat`] draws one currently unsatisfied clause uniformly at random and
//!   considers only the variables of that clause.
//!
//! [`Noise`] decides, once per iteration, whether to ignore the heuristic and
//! flip a uniformly random variable instead.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::error::{Result, SatError};
use crate::sat::evaluator::{delta_unchecked, unsatisfied_clauses};
use clap::ValueEnum;
use smallvec::SmallVec;
use std::fmt::{Debug, Display};

/// A heuristic that proposes the next index to flip.
pub trait VariableSelection: Debug + Clone {
    /// Picks an index in `1..=N` to flip, or `None` if the heuristic has no
    /// candidate (an instance without variables, or nothing left to repair).
    fn pick(&self, cnf: &Cnf, assignment: &Assignment, rng: &mut fastrand::Rng) -> Option<usize>;
}

/// Returns a uniformly chosen index among the candidates whose flip satisfies
/// the most clauses.
///
/// Scores are ranked through [`flip_delta`](crate::sat::evaluator::flip_delta):
/// every candidate's score is the current satisfied count plus its delta, so
/// grouping by delta groups by score. Ties are never broken by position.
///
/// # Errors
///
/// `SatError::UnknownVariable` if any candidate is not in `1..=N`.
pub fn greedy_best<I>(
    cnf: &Cnf,
    assignment: &Assignment,
    candidates: I,
    rng: &mut fastrand::Rng,
) -> Result<Option<usize>>
where
    I: IntoIterator<Item = usize>,
{
    let candidates = candidates
        .into_iter()
        .map(|index| cnf.check_index(index))
        .collect::<Result<SmallVec<[usize; 16]>>>()?;
    Ok(best_of(cnf, assignment, candidates, rng))
}

/// [`greedy_best`] over candidates drawn from the instance itself.
fn best_of<I>(
    cnf: &Cnf,
    assignment: &Assignment,
    candidates: I,
    rng: &mut fastrand::Rng,
) -> Option<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut best = isize::MIN;
    let mut ties: SmallVec<[usize; 16]> = SmallVec::new();

    for index in candidates {
        let score = delta_unchecked(cnf, assignment, index);
        if score > best {
            best = score;
            ties.clear();
            ties.push(index);
        } else if score == best {
            ties.push(index);
        }
    }

    if ties.is_empty() {
        None
    } else {
        Some(ties[rng.usize(..ties.len())])
    }
}

/// Greedy selection over all variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gsat;

impl VariableSelection for Gsat {
    fn pick(&self, cnf: &Cnf, assignment: &Assignment, rng: &mut fastrand::Rng) -> Option<usize> {
        best_of(cnf, assignment, cnf.indices(), rng)
    }
}

/// Greedy selection restricted to one random unsatisfied clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkSat;

impl WalkSat {
    /// Draws the clause whose variables form this iteration's candidate set.
    /// The unsatisfied set is recomputed on every call since each flip changes it.
    #[must_use]
    pub fn pick_clause(cnf: &Cnf, assignment: &Assignment, rng: &mut fastrand::Rng) -> Option<usize> {
        let unsatisfied = unsatisfied_clauses(cnf, assignment);
        rng.choice(unsatisfied)
    }
}

impl VariableSelection for WalkSat {
    fn pick(&self, cnf: &Cnf, assignment: &Assignment, rng: &mut fastrand::Rng) -> Option<usize> {
        let clause = Self::pick_clause(cnf, assignment, rng)?;
        best_of(cnf, assignment, cnf[clause].indices(), rng)
    }
}

/// The random-walk override shared by every heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Noise {
    threshold: f64,
}

impl Noise {
    /// A walk step happens when a uniform draw in `[0, 1)` exceeds this value.
    pub const DEFAULT_THRESHOLD: f64 = 0.7;

    /// # Errors
    ///
    /// `SatError::InvalidConfig` if `threshold` is not within `[0, 1]`.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SatError::InvalidConfig(format!(
                "noise threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Probability of a random walk step on any iteration.
    #[must_use]
    pub fn probability(&self) -> f64 {
        1.0 - self.threshold
    }

    /// Draws this iteration's coin.
    pub fn is_walk(&self, rng: &mut fastrand::Rng) -> bool {
        rng.f64() > self.threshold
    }

    /// A uniformly random index over all variables, ignoring any clause restriction.
    pub fn random_index(cnf: &Cnf, rng: &mut fastrand::Rng) -> Option<usize> {
        let n = cnf.num_vars();
        (n > 0).then(|| rng.usize(1..=n))
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

/// Enum dispatch over the available heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableSelectionImpls {
    Gsat(Gsat),
    WalkSat(WalkSat),
}

impl VariableSelection for VariableSelectionImpls {
    fn pick(&self, cnf: &Cnf, assignment: &Assignment, rng: &mut fastrand::Rng) -> Option<usize> {
        match self {
            Self::Gsat(s) => s.pick(cnf, assignment, rng),
            Self::WalkSat(s) => s.pick(cnf, assignment, rng),
        }
    }
}

/// The heuristic to run, as chosen by a caller or on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Strategy {
    /// Greedy over every variable.
    Gsat,
    /// Greedy over the variables of one random unsatisfied clause.
    #[default]
    #[value(name = "walksat")]
    WalkSat,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gsat => write!(f, "GSAT"),
            Self::WalkSat => write!(f, "WalkSAT"),
        }
    }
}

impl Strategy {
    /// Converts the `Strategy` to a concrete `VariableSelectionImpls`.
    #[must_use]
    pub const fn to_impl(self) -> VariableSelectionImpls {
        match self {
            Self::Gsat => VariableSelectionImpls::Gsat(Gsat),
            Self::WalkSat => VariableSelectionImpls::WalkSat(WalkSat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::evaluator::flip_score;

    #[test]
    fn test_greedy_best_picks_maximum() {
        // flipping 1 satisfies everything, flipping 2 or 3 does not
        let cnf = Cnf::new([vec![1], vec![1, 2], vec![1, -3]]).unwrap();
        let assignment = Assignment::from_values(&[false, false, true]);
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..50 {
            assert_eq!(greedy_best(&cnf, &assignment, cnf.indices(), &mut rng).unwrap(), Some(1));
        }
    }

    #[test]
    fn test_greedy_best_matches_full_scores() {
        let cnf = Cnf::new([vec![1, 2, -3], vec![-1, 4], vec![2, 3], vec![-2, -4], vec![3, 4]])
            .unwrap();
        let mut rng = fastrand::Rng::with_seed(99);
        for _ in 0..64 {
            let assignment = Assignment::random(cnf.num_vars(), &mut rng);
            let best = cnf
                .indices()
                .map(|i| flip_score(&cnf, &assignment, i).unwrap())
                .max()
                .unwrap();
            let picked = greedy_best(&cnf, &assignment, cnf.indices(), &mut rng)
                .unwrap()
                .unwrap();
            assert_eq!(flip_score(&cnf, &assignment, picked).unwrap(), best);
        }
    }

    #[test]
    fn test_greedy_best_empty_candidates() {
        let cnf = Cnf::new([[1]]).unwrap();
        let assignment = Assignment::from_values(&[false]);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(greedy_best(&cnf, &assignment, [], &mut rng).unwrap(), None);
    }

    #[test]
    fn test_greedy_best_rejects_unknown_index() {
        let cnf = Cnf::new([[1, 2]]).unwrap();
        let assignment = Assignment::from_values(&[false, false]);
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(matches!(
            greedy_best(&cnf, &assignment, [0], &mut rng),
            Err(SatError::UnknownVariable { index: 0, num_vars: 2 })
        ));
        assert!(matches!(
            greedy_best(&cnf, &assignment, [1, 3], &mut rng),
            Err(SatError::UnknownVariable { index: 3, num_vars: 2 })
        ));
    }

    #[test]
    fn test_tie_break_is_fair() {
        // both unit clauses unsatisfied: flipping either index satisfies exactly one
        let cnf = Cnf::new([[1], [2]]).unwrap();
        let assignment = Assignment::from_values(&[false, false]);
        let mut rng = fastrand::Rng::with_seed(2024);

        let trials = 10_000;
        let mut first = 0;
        for _ in 0..trials {
            match greedy_best(&cnf, &assignment, cnf.indices(), &mut rng).unwrap() {
                Some(1) => first += 1,
                Some(2) => {}
                other => panic!("unexpected pick {other:?}"),
            }
        }
        assert!((4_500..=5_500).contains(&first), "index 1 picked {first} times");
    }

    #[test]
    fn test_walksat_picks_from_unsatisfied_clause() {
        let cnf = Cnf::new([vec![1, 2], vec![3, 4], vec![-5, 6]]).unwrap();
        // only [3, 4] is unsatisfied
        let assignment = Assignment::from_values(&[true, false, false, false, false, false]);
        let mut rng = fastrand::Rng::with_seed(8);
        for _ in 0..100 {
            assert_eq!(WalkSat::pick_clause(&cnf, &assignment, &mut rng), Some(1));
            let picked = WalkSat.pick(&cnf, &assignment, &mut rng).unwrap();
            assert!(picked == 3 || picked == 4, "picked {picked}");
        }
    }

    #[test]
    fn test_walksat_nothing_to_repair() {
        let cnf = Cnf::new([[1, 2]]).unwrap();
        let assignment = Assignment::from_values(&[true, true]);
        let mut rng = fastrand::Rng::with_seed(8);
        assert_eq!(WalkSat.pick(&cnf, &assignment, &mut rng), None);
    }

    #[test]
    fn test_noise_threshold_validation() {
        assert!(Noise::new(0.0).is_ok());
        assert!(Noise::new(1.0).is_ok());
        assert!(matches!(Noise::new(1.5), Err(SatError::InvalidConfig(_))));
        assert!(matches!(Noise::new(-0.1), Err(SatError::InvalidConfig(_))));
        assert!(matches!(Noise::new(f64::NAN), Err(SatError::InvalidConfig(_))));
        assert!((Noise::default().probability() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_noise_frequency() {
        let noise = Noise::default();
        let mut rng = fastrand::Rng::with_seed(31);
        let walks = (0..20_000).filter(|_| noise.is_walk(&mut rng)).count();
        assert!((5_400..=6_600).contains(&walks), "{walks} walk steps");
    }

    #[test]
    fn test_noise_extremes() {
        let mut rng = fastrand::Rng::with_seed(31);
        let never = Noise::new(1.0).unwrap();
        assert!((0..1_000).all(|_| !never.is_walk(&mut rng)));
    }

    #[test]
    fn test_random_index_covers_all_variables() {
        let cnf = Cnf::new([vec![1, 2, 3]]).unwrap();
        let mut rng = fastrand::Rng::with_seed(4);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let i = Noise::random_index(&cnf, &mut rng).unwrap();
            seen[i] = true;
        }
        assert_eq!(seen, [false, true, true, true]);

        let empty = Cnf::new(Vec::<Vec<i32>>::new()).unwrap();
        assert_eq!(Noise::random_index(&empty, &mut rng), None);
    }

    #[test]
    fn test_strategy_display_and_dispatch() {
        assert_eq!(Strategy::Gsat.to_string(), "GSAT");
        assert_eq!(Strategy::default(), Strategy::WalkSat);
        assert!(matches!(Strategy::Gsat.to_impl(), VariableSelectionImpls::Gsat(_)));
    }
}
