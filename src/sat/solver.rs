#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The local search engine.
//!
//! [`LocalSearch`] is a small state machine:
//!
//! 1.  **Initializing**: a uniformly random assignment is drawn and the
//!     iteration counter starts at zero.
//! 2.  **Searching**: every iteration draws the noise coin. On a walk step a
//!     uniformly random variable is flipped; otherwise the configured
//!     [`VariableSelection`] proposes the index. After the flip the counter is
//!     bumped and the termination predicate is re-evaluated.
//! 3.  **Satisfied**: the first assignment satisfying every clause ends the run.
//!
//! The loop alone never terminates on an unsatisfiable instance, so every run
//! is bounded by a [`Budget`] checked once per iteration. Running out of
//! budget, or being cancelled by the observer, yields
//! [`SearchOutcome::Exhausted`].
//!
//! Each run owns its assignment and random stream; the [`Cnf`] is only read,
//! so independent runs can share it freely.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::error::Result;
use crate::sat::evaluator::all_satisfied;
use crate::sat::observer::{FlipEvent, SearchObserver};
use crate::sat::restarter::{Restarter, RestarterImpls, RestarterType};
use crate::sat::variable_selection::{
    Noise, Strategy, VariableSelection, VariableSelectionImpls,
};
use std::fmt::Display;
use std::time::{Duration, Instant};

/// Limits on a single search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Budget {
    /// Maximum number of flips over the whole run, restarts included.
    pub max_flips: Option<usize>,
    /// Maximum wall-clock time of the run.
    pub time_limit: Option<Duration>,
}

impl Budget {
    /// A flip-count budget.
    #[must_use]
    pub const fn flips(max_flips: usize) -> Self {
        Self {
            max_flips: Some(max_flips),
            time_limit: None,
        }
    }

    /// No limit at all. Searching an unsatisfiable instance with this budget
    /// never returns unless the observer cancels.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_flips: None,
            time_limit: None,
        }
    }

    #[must_use]
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Everything needed to start a search, apart from the instance and the random stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub strategy: Strategy,
    /// A walk step happens when a uniform draw exceeds this value.
    pub noise_threshold: f64,
    pub budget: Budget,
    pub restart: RestarterType,
    /// Flips per try for `Fixed`, unit length for `Luby`.
    pub restart_interval: usize,
    /// Seed for [`SearchConfig::rng`]; `None` seeds from the environment.
    pub seed: Option<u64>,
}

impl SearchConfig {
    pub const DEFAULT_MAX_FLIPS: usize = 100_000;
    pub const DEFAULT_RESTART_INTERVAL: usize = 1_000;

    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_noise_threshold(mut self, threshold: f64) -> Self {
        self.noise_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    #[must_use]
    pub const fn with_restart(mut self, restart: RestarterType, interval: usize) -> Self {
        self.restart = restart;
        self.restart_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the configuration and returns the noise policy it describes.
    ///
    /// # Errors
    ///
    /// `SatError::InvalidConfig` if the noise threshold is outside `[0, 1]`.
    pub fn validate(&self) -> Result<Noise> {
        Noise::new(self.noise_threshold)
    }

    /// A random stream seeded from `seed`, or from the environment when unset.
    #[must_use]
    pub fn rng(&self) -> fastrand::Rng {
        self.seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            noise_threshold: Noise::DEFAULT_THRESHOLD,
            budget: Budget::flips(Self::DEFAULT_MAX_FLIPS),
            restart: RestarterType::default(),
            restart_interval: Self::DEFAULT_RESTART_INTERVAL,
            seed: None,
        }
    }
}

/// The states of a [`LocalSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchState {
    #[default]
    Initializing,
    Searching,
    Satisfied,
}

/// How the flipped index was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlipKind {
    /// Random walk step over all variables.
    Noise,
    /// Proposed by the heuristic.
    Greedy,
}

/// A single performed flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flip {
    pub index: usize,
    pub kind: FlipKind,
}

/// Why a run stopped without satisfying the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExhaustReason {
    FlipLimit,
    TimeLimit,
    Cancelled,
}

impl Display for ExhaustReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FlipLimit => write!(f, "flip limit reached"),
            Self::TimeLimit => write!(f, "time limit reached"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A model was found after `iterations` flips.
    Satisfied {
        assignment: Assignment,
        iterations: usize,
    },
    /// The budget ran out (or the run was cancelled) first.
    Exhausted {
        iterations: usize,
        reason: ExhaustReason,
    },
}

impl SearchOutcome {
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    #[must_use]
    pub const fn iterations(&self) -> usize {
        match self {
            Self::Satisfied { iterations, .. } | Self::Exhausted { iterations, .. } => *iterations,
        }
    }

    /// The model, if one was found.
    #[must_use]
    pub const fn assignment(&self) -> Option<&Assignment> {
        match self {
            Self::Satisfied { assignment, .. } => Some(assignment),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Counters collected over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    pub flips: usize,
    pub noise_flips: usize,
    pub greedy_flips: usize,
    pub restarts: usize,
    pub elapsed: Duration,
}

/// Outcome plus statistics of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

/// One search run over a borrowed instance.
///
/// Generic over the heuristic and the restart strategy; the defaults are the
/// runtime-selectable enums built from a [`SearchConfig`].
#[derive(Debug, Clone)]
pub struct LocalSearch<'a, S = VariableSelectionImpls, R = RestarterImpls>
where
    S: VariableSelection,
    R: Restarter,
{
    cnf: &'a Cnf,
    selector: S,
    restarter: R,
    noise: Noise,
    assignment: Assignment,
    state: SearchState,
    iterations: usize,
    stats: SearchStats,
}

impl<'a> LocalSearch<'a> {
    /// Builds a run from a configuration.
    ///
    /// # Errors
    ///
    /// `SatError::InvalidConfig` if the configuration does not validate.
    pub fn from_config(cnf: &'a Cnf, config: &SearchConfig) -> Result<Self> {
        let noise = config.validate()?;
        Ok(Self::new(
            cnf,
            config.strategy.to_impl(),
            config.restart.to_impl(config.restart_interval),
            noise,
        ))
    }
}

impl<'a, S: VariableSelection, R: Restarter> LocalSearch<'a, S, R> {
    pub fn new(cnf: &'a Cnf, selector: S, restarter: R, noise: Noise) -> Self {
        Self {
            cnf,
            selector,
            restarter,
            noise,
            assignment: Assignment::default(),
            state: SearchState::Initializing,
            iterations: 0,
            stats: SearchStats::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SearchState {
        self.state
    }

    /// Flips performed so far.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Initializing → Searching (or straight to Satisfied when the random
    /// assignment already is a model). Resets the iteration counter.
    pub fn initialize(&mut self, rng: &mut fastrand::Rng) {
        self.iterations = 0;
        self.stats = SearchStats::default();
        self.draw(rng);
    }

    /// Replaces the assignment with a fresh random one, keeping the counters.
    pub fn restart(&mut self, rng: &mut fastrand::Rng) {
        self.stats.restarts += 1;
        self.draw(rng);
    }

    fn draw(&mut self, rng: &mut fastrand::Rng) {
        self.assignment = Assignment::random(self.cnf.num_vars(), rng);
        self.state = if all_satisfied(self.cnf, &self.assignment) {
            SearchState::Satisfied
        } else {
            SearchState::Searching
        };
    }

    /// Performs one iteration and returns the flip made.
    ///
    /// Initializes first if needed. Returns `None` once the run is satisfied.
    pub fn step(&mut self, rng: &mut fastrand::Rng) -> Option<Flip> {
        if self.state == SearchState::Initializing {
            self.initialize(rng);
        }
        if self.state == SearchState::Satisfied {
            return None;
        }

        let flip = if self.noise.is_walk(rng) {
            Noise::random_index(self.cnf, rng).map(|index| Flip {
                index,
                kind: FlipKind::Noise,
            })
        } else {
            self.selector
                .pick(self.cnf, &self.assignment, rng)
                .map(|index| Flip {
                    index,
                    kind: FlipKind::Greedy,
                })
        }?;

        self.assignment.flip(flip.index);
        self.iterations += 1;
        self.stats.flips += 1;
        match flip.kind {
            FlipKind::Noise => self.stats.noise_flips += 1,
            FlipKind::Greedy => self.stats.greedy_flips += 1,
        }

        if all_satisfied(self.cnf, &self.assignment) {
            self.state = SearchState::Satisfied;
        }
        Some(flip)
    }

    /// Drives the state machine to a terminal outcome.
    pub fn run<O: SearchObserver>(
        mut self,
        rng: &mut fastrand::Rng,
        budget: Budget,
        mut observer: O,
    ) -> SearchReport {
        let start = Instant::now();
        if self.state == SearchState::Initializing {
            self.initialize(rng);
        }
        observer.on_start(self.cnf, &self.assignment);

        let reason = loop {
            if self.state == SearchState::Satisfied {
                break None;
            }
            if budget.max_flips.is_some_and(|max| self.iterations >= max) {
                break Some(ExhaustReason::FlipLimit);
            }
            if budget.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break Some(ExhaustReason::TimeLimit);
            }
            if self.restarter.should_restart() {
                self.restart(rng);
                observer.on_restart(self.stats.restarts, &self.assignment);
                continue;
            }

            let Some(flip) = self.step(rng) else {
                // nothing to flip: an instance without variables whose clauses
                // are all satisfied never reaches this point
                break Some(ExhaustReason::FlipLimit);
            };
            let event = FlipEvent {
                iteration: self.iterations,
                flip,
                cnf: self.cnf,
                assignment: &self.assignment,
            };
            if observer.on_flip(&event).is_break() {
                break Some(ExhaustReason::Cancelled);
            }
        };

        self.stats.elapsed = start.elapsed();
        let outcome = match reason {
            None => SearchOutcome::Satisfied {
                assignment: self.assignment,
                iterations: self.iterations,
            },
            Some(reason) => SearchOutcome::Exhausted {
                iterations: self.iterations,
                reason,
            },
        };
        observer.on_finish(&outcome, &self.stats);

        SearchReport {
            outcome,
            stats: self.stats,
        }
    }
}

/// Runs one search with the heuristic, noise, restarts and budget of `config`.
///
/// The caller supplies the random stream, so a fixed seed reproduces the
/// exact sequence of flips.
///
/// # Errors
///
/// `SatError::InvalidConfig` if the configuration does not validate.
pub fn search<O: SearchObserver>(
    cnf: &Cnf,
    config: &SearchConfig,
    rng: &mut fastrand::Rng,
    observer: O,
) -> Result<SearchReport> {
    let engine = LocalSearch::from_config(cnf, config)?;
    Ok(engine.run(rng, config.budget, observer))
}
