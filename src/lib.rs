//! Stochastic local search for Boolean satisfiability.
//!
//! This crate implements the two classic incomplete SAT procedures, GSAT and
//! WalkSAT. Both start from a random total assignment and repeatedly flip one
//! variable until every clause is satisfied or a budget runs out. A flip is
//! either greedy (the variable whose flip satisfies the most clauses, chosen
//! among all variables for GSAT or among the variables of one random
//! unsatisfied clause for WalkSAT) or, with probability `1 - noise_threshold`,
//! a uniformly random variable.
//!
//! Local search cannot prove unsatisfiability. A run that does not find a
//! model ends as [`SearchOutcome::Exhausted`](sat::solver::SearchOutcome::Exhausted).
//!
//! ```
//! use walksat::sat::cnf::Cnf;
//! use walksat::sat::solver::{search, SearchConfig};
//!
//! let cnf = Cnf::new([vec![1, 2], vec![-1, -2]]).unwrap();
//! let config = SearchConfig::default().with_seed(42);
//! let report = search(&cnf, &config, &mut config.rng(), ()).unwrap();
//! let model = report.outcome.assignment().unwrap();
//! assert_ne!(model[1], model[2]);
//! ```

/// The `sat` module holds the instance model, the evaluator, the heuristics,
/// the search engine and the text formats.
pub mod sat;
