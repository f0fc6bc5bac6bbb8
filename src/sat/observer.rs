//! Hooks for watching a search as it runs.
//!
//! The engine itself prints nothing. Callers that want progress output,
//! metrics or early cancellation pass a [`SearchObserver`]; `()` is the no-op
//! observer.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::evaluator::satisfied_count;
use crate::sat::solver::{Flip, SearchOutcome, SearchStats};
use log::{debug, log_enabled, trace, Level};
use std::ops::ControlFlow;

/// One completed iteration of the search loop.
#[derive(Debug, Clone, Copy)]
pub struct FlipEvent<'a> {
    /// 1-based iteration number (equals the flip count so far).
    pub iteration: usize,
    /// The flip that was just performed.
    pub flip: Flip,
    pub cnf: &'a Cnf,
    /// The assignment after the flip.
    pub assignment: &'a Assignment,
}

impl FlipEvent<'_> {
    /// Number of clauses left unsatisfied after this flip. Costs a full evaluation.
    #[must_use]
    pub fn unsatisfied(&self) -> usize {
        self.cnf.num_clauses() - satisfied_count(self.cnf, self.assignment)
    }
}

/// Callbacks invoked by the search loop. Every method defaults to doing nothing.
pub trait SearchObserver {
    /// A search (or its first try) has drawn its initial assignment.
    fn on_start(&mut self, _cnf: &Cnf, _assignment: &Assignment) {}

    /// Called after every flip. Returning `ControlFlow::Break(())` stops the
    /// search, which then reports `ExhaustReason::Cancelled`.
    fn on_flip(&mut self, _event: &FlipEvent<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// The restart strategy replaced the assignment with a fresh random one.
    fn on_restart(&mut self, _restarts: usize, _assignment: &Assignment) {}

    /// The search reached a terminal outcome.
    fn on_finish(&mut self, _outcome: &SearchOutcome, _stats: &SearchStats) {}
}

impl SearchObserver for () {}

impl<O: SearchObserver + ?Sized> SearchObserver for &mut O {
    fn on_start(&mut self, cnf: &Cnf, assignment: &Assignment) {
        (**self).on_start(cnf, assignment);
    }

    fn on_flip(&mut self, event: &FlipEvent<'_>) -> ControlFlow<()> {
        (**self).on_flip(event)
    }

    fn on_restart(&mut self, restarts: usize, assignment: &Assignment) {
        (**self).on_restart(restarts, assignment);
    }

    fn on_finish(&mut self, outcome: &SearchOutcome, stats: &SearchStats) {
        (**self).on_finish(outcome, stats);
    }
}

/// Reports search progress through the `log` facade.
///
/// The per-flip unsatisfied count is only computed when `trace` logging is on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SearchObserver for LogObserver {
    fn on_start(&mut self, cnf: &Cnf, assignment: &Assignment) {
        debug!(
            "search started: {} unsatisfied of {} clauses",
            cnf.num_clauses() - satisfied_count(cnf, assignment),
            cnf.num_clauses()
        );
    }

    fn on_flip(&mut self, event: &FlipEvent<'_>) -> ControlFlow<()> {
        if log_enabled!(Level::Trace) {
            trace!(
                "flip {} ({:?} on {}): {} unsatisfied clauses",
                event.iteration,
                event.flip.kind,
                event.flip.index,
                event.unsatisfied()
            );
        }
        ControlFlow::Continue(())
    }

    fn on_restart(&mut self, restarts: usize, _assignment: &Assignment) {
        debug!("restart #{restarts}");
    }

    fn on_finish(&mut self, outcome: &SearchOutcome, stats: &SearchStats) {
        match outcome {
            SearchOutcome::Satisfied { iterations, .. } => {
                debug!("satisfied after {iterations} iterations ({:?})", stats.elapsed);
            }
            SearchOutcome::Exhausted { iterations, reason } => {
                debug!("gave up after {iterations} iterations: {reason}");
            }
        }
    }
}
