//! Independent searches raced on several threads.
//!
//! Every worker runs its own [`LocalSearch`] over the shared, read-only
//! [`Cnf`] with a random stream forked from the configured one. The first
//! worker to find a model raises a shared flag; the others observe it on their
//! next flip and stop as cancelled.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::error::{Result, SatError};
use crate::sat::observer::{FlipEvent, SearchObserver};
use crate::sat::solver::{
    ExhaustReason, LocalSearch, SearchConfig, SearchOutcome, SearchReport, SearchStats, search,
};
use log::{debug, info};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

/// Cancels a worker once any other worker has succeeded.
#[derive(Debug)]
struct StopFlag<'a, O> {
    solved: &'a AtomicBool,
    inner: O,
}

impl<O: SearchObserver> SearchObserver for StopFlag<'_, O> {
    fn on_start(&mut self, cnf: &Cnf, assignment: &Assignment) {
        self.inner.on_start(cnf, assignment);
    }

    fn on_flip(&mut self, event: &FlipEvent<'_>) -> ControlFlow<()> {
        if self.solved.load(Ordering::Relaxed) {
            return ControlFlow::Break(());
        }
        self.inner.on_flip(event)
    }

    fn on_restart(&mut self, restarts: usize, assignment: &Assignment) {
        self.inner.on_restart(restarts, assignment);
    }

    fn on_finish(&mut self, outcome: &SearchOutcome, stats: &SearchStats) {
        self.inner.on_finish(outcome, stats);
    }
}

/// Races `threads` independent searches and returns the first model found.
///
/// With a single thread this is a plain [`search`]. Otherwise each worker gets
/// the whole budget of `config`, the statistics are summed over all workers
/// (`elapsed` is wall-clock time), and `observer` is cloned into every worker.
///
/// # Errors
///
/// `SatError::InvalidConfig` if `threads` is zero or the configuration does
/// not validate.
pub fn search_parallel<O>(
    cnf: &Cnf,
    config: &SearchConfig,
    threads: usize,
    observer: O,
) -> Result<SearchReport>
where
    O: SearchObserver + Clone + Send,
{
    if threads == 0 {
        return Err(SatError::InvalidConfig("at least one search thread is required".to_string()));
    }
    let mut rng = config.rng();
    if threads == 1 {
        return search(cnf, config, &mut rng, observer);
    }
    config.validate()?;

    let start = Instant::now();
    let solved = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel();

    let reports = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let mut rng = rng.fork();
                let sender = tx.clone();
                let solved = &solved;
                let observer = StopFlag {
                    solved,
                    inner: observer.clone(),
                };
                scope.spawn(move || -> Result<SearchReport> {
                    let engine = LocalSearch::from_config(cnf, config)?;
                    let report = engine.run(&mut rng, config.budget, observer);
                    if report.outcome.is_satisfied() && !solved.swap(true, Ordering::SeqCst) {
                        debug!("worker {worker} found a model");
                        let _ = sender.send(worker);
                    }
                    Ok(report)
                })
            })
            .collect();
        drop(tx);

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect::<Result<Vec<_>>>()
    })?;

    let winner = rx.recv().ok();
    let mut stats = reports
        .iter()
        .fold(SearchStats::default(), |mut acc, r| {
            acc.flips += r.stats.flips;
            acc.noise_flips += r.stats.noise_flips;
            acc.greedy_flips += r.stats.greedy_flips;
            acc.restarts += r.stats.restarts;
            acc
        });
    stats.elapsed = start.elapsed();

    let outcome = match winner {
        Some(worker) => {
            info!("model found by worker {worker} of {threads}");
            reports[worker].outcome.clone()
        }
        None => {
            let iterations = reports
                .iter()
                .map(|r| r.outcome.iterations())
                .max()
                .unwrap_or(0);
            let reason = reports
                .iter()
                .find_map(|r| match r.outcome {
                    SearchOutcome::Exhausted { reason, .. } if reason != ExhaustReason::Cancelled => {
                        Some(reason)
                    }
                    _ => None,
                })
                .unwrap_or(ExhaustReason::Cancelled);
            SearchOutcome::Exhausted { iterations, reason }
        }
    };

    Ok(SearchReport { outcome, stats })
}
