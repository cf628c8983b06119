//! Epoch/phase orchestrator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tourforge_config::SolverConfig;
use tourforge_core::{Point, Result, TourForgeError};
use tracing::{debug, info, warn};

use super::handle::SolverHandle;
use super::timeouts::{Phase, PhaseTimeouts};
use crate::event::{BestRouteUpdate, SolverEventListener, SolverEventSupport, StatusUpdate};
use crate::heuristic::{BestRecord, PmxCrossover, ScoredTour, ThreeOptSearch};
use crate::mechanism::{self, BarrierOutcome, Job, Mechanism, WorkerHandle, WorkerState};
use crate::statistics::{PhaseRecord, SolutionCounter};

/// Result of a finished or aborted run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Best tour known when the run stopped.
    pub best: Vec<Point>,
    pub best_distance: f64,
    pub epochs_completed: u64,
    /// Solution counter value when the run stopped.
    pub solutions: u64,
    pub cancelled: bool,
    pub phase_timeouts: usize,
    pub worker_failures: usize,
    pub duration: Duration,
    /// One record per finished phase.
    pub phases: Vec<PhaseRecord>,
}

/// Runs PMX and 3-opt phases on a pool of workers, epoch after epoch.
///
/// Each epoch is a recombination phase followed by a local search phase.
/// Phase 1 seeds worker `i` with `seeds[i % seeds.len()]`; its outputs,
/// shortest first, seed phase 2 the same way; the shortest phase 2 output
/// seeds the next epoch. The global best only changes on strict
/// improvement.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tourforge_config::SolverConfig;
/// use tourforge_core::{total_distance, Point};
/// use tourforge_solver::event::{CountingEventListener, SolverEventSupport};
/// use tourforge_solver::ParallelSolver;
///
/// let points: Vec<Point> = (0..8)
///     .map(|i| Point::new((i * 7 % 8) as f64, (i * 3 % 8) as f64))
///     .collect();
/// let config = SolverConfig::new()
///     .with_mechanisms_engaged(2)
///     .with_phase_timeouts_ms(5_000, 5_000)
///     .with_epochs(1, 2)
///     .with_random_seed(7);
///
/// let listener = Arc::new(CountingEventListener::new());
/// let mut events = SolverEventSupport::new();
/// events.add_listener(listener.clone());
///
/// let mut solver = ParallelSolver::from_config(config, events).unwrap();
/// let report = solver.run(&points).unwrap();
///
/// assert!(report.best_distance <= total_distance(&points));
/// assert_eq!(report.epochs_completed, 2);
/// assert_eq!(listener.status_count(), 4);
/// ```
#[derive(Debug)]
pub struct ParallelSolver {
    config: SolverConfig,
    mechanism: Box<dyn Mechanism>,
    events: SolverEventSupport,
    handle: SolverHandle,
    counter: SolutionCounter,
    rng: ChaCha8Rng,
}

/// Per-run tallies updated after each barrier.
#[derive(Debug, Default)]
struct RunTally {
    phase_timeouts: usize,
    worker_failures: usize,
    phases: Vec<PhaseRecord>,
}

impl ParallelSolver {
    /// Creates a solver using the given mechanism.
    ///
    /// # Errors
    ///
    /// Returns [`TourForgeError::Config`] when `config` does not validate.
    pub fn new(
        config: SolverConfig,
        mechanism: Box<dyn Mechanism>,
        events: SolverEventSupport,
    ) -> Result<Self> {
        config.validate()?;
        let seed = config
            .random_seed
            .unwrap_or_else(|| rand::rng().random::<u64>());
        debug!(event = "rng_seed", seed = seed);

        let handle = SolverHandle::new(PhaseTimeouts::from_millis(
            config.first_phase_timeout_ms,
            config.second_phase_timeout_ms,
        ));
        let counter = SolutionCounter::new(config.solutions_already_counted);

        Ok(Self {
            config,
            mechanism,
            events,
            handle,
            counter,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Creates a solver with the mechanism named by `config.mechanism`.
    pub fn from_config(config: SolverConfig, events: SolverEventSupport) -> Result<Self> {
        config.validate()?;
        let mechanism = mechanism::build(config.mechanism, config.mechanisms_engaged)?;
        Self::new(config, mechanism, events)
    }

    /// Handle for aborting the run or changing timeouts from another thread.
    pub fn handle(&self) -> SolverHandle {
        self.handle.clone()
    }

    pub fn counter(&self) -> SolutionCounter {
        self.counter.clone()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SolverEventListener>) {
        self.events.add_listener(listener);
    }

    /// Optimizes `initial` until the last epoch finishes or the run is aborted.
    ///
    /// Cancellation is a normal way to stop: the report comes back with
    /// `cancelled` set and no further events are emitted.
    ///
    /// # Errors
    ///
    /// Returns [`TourForgeError::Config`] for fewer than two points.
    pub fn run(&mut self, initial: &[Point]) -> Result<RunReport> {
        if initial.len() < 2 {
            return Err(TourForgeError::config(format!(
                "at least 2 points are required, got {}",
                initial.len()
            )));
        }

        let started = Instant::now();
        self.handle.set_solving(true);

        let mut best = ScoredTour::new(initial.to_vec());
        let mut bar = match self.config.starting_best_distance {
            Some(distance) if distance < best.distance => distance,
            _ => best.distance,
        };

        info!(
            event = "run_start",
            points = initial.len(),
            mechanism = %self.mechanism.kind(),
            workers = self.config.mechanisms_engaged,
            start_epoch = self.config.start_epoch,
            max_epochs = self.config.max_epochs,
            distance = best.distance,
        );
        self.events.fire_run_started(initial.len());

        let mut tally = RunTally::default();
        let mut epochs_completed = 0;
        let mut cancelled = false;
        let mut seeds = vec![best.clone()];

        for epoch in self.config.start_epoch..=self.config.max_epochs {
            let Some(mut candidates) =
                self.run_phase(epoch, Phase::Recombination, &seeds, &mut tally)
            else {
                cancelled = true;
                break;
            };
            if candidates.is_empty() {
                candidates = seeds.clone();
            }
            self.publish(epoch, Phase::Recombination, &candidates[0], &mut best, &mut bar);

            let Some(mut refined) =
                self.run_phase(epoch, Phase::LocalSearch, &candidates, &mut tally)
            else {
                cancelled = true;
                break;
            };
            if refined.is_empty() {
                refined = candidates;
            }
            self.publish(epoch, Phase::LocalSearch, &refined[0], &mut best, &mut bar);

            refined.truncate(1);
            seeds = refined;
            epochs_completed += 1;
        }

        if cancelled {
            self.events.close();
            info!(event = "run_cancelled", "Calculations were interrupted!");
        }

        self.handle.set_solving(false);
        let report = RunReport {
            best_distance: best.distance,
            best: best.points,
            epochs_completed,
            solutions: self.counter.get(),
            cancelled,
            phase_timeouts: tally.phase_timeouts,
            worker_failures: tally.worker_failures,
            duration: started.elapsed(),
            phases: tally.phases,
        };

        info!(
            event = "run_end",
            epochs = report.epochs_completed,
            solutions = report.solutions,
            distance = report.best_distance,
            duration_ms = report.duration.as_millis() as u64,
            cancelled = report.cancelled,
        );
        if !cancelled && !self.handle.is_aborted() {
            self.events.fire_run_ended(report.best_distance);
        }
        Ok(report)
    }

    /// Spawns one worker per engaged mechanism and collects their best tours,
    /// shortest first. Returns `None` when the run was cancelled.
    fn run_phase(
        &mut self,
        epoch: u64,
        phase: Phase,
        inputs: &[ScoredTour],
        tally: &mut RunTally,
    ) -> Option<Vec<ScoredTour>> {
        let cancel = self.handle.cancel_signal().clone();
        if cancel.is_cancelled() {
            return None;
        }

        let timeout = self.handle.timeouts().for_phase(phase);
        let workers = self.config.mechanisms_engaged;
        info!(
            event = "phase_start",
            epoch = epoch,
            phase = phase.number(),
            phase_name = phase.name(),
            workers = workers,
            timeout_ms = timeout.as_millis() as u64,
        );

        let started = Instant::now();
        let mut spawned: Vec<(WorkerHandle, BestRecord<ScoredTour>)> = Vec::with_capacity(workers);
        for i in 0..workers {
            let seed = inputs[i % inputs.len()].points.clone();
            let (job, record) = self.worker_job(phase, seed);
            spawned.push((self.mechanism.spawn(job), record));
        }

        let handles: Vec<WorkerHandle> = spawned.iter().map(|(h, _)| h.clone()).collect();
        let outcome = self.mechanism.barrier_wait(&handles, timeout, &cancel);
        self.mechanism.cleanup();

        if outcome == BarrierOutcome::Cancelled || cancel.is_cancelled() {
            return None;
        }
        if outcome == BarrierOutcome::TimedOut {
            tally.phase_timeouts += 1;
            warn!(
                event = "phase_timeout",
                epoch = epoch,
                phase = phase.number(),
                timeout_ms = timeout.as_millis() as u64,
                "Phase {} timeout",
                phase.number()
            );
        }

        let mut results = Vec::with_capacity(workers);
        let mut failures = 0;
        for (handle, record) in &spawned {
            if handle.state() == WorkerState::Failed {
                failures += 1;
                warn!(
                    event = "worker_failure",
                    epoch = epoch,
                    phase = phase.number(),
                    worker = handle.id(),
                    message = handle.failure().unwrap_or("unknown"),
                );
                continue;
            }
            let tour = record.get();
            debug!(
                event = "worker_result",
                epoch = epoch,
                phase = phase.number(),
                worker = handle.id(),
                state = ?handle.state(),
                distance = tour.distance,
            );
            results.push(tour);
        }
        tally.worker_failures += failures;
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let duration = started.elapsed();
        let best_distance = results.first().map(|t| t.distance);
        info!(
            event = "phase_end",
            epoch = epoch,
            phase = phase.number(),
            phase_name = phase.name(),
            duration_ms = duration.as_millis() as u64,
            outcome = outcome.as_str(),
            contributors = results.len(),
            solutions = self.counter.get(),
            distance = best_distance.unwrap_or(f64::NAN),
        );
        tally.phases.push(PhaseRecord {
            epoch,
            phase: phase.number(),
            duration,
            outcome,
            contributors: results.len(),
            failures,
            best_distance,
            solutions: self.counter.get(),
        });

        Some(results)
    }

    fn worker_job(&mut self, phase: Phase, seed: Vec<Point>) -> (Job, BestRecord<ScoredTour>) {
        match phase {
            Phase::Recombination => {
                let rng = ChaCha8Rng::seed_from_u64(self.rng.random::<u64>());
                let mut crossover = PmxCrossover::new(seed, self.counter.clone(), rng);
                let record = crossover.best_record();
                (Box::new(move || crossover.next_generation()), record)
            }
            Phase::LocalSearch => {
                let mut search = ThreeOptSearch::new(seed, self.counter.clone());
                let record = search.best_record();
                (
                    Box::new(move || {
                        search.find();
                    }),
                    record,
                )
            }
        }
    }

    /// Adopts `candidate` when it beats the bar, then reports the phase.
    fn publish(
        &self,
        epoch: u64,
        phase: Phase,
        candidate: &ScoredTour,
        best: &mut ScoredTour,
        bar: &mut f64,
    ) {
        if candidate.distance < *bar {
            *bar = candidate.distance;
            *best = candidate.clone();
            info!(
                event = "new_best",
                epoch = epoch,
                phase = phase.number(),
                distance = candidate.distance,
            );
            self.events.fire_best_route(&BestRouteUpdate {
                points: best.points.clone(),
            });
        }

        self.events.fire_status(&StatusUpdate {
            epoch,
            phase: phase.number(),
            solutions_counter: self.counter.get(),
        });
    }
}
