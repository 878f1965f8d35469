/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Constrained local search over matrix cells.
//!
//! Each iteration perturbs one cell by `±step_size`, keeps the move if the
//! total penalty does not get worse, and otherwise reverts that cell. The best
//! matrix seen is snapshotted on every strict improvement and returned.
//!
//! # Cell selection
//!
//! During the first half of a run, when priority identities are given, a cell
//! is chosen with probability `priority_probability` (default 0.8) by pinning
//! its row or its column (coin flip) to a random priority identity. All other
//! picks, and every pick in the second half, are uniform over the matrix.
//!
//! # Motion limit
//!
//! A cell may not drift more than `motion_limit` (default 20) from its value in
//! the pristine original matrix:
//!
//! ```text
//! window = [max(0, base − limit), base + limit]
//! proposal inside window                       → apply as-is
//! outside, but not further out than current    → clamp to nearest bound
//! further out than current                     → reject, not a trial
//! ```
//!
//! # Invariants
//!
//! - The original matrix is never written during search.
//! - Entries stay `>= 0`.
//! - The returned penalty is `<=` the starting penalty; the tracked best never
//!   gets worse.
//! - Progress checkpoints never change outcomes unless the observer asks to stop.

use alloc::vec::Vec;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::error::CalibrationError;
use crate::matrix::CompatibilityMatrix;
use crate::observation::Observation;
use crate::penalty::{evaluate_with, Evaluation};
use crate::score::ScoreModel;
use crate::tier::TierTable;

// ─── Config ──────────────────────────────────────────────────────────────────

/// Tunables that stay fixed across runs of one optimizer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Maximum distance of any cell from its original value. Default: 20.
    pub motion_limit: f64,
    /// Iterations between progress checkpoints, counting from 0. Default: 50.
    pub progress_interval: usize,
    /// Chance of a priority-pinned pick during the first half. Default: 0.8.
    pub priority_probability: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            motion_limit: 20.0,
            progress_interval: 50,
            priority_probability: 0.8,
        }
    }
}

/// Per-run parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchParams {
    /// Number of iterations, including rejected ones.
    pub iterations: usize,
    /// Magnitude of each perturbation. Must be finite and positive.
    pub step_size: f64,
    /// Identities to focus on during the first half. May be empty.
    pub priority: Vec<usize>,
}

impl SearchParams {
    /// Parameters with no priority identities.
    pub fn new(iterations: usize, step_size: f64) -> Self {
        Self {
            iterations,
            step_size,
            priority: Vec::new(),
        }
    }

    /// Focus the first half of the run on these identities.
    pub fn with_priority(mut self, priority: impl Into<Vec<usize>>) -> Self {
        self.priority = priority.into();
        self
    }
}

// ─── Progress protocol ───────────────────────────────────────────────────────

/// Snapshot handed to a [`ProgressObserver`] at each checkpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Index of the iteration about to run.
    pub iteration: usize,
    /// Total iterations requested.
    pub total: usize,
    /// Evaluation of the working matrix.
    pub current: Evaluation,
    /// Evaluation of the best matrix so far.
    pub best: Evaluation,
}

/// Observer decision at a checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchControl {
    /// Keep searching.
    Continue,
    /// End the run now and return the best matrix so far.
    Stop,
}

/// Receives progress at a fixed cadence and may stop the run.
///
/// This is the host's scheduling hook: a UI can repaint or yield here, and a
/// cancellation request is honored by returning [`SearchControl::Stop`].
pub trait ProgressObserver {
    /// Called before iterations `0, interval, 2·interval, …`. The reported
    /// evaluations are those before that iteration's step.
    fn on_progress(&mut self, progress: &Progress) -> SearchControl;
}

/// Observer that ignores progress and never stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_progress(&mut self, _progress: &Progress) -> SearchControl {
        SearchControl::Continue
    }
}

impl<F> ProgressObserver for F
where
    F: FnMut(&Progress) -> SearchControl,
{
    fn on_progress(&mut self, progress: &Progress) -> SearchControl {
        self(progress)
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Moves applied and evaluated.
    pub trials: usize,
    /// Trials kept because the penalty did not get worse.
    pub accepted: usize,
    /// Accepted trials that strictly improved on the best.
    pub improvements: usize,
    /// Proposals dropped by the motion limit before evaluation.
    pub motion_rejections: usize,
}

/// Result of [`LocalSearchOptimizer::optimize`].
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    /// Best matrix found.
    pub matrix: CompatibilityMatrix,
    /// Its evaluation.
    pub evaluation: Evaluation,
    /// Evaluation of the matrix the run started from.
    pub initial: Evaluation,
    /// Run counters.
    pub stats: SearchStats,
    /// `true` when an observer stopped the run before the last iteration.
    pub stopped_early: bool,
}

/// Deterministic random source for reproducible runs.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

// ─── Optimizer ───────────────────────────────────────────────────────────────

/// Hill-climbing calibrator that owns its matrices.
///
/// Holds a pristine copy of the starting matrix, used only as the motion-limit
/// reference, and a working copy that each [`optimize`](Self::optimize) call
/// starts from and replaces with its best result.
#[derive(Clone, Debug)]
pub struct LocalSearchOptimizer {
    original: CompatibilityMatrix,
    matrix: CompatibilityMatrix,
    config: SearchConfig,
    model: ScoreModel,
    table: TierTable,
}

impl LocalSearchOptimizer {
    /// Optimizer with default configuration. `initial` is copied twice.
    pub fn new(initial: &CompatibilityMatrix) -> Self {
        Self::with_config(initial, SearchConfig::default())
    }

    /// Optimizer with a custom search configuration.
    pub fn with_config(initial: &CompatibilityMatrix, config: SearchConfig) -> Self {
        Self {
            original: initial.clone(),
            matrix: initial.clone(),
            config,
            model: ScoreModel::default(),
            table: TierTable::default(),
        }
    }

    /// Replace the score model.
    pub fn with_score_model(mut self, model: ScoreModel) -> Self {
        self.model = model;
        self
    }

    /// Replace the tier table.
    pub fn with_tier_table(mut self, table: TierTable) -> Self {
        self.table = table;
        self
    }

    /// Rebuild from a pristine original and a previously calibrated matrix.
    pub fn restore(
        original: CompatibilityMatrix,
        calibrated: CompatibilityMatrix,
        config: SearchConfig,
    ) -> Result<Self, CalibrationError> {
        check_motion_limit(config.motion_limit)?;
        if original.shape() != calibrated.shape() {
            return Err(CalibrationError::DimensionMismatch {
                expected: original.shape(),
                found: calibrated.shape(),
            });
        }
        Ok(Self {
            original,
            matrix: calibrated,
            config,
            model: ScoreModel::default(),
            table: TierTable::default(),
        })
    }

    /// The pristine starting matrix.
    pub fn original(&self) -> &CompatibilityMatrix {
        &self.original
    }

    /// The retained working matrix.
    pub fn matrix(&self) -> &CompatibilityMatrix {
        &self.matrix
    }

    /// Search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Score model used for evaluation.
    pub fn score_model(&self) -> &ScoreModel {
        &self.model
    }

    /// Tier table used for evaluation.
    pub fn tier_table(&self) -> &TierTable {
        &self.table
    }

    /// Discard calibration and return to the original matrix.
    pub fn reset(&mut self) {
        self.matrix = self.original.clone();
    }

    /// Evaluate the retained matrix.
    pub fn evaluate(&self, observations: &[Observation]) -> Evaluation {
        evaluate_with(&self.model, &self.table, &self.matrix, observations)
    }

    /// Run the search from the retained matrix.
    ///
    /// The best matrix found becomes the retained matrix. With
    /// `iterations == 0` the retained matrix is returned unchanged together
    /// with its evaluation.
    pub fn optimize<R, O>(
        &mut self,
        observations: &[Observation],
        params: &SearchParams,
        rng: &mut R,
        observer: &mut O,
    ) -> Result<SearchOutcome, CalibrationError>
    where
        R: Rng + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        self.validate(params)?;

        let (rows, cols) = self.matrix.shape();
        let interval = self.config.progress_interval.max(1);

        let mut current = self.matrix.clone();
        let mut current_eval = evaluate_with(&self.model, &self.table, &current, observations);
        let initial = current_eval;
        let mut best = current.clone();
        let mut best_eval = current_eval;
        let mut stats = SearchStats::default();
        let mut stopped_early = false;

        debug!(
            iterations = params.iterations,
            step_size = params.step_size,
            priority = params.priority.len(),
            observations = observations.len(),
            penalty = initial.penalty,
            contradictions = initial.contradictions,
            "local search started"
        );

        for i in 0..params.iterations {
            if i % interval == 0 {
                let progress = Progress {
                    iteration: i,
                    total: params.iterations,
                    current: current_eval,
                    best: best_eval,
                };
                if observer.on_progress(&progress) == SearchControl::Stop {
                    debug!(iteration = i, "local search stopped by observer");
                    stopped_early = true;
                    break;
                }
            }

            let (r, c) = self.pick_cell(i, params, rows, cols, rng);
            let before = current.get(r, c);
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let proposed = (before + params.step_size * sign).max(0.0);

            let Some(value) = self.constrain(r, c, before, proposed) else {
                stats.motion_rejections += 1;
                continue;
            };

            current.set(r, c, value);
            let eval = evaluate_with(&self.model, &self.table, &current, observations);
            stats.trials += 1;

            if eval.penalty <= current_eval.penalty {
                current_eval = eval;
                stats.accepted += 1;
                if eval.penalty < best_eval.penalty {
                    best = current.clone();
                    best_eval = eval;
                    stats.improvements += 1;
                    trace!(
                        iteration = i,
                        row = r,
                        col = c,
                        value,
                        penalty = eval.penalty,
                        "new best"
                    );
                }
            } else {
                current.set(r, c, before);
            }
        }

        debug!(
            penalty = best_eval.penalty,
            contradictions = best_eval.contradictions,
            trials = stats.trials,
            accepted = stats.accepted,
            improvements = stats.improvements,
            motion_rejections = stats.motion_rejections,
            "local search finished"
        );

        self.matrix = best.clone();
        Ok(SearchOutcome {
            matrix: best,
            evaluation: best_eval,
            initial,
            stats,
            stopped_early,
        })
    }

    fn validate(&self, params: &SearchParams) -> Result<(), CalibrationError> {
        if !params.step_size.is_finite() || params.step_size <= 0.0 {
            return Err(CalibrationError::InvalidStepSize(params.step_size));
        }
        check_motion_limit(self.config.motion_limit)?;
        let (rows, cols) = self.matrix.shape();
        if let Some(&index) = params.priority.iter().find(|&&p| p >= rows || p >= cols) {
            return Err(CalibrationError::PriorityOutOfRange { index, rows, cols });
        }
        Ok(())
    }

    /// Choose the cell to perturb at iteration `i`.
    fn pick_cell<R: Rng + ?Sized>(
        &self,
        i: usize,
        params: &SearchParams,
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> (usize, usize) {
        let first_half = 2 * i < params.iterations;
        if first_half
            && !params.priority.is_empty()
            && rng.gen::<f64>() < self.config.priority_probability
        {
            let pinned = params.priority[rng.gen_range(0..params.priority.len())];
            return if rng.gen_bool(0.5) {
                (pinned, rng.gen_range(0..cols))
            } else {
                (rng.gen_range(0..rows), pinned)
            };
        }
        (rng.gen_range(0..rows), rng.gen_range(0..cols))
    }

    /// Apply the motion limit to a proposal. `None` means reject.
    fn constrain(&self, row: usize, col: usize, current: f64, proposed: f64) -> Option<f64> {
        let base = self.original.get(row, col);
        let lo = (base - self.config.motion_limit).max(0.0);
        let hi = base + self.config.motion_limit;
        let outside = |v: f64| {
            if v < lo {
                lo - v
            } else if v > hi {
                v - hi
            } else {
                0.0
            }
        };

        let excess = outside(proposed);
        if excess == 0.0 {
            Some(proposed)
        } else if excess > outside(current) {
            None
        } else {
            Some(proposed.clamp(lo, hi))
        }
    }
}

fn check_motion_limit(limit: f64) -> Result<(), CalibrationError> {
    if !limit.is_finite() || limit < 0.0 {
        return Err(CalibrationError::InvalidMotionLimit(limit));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
