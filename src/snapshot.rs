/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Portable snapshot of an optimizer for persistence and transport.
//!
//! Captures the pristine original matrix, the calibrated working matrix, the
//! search configuration and the scoring setup, so that a host can save a calibration and resume it
//! later with the same motion-limit reference.
//!
//! Matrices are encoded as nested rows and validated on decode: a ragged,
//! empty or negative matrix fails to deserialize.
//!
//! # no_std
//!
//! This module requires the `serde` feature and only needs `alloc`.

use alloc::vec::Vec;

use crate::error::CalibrationError;
use crate::matrix::CompatibilityMatrix;
use crate::penalty::Evaluation;
use crate::score::ScoreModel;
use crate::search::{LocalSearchOptimizer, SearchConfig};
use crate::tier::TierTable;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Serializable optimizer state.
///
/// # Example
///
/// ```rust,ignore
/// use tier_calibration::snapshot::CalibrationSnapshot;
///
/// let snapshot = CalibrationSnapshot::from_optimizer(&optimizer, Some(outcome.evaluation));
/// let json = serde_json::to_string(&snapshot).unwrap();
/// let restored: CalibrationSnapshot = serde_json::from_str(&json).unwrap();
/// let optimizer = restored.into_optimizer()?;
/// ```
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct CalibrationSnapshot {
    /// Format version, [`SNAPSHOT_VERSION`] for new snapshots.
    pub version: u16,
    /// Motion-limit reference matrix.
    pub original: CompatibilityMatrix,
    /// Calibrated working matrix.
    pub calibrated: CompatibilityMatrix,
    /// Search configuration in effect.
    pub config: SearchConfig,
    /// Score model in effect. Defaults when absent.
    #[serde(default)]
    pub score_model: ScoreModel,
    /// Tier table in effect. Defaults when absent.
    #[serde(default)]
    pub tier_table: TierTable,
    /// Evaluation of `calibrated` at capture time, if known.
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
}

impl CalibrationSnapshot {
    /// Capture an optimizer's matrices and configuration.
    pub fn from_optimizer(optimizer: &LocalSearchOptimizer, evaluation: Option<Evaluation>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            original: optimizer.original().clone(),
            calibrated: optimizer.matrix().clone(),
            config: optimizer.config().clone(),
            score_model: optimizer.score_model().clone(),
            tier_table: optimizer.tier_table().clone(),
            evaluation,
        }
    }

    /// Rebuild an optimizer with the captured scoring setup.
    ///
    /// Fails when the two matrices differ in shape or the motion limit is
    /// invalid.
    pub fn into_optimizer(self) -> Result<LocalSearchOptimizer, CalibrationError> {
        Ok(LocalSearchOptimizer::restore(self.original, self.calibrated, self.config)?
            .with_score_model(self.score_model)
            .with_tier_table(self.tier_table))
    }

    /// Cells the calibration moved away from the original.
    pub fn changed_cells(&self) -> Vec<(usize, usize)> {
        self.calibrated.changed_cells(&self.original)
    }

    /// Largest drift of any cell from the original.
    pub fn max_deviation(&self) -> f64 {
        self.calibrated.max_deviation(&self.original)
    }
}
