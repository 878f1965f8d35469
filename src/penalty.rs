/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Tier-violation penalty over an observation set.
//!
//! For each observation the score is compared with its labeled tier's range:
//!
//! - top tier: `(min − score)²` when `score < min`, otherwise 0 (no upper bound)
//! - other tiers: `(min − score)²` below, `(score − max)²` above, 0 inside
//! - unknown label symbol: skipped entirely
//!
//! Every observation with nonzero penalty counts as one contradiction.

use alloc::vec::Vec;

use crate::matrix::CompatibilityMatrix;
use crate::observation::Observation;
use crate::score::ScoreModel;
use crate::tier::{Tier, TierTable};

/// Aggregate penalty of one matrix over an observation set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// Sum of squared out-of-range distances. Always `>= 0`.
    pub penalty: f64,
    /// Number of observations whose score falls outside their tier.
    pub contradictions: usize,
}

/// Per-observation breakdown, for inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationReport {
    /// Position in the evaluated slice.
    pub index: usize,
    /// Computed score.
    pub score: f64,
    /// Tier the score classifies into.
    pub classified: Tier,
    /// Labeled tier, `None` when the label symbol is unknown.
    pub expected: Option<Tier>,
    /// Squared distance outside the labeled range. Zero when skipped.
    pub penalty: f64,
}

impl ObservationReport {
    /// `true` when the observation was penalized.
    pub fn is_contradiction(&self) -> bool {
        self.penalty > 0.0
    }
}

/// Penalty of one score against its labeled tier.
///
/// Returns `None` when the label is unknown.
pub fn observation_penalty(table: &TierTable, symbol: &str, score: f64) -> Option<f64> {
    let tier = Tier::from_symbol(symbol)?;
    let range = table.range(tier);
    let d = if tier.is_top() {
        if score < range.min { range.min - score } else { 0.0 }
    } else {
        range.distance(score)
    };
    Some(d * d)
}

/// Evaluate with an explicit score model and tier table.
pub fn evaluate_with(
    model: &ScoreModel,
    table: &TierTable,
    matrix: &CompatibilityMatrix,
    observations: &[Observation],
) -> Evaluation {
    let mut eval = Evaluation::default();
    for obs in observations {
        let score = model.score_observation(matrix, obs);
        let Some(p) = observation_penalty(table, &obs.correct_symbol, score) else {
            continue;
        };
        if p > 0.0 {
            eval.penalty += p;
            eval.contradictions += 1;
        }
    }
    eval
}

/// Evaluate with the default score model and tier table.
pub fn evaluate(matrix: &CompatibilityMatrix, observations: &[Observation]) -> Evaluation {
    evaluate_with(&ScoreModel::default(), &TierTable::default(), matrix, observations)
}

/// Per-observation breakdown with the default score model and tier table.
pub fn report(matrix: &CompatibilityMatrix, observations: &[Observation]) -> Vec<ObservationReport> {
    let model = ScoreModel::default();
    let table = TierTable::default();
    observations
        .iter()
        .enumerate()
        .map(|(index, obs)| {
            let score = model.score_observation(matrix, obs);
            ObservationReport {
                index,
                score,
                classified: table.classify(score),
                expected: obs.expected_tier(),
                penalty: observation_penalty(&table, &obs.correct_symbol, score).unwrap_or(0.0),
            }
        })
        .collect()
}
