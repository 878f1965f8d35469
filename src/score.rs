/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Deterministic compatibility score of a lineage against a matrix.
//!
//! ```text
//! score = c(child,f)
//!       + min(c(f,ff), c(child,ff)) + min(c(f,fm), c(child,fm))
//!       + c(child,m)
//!       + min(c(m,mf), c(child,mf)) + min(c(m,mm), c(child,mm))
//!       + c(f,m)
//!       + base + s2 × 5 + s3 × 12.5 + noble
//! ```
//!
//! Terms are added left to right in exactly this order so that results are
//! bit-identical across callers; the optimizer compares penalties with `<=`.

use crate::matrix::CompatibilityMatrix;
use crate::observation::{Lineage, Observation};

/// Score constants. `Default` gives base 224, s2 weight 5, s3 weight 12.5.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreModel {
    /// Fixed base added to every complete lineage.
    pub base: f64,
    /// Points per two-generation bonus.
    pub s2_weight: f64,
    /// Points per three-generation bonus.
    pub s3_weight: f64,
}

impl Default for ScoreModel {
    fn default() -> Self {
        Self {
            base: 224.0,
            s2_weight: 5.0,
            s3_weight: 12.5,
        }
    }
}

impl ScoreModel {
    /// Score a lineage. Returns `0.0` if any identity is missing.
    pub fn score(
        &self,
        matrix: &CompatibilityMatrix,
        lineage: &Lineage,
        s3: u32,
        s2: u32,
        noble: Option<f64>,
    ) -> f64 {
        let (
            Some(child),
            Some(f),
            Some(ff),
            Some(fm),
            Some(m),
            Some(mf),
            Some(mm),
        ) = (
            lineage.child,
            lineage.father,
            lineage.fathers_father,
            lineage.fathers_mother,
            lineage.mother,
            lineage.mothers_father,
            lineage.mothers_mother,
        )
        else {
            return 0.0;
        };

        let comb = |a: usize, b: usize| matrix.get(a, b);

        comb(child, f)
            + comb(f, ff).min(comb(child, ff))
            + comb(f, fm).min(comb(child, fm))
            + comb(child, m)
            + comb(m, mf).min(comb(child, mf))
            + comb(m, mm).min(comb(child, mm))
            + comb(f, m)
            + self.base
            + s2 as f64 * self.s2_weight
            + s3 as f64 * self.s3_weight
            + noble.unwrap_or(0.0)
    }

    /// Score an observation's lineage and bonuses.
    pub fn score_observation(&self, matrix: &CompatibilityMatrix, obs: &Observation) -> f64 {
        self.score(matrix, &obs.lineage, obs.s3, obs.s2, obs.noble)
    }
}

/// Score with the default model.
pub fn score(
    matrix: &CompatibilityMatrix,
    lineage: &Lineage,
    s3: u32,
    s2: u32,
    noble: Option<f64>,
) -> f64 {
    ScoreModel::default().score(matrix, lineage, s3, s2, noble)
}
