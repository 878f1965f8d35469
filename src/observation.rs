/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Labeled observations: a lineage, bonus counts and an expert-assigned tier.
//!
//! The label is kept as the raw symbol string so that malformed labels survive
//! storage and are simply skipped at evaluation time.

use alloc::string::String;

use crate::tier::Tier;

/// Seven identity references describing a pairing.
///
/// Each entry is a matrix index. `None` means the identity is unknown, which
/// makes the whole lineage score zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lineage {
    /// The offspring being scored.
    pub child: Option<usize>,
    /// Father.
    pub father: Option<usize>,
    /// Father's father.
    pub fathers_father: Option<usize>,
    /// Father's mother.
    pub fathers_mother: Option<usize>,
    /// Mother.
    pub mother: Option<usize>,
    /// Mother's father.
    pub mothers_father: Option<usize>,
    /// Mother's mother.
    pub mothers_mother: Option<usize>,
}

impl Lineage {
    /// Lineage with every identity present.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        child: usize,
        father: usize,
        fathers_father: usize,
        fathers_mother: usize,
        mother: usize,
        mothers_father: usize,
        mothers_mother: usize,
    ) -> Self {
        Self {
            child: Some(child),
            father: Some(father),
            fathers_father: Some(fathers_father),
            fathers_mother: Some(fathers_mother),
            mother: Some(mother),
            mothers_father: Some(mothers_father),
            mothers_mother: Some(mothers_mother),
        }
    }

    /// Lineage where every identity is the same index.
    pub fn uniform(id: usize) -> Self {
        Self::new(id, id, id, id, id, id, id)
    }

    /// `true` when all seven identities are known.
    pub fn is_complete(&self) -> bool {
        self.child.is_some()
            && self.father.is_some()
            && self.fathers_father.is_some()
            && self.fathers_mother.is_some()
            && self.mother.is_some()
            && self.mothers_father.is_some()
            && self.mothers_mother.is_some()
    }
}

/// Identity of an observation for upsert purposes: lineage plus both bonus
/// counts. Label fields are not part of the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObservationKey {
    /// The lineage.
    pub lineage: Lineage,
    /// Three-generation bonus count.
    pub s3: u32,
    /// Two-generation bonus count.
    pub s2: u32,
}

/// A labeled data point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Identities being scored.
    pub lineage: Lineage,
    /// Three-generation bonus count, worth 12.5 points each.
    pub s3: u32,
    /// Two-generation bonus count, worth 5 points each.
    pub s2: u32,
    /// Optional flat bonus added to the score.
    #[cfg_attr(feature = "serde", serde(default))]
    pub noble: Option<f64>,
    /// Expert-assigned tier symbol, e.g. `"○"`.
    pub correct_symbol: String,
}

impl Observation {
    /// Observation with no bonuses.
    pub fn new(lineage: Lineage, correct_symbol: impl Into<String>) -> Self {
        Self {
            lineage,
            s3: 0,
            s2: 0,
            noble: None,
            correct_symbol: correct_symbol.into(),
        }
    }

    /// Observation labeled with a known tier.
    pub fn labeled(lineage: Lineage, tier: Tier) -> Self {
        Self::new(lineage, tier.symbol())
    }

    /// Set the bonus counts.
    pub fn with_bonuses(mut self, s3: u32, s2: u32) -> Self {
        self.s3 = s3;
        self.s2 = s2;
        self
    }

    /// Set the flat bonus.
    pub fn with_noble(mut self, noble: f64) -> Self {
        self.noble = Some(noble);
        self
    }

    /// Upsert key.
    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            lineage: self.lineage,
            s3: self.s3,
            s2: self.s2,
        }
    }

    /// Parsed label, or `None` for an unknown symbol.
    pub fn expected_tier(&self) -> Option<Tier> {
        Tier::from_symbol(&self.correct_symbol)
    }
}
