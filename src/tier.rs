/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Ordinal tier classification and the tier range table.
//!
//! - [`Tier`]: the six ordinal buckets and their symbols.
//! - [`TierRange`]: inclusive `[min, max]` score interval of one tier.
//! - [`TierTable`]: configurable boundaries; classifies scores and serves ranges.
//!
//! # Invariants
//!
//! - Ranges are contiguous and ordered lowest to highest.
//! - The top tier is open-ended: it has a lower bound only.
//! - Classification is a descending-threshold lookup over the lower bounds.

// ─── Tier ────────────────────────────────────────────────────────────────────

/// One of six ordinal compatibility tiers, lowest to highest.
///
/// ```text
///  ×        △          ▲          ○          ◎          ☆
///  [0,254]  [255,373]  [374,489]  [490,613]  [614,659]  [660, ∞)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tier {
    /// `×`: poor compatibility.
    Cross,
    /// `△`: weak.
    Triangle,
    /// `▲`: fair.
    FilledTriangle,
    /// `○`: good.
    Circle,
    /// `◎`: very good.
    DoubleCircle,
    /// `☆`: best. Open-ended above its lower bound.
    Star,
}

impl Tier {
    /// All tiers, lowest to highest.
    pub const ALL: [Tier; 6] = [
        Tier::Cross,
        Tier::Triangle,
        Tier::FilledTriangle,
        Tier::Circle,
        Tier::DoubleCircle,
        Tier::Star,
    ];

    /// The highest tier.
    pub const TOP: Tier = Tier::Star;

    /// Label symbol used in observations.
    pub fn symbol(&self) -> &'static str {
        match self {
            Tier::Cross => "×",
            Tier::Triangle => "△",
            Tier::FilledTriangle => "▲",
            Tier::Circle => "○",
            Tier::DoubleCircle => "◎",
            Tier::Star => "☆",
        }
    }

    /// Parse a label symbol. Unknown symbols yield `None`.
    pub fn from_symbol(symbol: &str) -> Option<Tier> {
        Tier::ALL.into_iter().find(|t| t.symbol() == symbol)
    }

    /// Position on the ordinal scale, 0 for the lowest tier.
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    /// `true` for the open-ended top tier.
    pub fn is_top(&self) -> bool {
        *self == Tier::TOP
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ─── TierRange ───────────────────────────────────────────────────────────────

/// Inclusive score interval for one tier. `max` is `None` for the top tier.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierRange {
    /// Lowest score inside the tier.
    pub min: f64,
    /// Highest score inside the tier, or `None` when unbounded.
    pub max: Option<f64>,
}

impl TierRange {
    /// Distance of `score` outside the range; zero when inside.
    pub fn distance(&self, score: f64) -> f64 {
        if score < self.min {
            return self.min - score;
        }
        match self.max {
            Some(max) if score > max => score - max,
            _ => 0.0,
        }
    }

    /// `true` when `score` lies inside the range.
    pub fn contains(&self, score: f64) -> bool {
        self.distance(score) == 0.0
    }
}

// ─── TierTable ───────────────────────────────────────────────────────────────

/// Tier boundary table.
///
/// `lower_bounds[i]` is the minimum score of `Tier::ALL[i]`. Each tier's
/// maximum is the next tier's minimum minus one; the top tier has no maximum.
///
/// Default bounds: 0, 255, 374, 490, 614, 660.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierTable {
    /// Minimum score per tier, lowest tier first.
    pub lower_bounds: [f64; 6],
}

impl TierTable {
    /// Standard table with the default boundaries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a score with a descending-threshold lookup.
    ///
    /// Scores below every threshold, including negatives, fall to the lowest tier.
    pub fn classify(&self, score: f64) -> Tier {
        for tier in Tier::ALL[1..].iter().rev() {
            if score >= self.lower_bounds[tier.ordinal()] {
                return *tier;
            }
        }
        Tier::Cross
    }

    /// Inclusive score range of `tier`.
    pub fn range(&self, tier: Tier) -> TierRange {
        let i = tier.ordinal();
        let max = if tier.is_top() {
            None
        } else {
            Some(self.lower_bounds[i + 1] - 1.0)
        };
        TierRange {
            min: self.lower_bounds[i],
            max,
        }
    }

    /// Range for a label symbol, or `None` when the symbol is unknown.
    pub fn range_for_symbol(&self, symbol: &str) -> Option<TierRange> {
        Tier::from_symbol(symbol).map(|t| self.range(t))
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            lower_bounds: [0.0, 255.0, 374.0, 490.0, 614.0, 660.0],
        }
    }
}

/// Classify a score against the default table.
pub fn classify(score: f64) -> Tier {
    TierTable::default().classify(score)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_roundtrip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_symbol(tier.symbol()), Some(tier));
        }
        assert_eq!(Tier::from_symbol("x"), None);
        assert_eq!(Tier::from_symbol(""), None);
    }

    #[test]
    fn test_tiers_are_ordered() {
        for pair in Tier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Tier::Cross.ordinal(), 0);
        assert_eq!(Tier::Star.ordinal(), 5);
        assert!(Tier::Star.is_top());
        assert!(!Tier::DoubleCircle.is_top());
    }

    #[test]
    fn test_classify_thresholds() {
        let table = TierTable::default();
        let cases: &[(f64, Tier)] = &[
            (0.0, Tier::Cross),
            (224.0, Tier::Cross),
            (254.9, Tier::Cross),
            (255.0, Tier::Triangle),
            (373.0, Tier::Triangle),
            (374.0, Tier::FilledTriangle),
            (489.5, Tier::FilledTriangle),
            (490.0, Tier::Circle),
            (613.0, Tier::Circle),
            (614.0, Tier::DoubleCircle),
            (659.9, Tier::DoubleCircle),
            (660.0, Tier::Star),
            (10_000.0, Tier::Star),
            (-5.0, Tier::Cross),
        ];
        for &(score, expected) in cases {
            assert_eq!(table.classify(score), expected, "score={}", score);
        }
    }

    #[test]
    fn test_default_ranges() {
        let table = TierTable::default();
        assert_eq!(table.range(Tier::Cross), TierRange { min: 0.0, max: Some(254.0) });
        assert_eq!(table.range(Tier::Triangle), TierRange { min: 255.0, max: Some(373.0) });
        assert_eq!(table.range(Tier::FilledTriangle), TierRange { min: 374.0, max: Some(489.0) });
        assert_eq!(table.range(Tier::Circle), TierRange { min: 490.0, max: Some(613.0) });
        assert_eq!(table.range(Tier::DoubleCircle), TierRange { min: 614.0, max: Some(659.0) });
        assert_eq!(table.range(Tier::Star), TierRange { min: 660.0, max: None });
    }

    #[test]
    fn test_range_distance() {
        let r = TierRange { min: 255.0, max: Some(373.0) };
        assert_eq!(r.distance(250.0), 5.0);
        assert_eq!(r.distance(300.0), 0.0);
        assert_eq!(r.distance(380.0), 7.0);
        assert!(r.contains(255.0));
        assert!(r.contains(373.0));

        let top = TierTable::default().range(Tier::Star);
        assert_eq!(top.distance(659.0), 1.0);
        assert_eq!(top.distance(5_000.0), 0.0);
    }

    #[test]
    fn test_custom_bounds_shift_classification() {
        let strict = TierTable {
            lower_bounds: [0.0, 300.0, 400.0, 500.0, 650.0, 700.0],
        };
        assert_eq!(strict.classify(660.0), Tier::DoubleCircle);
        assert_eq!(TierTable::default().classify(660.0), Tier::Star);
        assert_eq!(strict.range_for_symbol("△"), Some(TierRange { min: 300.0, max: Some(399.0) }));
        assert_eq!(strict.range_for_symbol("?"), None);
    }

    #[test]
    fn test_free_classify_uses_defaults() {
        assert_eq!(classify(490.0), Tier::Circle);
    }
}
