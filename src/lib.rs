//! # tier-calibration
//!
//! Calibrates a pairwise compatibility matrix against expert-labeled
//! observations, so that each observation's derived score lands inside its
//! labeled tier on a six-tier ordinal scale.
//!
//! ---
//!
//! ## The problem
//!
//! A human-authored matrix gives the compatibility of identity `a` toward
//! identity `b`. A lineage of seven identities scores as a fixed combination of
//! matrix cells plus a base and small bonuses. Experts label observed lineages
//! with a tier (`×` … `☆`). When a score falls outside its label's range, the
//! matrix contradicts the expert.
//!
//! The optimizer nudges one cell at a time to reduce the total squared
//! distance outside the labeled ranges, without letting any cell drift more
//! than a fixed distance from the human-authored value. It is a greedy hill
//! climber: it guarantees the returned matrix is never worse than the starting
//! one, not that it is globally optimal.
//!
//! ## The pipeline
//!
//! ```text
//! ObservationStore → [Observation] ─┐
//!                                   ▼
//! CompatibilityMatrix → LocalSearchOptimizer ⇄ evaluate (ScoreModel + TierTable)
//!                                   │
//!                                   ▼
//!                      best matrix + Evaluation → CalibrationSnapshot
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`matrix`] | [`CompatibilityMatrix`] | Non-negative dense matrix; out-of-range reads are zero |
//! | [`observation`] | [`Observation`], [`Lineage`] | Labeled data point and its upsert key |
//! | [`tier`] | [`Tier`], [`TierTable`] | Symbols, score → tier, tier ranges |
//! | [`score`] | [`ScoreModel`] | Deterministic lineage score |
//! | [`penalty`] | [`Evaluation`] | Squared out-of-tier penalty and contradiction count |
//! | [`search`] | [`LocalSearchOptimizer`] | Motion-limited hill climbing with priority sampling |
//! | `snapshot` | `CalibrationSnapshot` | Serializable optimizer state (requires `serde`) |
//! | `store` | `ObservationStore` | Durable upserting observation list (requires `store`) |
//!
//! ## Quick start
//!
//! ```rust
//! use tier_calibration::{
//!     seeded_rng, CompatibilityMatrix, Lineage, LocalSearchOptimizer, Observation,
//!     SearchParams, Silent, Tier,
//! };
//!
//! let matrix = CompatibilityMatrix::filled(1, 1, 0.0).unwrap();
//! let observations = [Observation::labeled(Lineage::uniform(0), Tier::Star)];
//!
//! let mut optimizer = LocalSearchOptimizer::new(&matrix);
//! let outcome = optimizer
//!     .optimize(&observations, &SearchParams::new(500, 5.0), &mut seeded_rng(1), &mut Silent)
//!     .unwrap();
//! assert!(outcome.evaluation.penalty < outcome.initial.penalty);
//! ```
//!
//! ## `no_std`
//!
//! The core is `#![no_std]` and needs only `alloc`. Enable `std` for the
//! standard library, `serde` for serialization and `snapshot`, and `store`
//! for the persistent observation store. `python-ffi` builds PyO3 bindings.
//!
//! ## License
//!
//! Business Source License 1.1. Free for evaluation and non-production use.
//! Commercial production use requires a license from Flout Labs (cbyrne@floutlabs.com).

#![cfg_attr(not(any(feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

#[cfg(any(feature = "std", feature = "python-ffi"))]
extern crate std;

pub mod error;
pub mod matrix;
pub mod observation;
pub mod tier;
pub mod score;
pub mod penalty;
pub mod search;
#[cfg(feature = "serde")]
pub mod snapshot;
#[cfg(feature = "store")]
pub mod store;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use error::CalibrationError;
pub use matrix::CompatibilityMatrix;
pub use observation::{Lineage, Observation, ObservationKey};
pub use penalty::{evaluate, evaluate_with, report, Evaluation, ObservationReport};
pub use score::{score, ScoreModel};
pub use search::{
    seeded_rng, LocalSearchOptimizer, Progress, ProgressObserver, SearchConfig, SearchControl,
    SearchOutcome, SearchParams, SearchStats, Silent,
};
pub use tier::{classify, Tier, TierRange, TierTable};
