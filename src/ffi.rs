//! Python FFI bindings via PyO3.
//!
//! Exposes scoring, tier classification and the local-search optimizer to a
//! Python host. Matrices cross the boundary as lists of rows.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from tier_calibration import Observation, Optimizer, classify, score
//!
//! matrix = [[0.0] * 4 for _ in range(4)]
//! obs = [Observation([0, 1, 2, 3, 1, 2, 3], "○", s3=1)]
//! opt = Optimizer(matrix)
//! penalty, contradictions = opt.optimize(obs, iterations=2000, step_size=2.0, priority=[1], seed=7)
//! print(classify(score(opt.matrix(), [0, 1, 2, 3, 1, 2, 3], 1, 0)))
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::matrix::CompatibilityMatrix;
use crate::observation::{Lineage, Observation as RustObservation};
use crate::penalty::evaluate;
use crate::score;
use crate::search::{seeded_rng, LocalSearchOptimizer, Progress, SearchControl, SearchParams};
use crate::tier;

/// Number of identities in a lineage list.
const LINEAGE_LEN: usize = 7;

fn to_py_err(e: crate::CalibrationError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn rows_to_matrix(rows: Vec<Vec<f64>>) -> PyResult<CompatibilityMatrix> {
    CompatibilityMatrix::from_rows(&rows).map_err(to_py_err)
}

fn ids_to_lineage(ids: &[Option<usize>]) -> PyResult<Lineage> {
    if ids.len() != LINEAGE_LEN {
        return Err(PyValueError::new_err(format!(
            "lineage must have exactly {LINEAGE_LEN} identities, got {}",
            ids.len()
        )));
    }
    Ok(Lineage {
        child: ids[0],
        father: ids[1],
        fathers_father: ids[2],
        fathers_mother: ids[3],
        mother: ids[4],
        mothers_father: ids[5],
        mothers_mother: ids[6],
    })
}

// ── Observation ───────────────────────────────────────────────────────────────

/// A labeled observation.
///
/// Args:
///     lineage: 7 identity indices (child, f, ff, fm, m, mf, mm); None for unknown
///     symbol:  expert tier label, one of × △ ▲ ○ ◎ ☆
///     s3, s2:  bonus counts
///     noble:   optional flat bonus
#[pyclass(name = "Observation")]
#[derive(Clone)]
pub struct PyObservation {
    inner: RustObservation,
}

#[pymethods]
impl PyObservation {
    /// Create a new Observation.
    #[new]
    #[pyo3(signature = (lineage, symbol, s3=0, s2=0, noble=None))]
    pub fn new(
        lineage: Vec<Option<usize>>,
        symbol: String,
        s3: u32,
        s2: u32,
        noble: Option<f64>,
    ) -> PyResult<Self> {
        let mut inner = RustObservation::new(ids_to_lineage(&lineage)?, symbol).with_bonuses(s3, s2);
        inner.noble = noble;
        Ok(Self { inner })
    }

    /// The label symbol.
    #[getter]
    pub fn symbol(&self) -> String {
        self.inner.correct_symbol.clone()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "Observation(symbol={:?}, s3={}, s2={})",
            self.inner.correct_symbol, self.inner.s3, self.inner.s2
        )
    }
}

// ── Optimizer ─────────────────────────────────────────────────────────────────

/// Local-search calibrator.
///
/// Keeps the starting matrix as the motion-limit reference; each optimize()
/// call continues from the previous best.
#[pyclass(name = "Optimizer")]
pub struct PyOptimizer {
    inner: LocalSearchOptimizer,
}

#[pymethods]
impl PyOptimizer {
    /// Create an optimizer from a list of rows.
    #[new]
    pub fn new(matrix: Vec<Vec<f64>>) -> PyResult<Self> {
        Ok(Self {
            inner: LocalSearchOptimizer::new(&rows_to_matrix(matrix)?),
        })
    }

    /// Run the search. Returns (penalty, contradictions) of the best matrix.
    ///
    /// Args:
    ///     observations: list of Observation
    ///     iterations:   number of iterations
    ///     step_size:    perturbation magnitude
    ///     priority:     identities to focus on during the first half
    ///     seed:         random seed for a reproducible run
    ///     on_progress:  optional callable(iteration, total, penalty, contradictions);
    ///                   returning True stops the run
    #[pyo3(signature = (observations, iterations, step_size, priority=Vec::new(), seed=0, on_progress=None))]
    pub fn optimize(
        &mut self,
        py: Python<'_>,
        observations: Vec<PyObservation>,
        iterations: usize,
        step_size: f64,
        priority: Vec<usize>,
        seed: u64,
        on_progress: Option<PyObject>,
    ) -> PyResult<(f64, usize)> {
        let obs: Vec<RustObservation> = observations.into_iter().map(|o| o.inner).collect();
        let params = SearchParams::new(iterations, step_size).with_priority(priority);
        let mut rng = seeded_rng(seed);

        let mut callback_error: Option<PyErr> = None;
        let mut observer = |p: &Progress| {
            let Some(cb) = &on_progress else {
                return SearchControl::Continue;
            };
            let args = (p.iteration, p.total, p.current.penalty, p.current.contradictions);
            match cb.call1(py, args).and_then(|r| r.bind(py).is_truthy()) {
                Ok(true) => SearchControl::Stop,
                Ok(false) => SearchControl::Continue,
                Err(e) => {
                    callback_error = Some(e);
                    SearchControl::Stop
                }
            }
        };

        let outcome = self
            .inner
            .optimize(&obs, &params, &mut rng, &mut observer)
            .map_err(to_py_err)?;
        if let Some(e) = callback_error {
            return Err(e);
        }
        Ok((outcome.evaluation.penalty, outcome.evaluation.contradictions))
    }

    /// Current calibrated matrix as a list of rows.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.inner.matrix().to_rows()
    }

    /// The original reference matrix as a list of rows.
    pub fn original(&self) -> Vec<Vec<f64>> {
        self.inner.original().to_rows()
    }

    /// Evaluate the current matrix: (penalty, contradictions).
    pub fn evaluate(&self, observations: Vec<PyObservation>) -> (f64, usize) {
        let obs: Vec<RustObservation> = observations.into_iter().map(|o| o.inner).collect();
        let e = evaluate(self.inner.matrix(), &obs);
        (e.penalty, e.contradictions)
    }

    /// Discard calibration and return to the original matrix.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        let (rows, cols) = self.inner.matrix().shape();
        format!("Optimizer({rows}x{cols})")
    }
}

// ── Free functions ────────────────────────────────────────────────────────────

/// Score a lineage against a matrix.
#[pyfunction]
#[pyo3(name = "score", signature = (matrix, lineage, s3=0, s2=0, noble=None))]
pub fn py_score(
    matrix: Vec<Vec<f64>>,
    lineage: Vec<Option<usize>>,
    s3: u32,
    s2: u32,
    noble: Option<f64>,
) -> PyResult<f64> {
    let m = rows_to_matrix(matrix)?;
    Ok(score::score(&m, &ids_to_lineage(&lineage)?, s3, s2, noble))
}

/// Tier symbol for a score.
#[pyfunction]
#[pyo3(name = "classify")]
pub fn py_classify(score: f64) -> &'static str {
    tier::classify(score).symbol()
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Tier calibration Python bindings.
#[pymodule]
pub fn tier_calibration(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyObservation>()?;
    m.add_class::<PyOptimizer>()?;
    m.add_function(wrap_pyfunction!(py_score, m)?)?;
    m.add_function(wrap_pyfunction!(py_classify, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("TIER_SYMBOLS", tier::Tier::ALL.map(|t| t.symbol()).to_vec())?;
    Ok(())
}
