//! # spotmatch
//!
//! Spot correspondence between spatial transcriptomics slices: pair up the
//! spots of two tissue sections by where they sit, and compare their
//! expression profiles.
//!
//! ## The Problem
//!
//! Two adjacent slices of the same tissue are measured on two spot arrays.
//! Before an iterative alignment can refine anything it needs a starting
//! guess: a coupling matrix saying how much of spot `i` in slice X corresponds
//! to spot `j` in slice Y. The spatial heuristic builds that guess from the
//! coordinates alone.
//!
//! ## Key Functions
//!
//! | Function | Use Case | Complexity |
//! |----------|----------|------------|
//! | [`match_spots_using_spatial_heuristic`] | Initial coupling between two slices | solver-bound |
//! | [`emd`] | Exact optimal transport (network simplex) | O(pivots × (m + n)) |
//! | [`min_weight_full_bipartite_matching`] | Assignment on the smaller side | O(min² × max) |
//! | [`kl_divergence`] | Pairwise KL between expression profiles | O(n × m × k) |
//! | [`norm_and_center_coordinates`] | Center + rescale a point set | O(n² × d) |
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::array;
//! use spotmatch::{kl_divergence, match_spots_using_spatial_heuristic};
//!
//! let x = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
//! let y = array![[0.0, 0.0], [1.0, 0.0]];
//!
//! // Exact optimal transport with uniform marginals.
//! let pi = match_spots_using_spatial_heuristic(&x, &y, true).unwrap();
//! assert_eq!(pi.shape(), &[3, 2]);
//! assert!((pi.sum() - 1.0).abs() < 1e-9);
//!
//! // Expression profiles (counts) compared pairwise.
//! let counts = array![[1.0, 2.0, 3.0], [2.0, 2.0, 2.0]];
//! let d = kl_divergence(&counts, &counts).unwrap();
//! assert!(d[[0, 0]].abs() < 1e-12);
//! ```
//!
//! ## What Can Go Wrong
//!
//! 1. **Coincident spots**: normalization divides by the smallest pairwise
//!    distance, so duplicated coordinates are rejected ([`Error::ZeroScale`]).
//! 2. **Zeros in expression profiles**: `log 0 = -∞`. [`kl_divergence`] does not
//!    smooth; filter or pseudo-count your inputs first.
//! 3. **Pivot bound**: very large slices can exceed [`EmdConfig::max_iter`];
//!    raise it rather than accept a partial plan.
//!
//! ## References
//!
//! - Zeira et al. (2022). "Alignment and integration of spatial transcriptomics data"
//! - Ahuja, Magnanti & Orlin (1993). "Network Flows", ch. 11 (network simplex)
//! - Jonker & Volgenant (1987). "A shortest augmenting path algorithm for dense
//!   and sparse linear assignment problems"

use std::collections::HashSet;
use std::hash::Hash;

use thiserror::Error;

pub mod assignment;
pub mod coords;
pub mod data;
pub mod divergence;
pub mod emd;
pub mod spatial;

pub use assignment::{matching_cost, min_weight_full_bipartite_matching};
pub use coords::{euclidean_cost_matrix, min_pairwise_distance, norm_and_center_coordinates};
pub use data::{extract_data_matrix, to_dense_array, AnnotatedData, CsrMatrix, DataMatrix};
pub use divergence::{kl_divergence, kl_divergence_backend, row_normalize};
pub use emd::{emd, emd2, emd_with_config, EmdConfig, EmdSolution};
pub use spatial::{
    match_spots_using_spatial_heuristic, match_spots_with_config, matching_to_coupling,
    MatchMethod, SpatialMatchConfig,
};

/// Error variants for spot matching and divergence computations.
#[derive(Debug, Error)]
pub enum Error {
    /// Two matrices disagree on their column (feature / coordinate) dimension.
    #[error("dimension mismatch: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    /// Cost matrix shape does not match the marginals.
    #[error("cost matrix shape mismatch: expected ({0}, {1}), got ({2}, {3})")]
    CostShapeMismatch(usize, usize, usize, usize),

    /// Two buffers that must have equal length do not.
    #[error("length mismatch: {0} vs {1}")]
    LengthMismatch(usize, usize),

    /// Source and target marginals carry different total mass.
    #[error("marginals carry different mass: {0} vs {1}")]
    MassMismatch(f64, f64),

    /// Normalization needs at least two points.
    #[error("need at least 2 points, got {0}")]
    TooFewPoints(usize),

    /// All points coincide, so the normalization scale is zero.
    #[error("minimum pairwise distance is zero")]
    ZeroScale,

    /// An input that must be finite contains NaN or infinity.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// The network simplex hit its pivot limit.
    #[error("network simplex did not converge in {0} iterations")]
    EmdNotConverged(usize),

    /// No matching saturates the smaller side using finite edges only.
    #[error("cost matrix admits no full matching")]
    MatchingInfeasible,

    /// Requested alternative representation does not exist.
    #[error("no representation named {0:?}")]
    MissingRepresentation(String),

    /// Sparse entry outside the declared shape.
    #[error("entry ({row}, {col}) outside a {nrows}x{ncols} matrix")]
    IndexOutOfBounds {
        /// Row of the offending entry.
        row: usize,
        /// Column of the offending entry.
        col: usize,
        /// Declared row count.
        nrows: usize,
        /// Declared column count.
        ncols: usize,
    },

    /// Domain error (invalid inputs for the mathematical definition).
    #[error("{0}")]
    Domain(&'static str),
}

/// Coarse classification of [`Error`], for callers that only need to decide
/// between fixing inputs and giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inputs disagree on shape.
    ShapeMismatch,
    /// Inputs are well-shaped but mathematically unusable.
    DegenerateInput,
    /// A solver could not produce an answer.
    SolverFailure,
    /// Lookup or construction misuse.
    InvalidArgument,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DimensionMismatch(..)
            | Error::CostShapeMismatch(..)
            | Error::LengthMismatch(..) => ErrorKind::ShapeMismatch,
            Error::TooFewPoints(_)
            | Error::ZeroScale
            | Error::NonFinite(_)
            | Error::MassMismatch(..)
            | Error::Domain(_) => ErrorKind::DegenerateInput,
            Error::EmdNotConverged(_) | Error::MatchingInfeasible => ErrorKind::SolverFailure,
            Error::MissingRepresentation(_) | Error::IndexOutOfBounds { .. } => {
                ErrorKind::InvalidArgument
            }
        }
    }
}

/// Result type for spot matching operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Elements of `lst1` that also occur in `lst2`.
///
/// Order and multiplicity follow `lst1`; `lst2` only acts as a membership set.
///
/// ```rust
/// use spotmatch::intersect;
///
/// assert_eq!(intersect(&[1, 2, 2, 3], &[2, 3, 4]), vec![2, 2, 3]);
/// ```
pub fn intersect<T>(lst1: &[T], lst2: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let temp: HashSet<&T> = lst2.iter().collect();
    lst1.iter().filter(|v| temp.contains(v)).cloned().collect()
}
