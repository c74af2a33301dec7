//! Spatial heuristic: an initial spot coupling from coordinates alone.
//!
//! Both slices are centered and rescaled to unit spot spacing
//! ([`norm_and_center_coordinates`]), compared with Euclidean distances
//! ([`euclidean_cost_matrix`]), and then coupled either by exact optimal
//! transport with uniform marginals or by a minimum-weight matching.
//!
//! # Leftover mass in matching mode
//!
//! A matching covers only `min(n1, n2)` spots of the larger slice. Matched
//! pairs get `1 / max(n1, n2)`; each spot of the larger slice left out of the
//! matching gets `1 / (n1 · n2)` against *every* spot of the smaller slice.
//! The total is 1, but the smaller side's marginal is not uniform unless
//! `n1 == n2`. This is the established behaviour of the heuristic and is kept
//! as is.

use crate::assignment::min_weight_full_bipartite_matching;
use crate::coords::{euclidean_cost_matrix, norm_and_center_coordinates};
use crate::emd::{emd_with_config, EmdConfig};
use crate::{Error, Result};
use ndarray::{Array1, Array2};
use tracing::debug;

/// How the coupling is computed from the cost matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMethod {
    /// Exact optimal transport with uniform marginals.
    #[default]
    Transport,
    /// Minimum-weight full bipartite matching plus uniform leftover mass.
    Matching,
}

impl MatchMethod {
    /// `true` selects [`MatchMethod::Transport`], `false` [`MatchMethod::Matching`].
    pub fn from_use_ot(use_ot: bool) -> Self {
        if use_ot {
            MatchMethod::Transport
        } else {
            MatchMethod::Matching
        }
    }
}

/// Configuration for [`match_spots_with_config`].
#[derive(Debug, Clone, Default)]
pub struct SpatialMatchConfig {
    /// Coupling method.
    pub method: MatchMethod,
    /// Solver settings used in [`MatchMethod::Transport`] mode.
    pub emd: EmdConfig,
}

impl SpatialMatchConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coupling method.
    pub fn with_method(mut self, method: MatchMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the optimal transport solver settings.
    pub fn with_emd(mut self, emd: EmdConfig) -> Self {
        self.emd = emd;
        self
    }
}

/// Coupling between spots `x` (n1 × d) and `y` (n2 × d) from their coordinates.
///
/// `use_ot = true` solves exact optimal transport with uniform marginals;
/// `use_ot = false` uses a minimum-weight matching (see the module docs for
/// how unmatched spots are filled in).
///
/// # Returns
///
/// n1 × n2 coupling matrix with total mass 1.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if `x` and `y` differ in `d`
/// - [`Error::TooFewPoints`] / [`Error::ZeroScale`] / [`Error::NonFinite`]
///   from normalization
/// - [`Error::EmdNotConverged`] / [`Error::MatchingInfeasible`] from the solvers
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use spotmatch::match_spots_using_spatial_heuristic;
///
/// let x = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
/// let y = array![[0.0, 0.0], [1.0, 0.0]];
///
/// let pi = match_spots_using_spatial_heuristic(&x, &y, false).unwrap();
/// let third = 1.0 / 3.0;
/// let sixth = 1.0 / 6.0;
/// assert_eq!(pi, array![[third, 0.0], [0.0, third], [sixth, sixth]]);
/// ```
pub fn match_spots_using_spatial_heuristic(
    x: &Array2<f64>,
    y: &Array2<f64>,
    use_ot: bool,
) -> Result<Array2<f64>> {
    let config = SpatialMatchConfig::new().with_method(MatchMethod::from_use_ot(use_ot));
    match_spots_with_config(x, y, &config)
}

/// [`match_spots_using_spatial_heuristic`] with explicit solver settings.
pub fn match_spots_with_config(
    x: &Array2<f64>,
    y: &Array2<f64>,
    config: &SpatialMatchConfig,
) -> Result<Array2<f64>> {
    if x.ncols() != y.ncols() {
        return Err(Error::DimensionMismatch(x.ncols(), y.ncols()));
    }
    let n1 = x.nrows();
    let n2 = y.nrows();

    let x = norm_and_center_coordinates(x)?;
    let y = norm_and_center_coordinates(y)?;
    let dist = euclidean_cost_matrix(&x, &y)?;
    debug!(n1, n2, method = ?config.method, "matching spots by spatial heuristic");

    match config.method {
        MatchMethod::Transport => {
            let a = Array1::from_elem(n1, 1.0 / n1 as f64);
            let b = Array1::from_elem(n2, 1.0 / n2 as f64);
            Ok(emd_with_config(&a, &b, &dist, &config.emd)?.plan)
        }
        MatchMethod::Matching => {
            let pairs = min_weight_full_bipartite_matching(&dist)?;
            matching_to_coupling(&pairs, n1, n2)
        }
    }
}

/// Turn a full matching into an n1 × n2 coupling.
///
/// Matched pairs get `1 / max(n1, n2)`. If `n1 < n2`, every column missing
/// from the matching is set to `1 / (n1 · n2)` in all rows; if `n2 < n1`,
/// every row missing from the matching is set to `1 / (n1 · n2)` in all columns.
///
/// # Errors
///
/// [`Error::LengthMismatch`] if `pairs` is not of size `min(n1, n2)`,
/// [`Error::Domain`] if it reuses a row or column or leaves the shape.
pub fn matching_to_coupling(pairs: &[(usize, usize)], n1: usize, n2: usize) -> Result<Array2<f64>> {
    if pairs.len() != n1.min(n2) {
        return Err(Error::LengthMismatch(pairs.len(), n1.min(n2)));
    }

    let mut row_used = vec![false; n1];
    let mut col_used = vec![false; n2];
    let mut pi = Array2::zeros((n1, n2));
    let matched = 1.0 / n1.max(n2) as f64;
    for &(i, j) in pairs {
        if i >= n1 || j >= n2 {
            return Err(Error::Domain("matched pair outside the coupling shape"));
        }
        if row_used[i] || col_used[j] {
            return Err(Error::Domain("matching reuses a row or column"));
        }
        row_used[i] = true;
        col_used[j] = true;
        pi[[i, j]] = matched;
    }

    let leftover = 1.0 / (n1 * n2) as f64;
    if n1 < n2 {
        for (j, _) in col_used.iter().enumerate().filter(|(_, used)| !**used) {
            pi.column_mut(j).fill(leftover);
        }
    } else if n2 < n1 {
        for (i, _) in row_used.iter().enumerate().filter(|(_, used)| !**used) {
            pi.row_mut(i).fill(leftover);
        }
    }

    Ok(pi)
}
