//! Point-set geometry: centering, scale normalization and Euclidean costs.
//!
//! Spot coordinates from two slices live in unrelated pixel frames. Centering
//! each slice at its centroid and dividing by its smallest inter-spot distance
//! puts both on a "one spot spacing = 1" scale, after which plain Euclidean
//! distances are comparable across slices.

use crate::{Error, Result};
use ndarray::{Array2, ArrayView1, Axis, Zip};
use rayon::prelude::*;

#[inline]
fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&ai, &bi)| (ai - bi) * (ai - bi))
        .sum::<f64>()
        .sqrt()
}

/// Smallest Euclidean distance over all unordered pairs of rows of `x`.
///
/// This is `min(pdist(x))`: duplicated rows give `0.0`.
///
/// Errors with [`Error::TooFewPoints`] when `x` has fewer than two rows.
pub fn min_pairwise_distance(x: &Array2<f64>) -> Result<f64> {
    let n = x.nrows();
    if n < 2 {
        return Err(Error::TooFewPoints(n));
    }

    let min = (0..n - 1)
        .into_par_iter()
        .map(|i| {
            let xi = x.row(i);
            ((i + 1)..n)
                .map(|j| euclidean(xi, x.row(j)))
                .fold(f64::INFINITY, f64::min)
        })
        .reduce(|| f64::INFINITY, f64::min);

    Ok(min)
}

/// Center a point set at the origin and rescale it by its minimum pairwise distance.
///
/// \[
/// x'_i = \frac{x_i - \bar{x}}{\min_{k<l} \lVert x_k - x_l \rVert_2}
/// \]
///
/// The scale is measured on the original coordinates (translation does not
/// change it anyway). The result has zero column means and a minimum pairwise
/// distance of exactly one.
///
/// # Errors
///
/// - [`Error::TooFewPoints`] if `x` has fewer than two rows
/// - [`Error::NonFinite`] if any coordinate is NaN or infinite
/// - [`Error::ZeroScale`] if two points coincide
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use spotmatch::norm_and_center_coordinates;
///
/// let x = array![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]];
/// let z = norm_and_center_coordinates(&x).unwrap();
/// assert_eq!(z, array![[-0.5, -0.5], [0.5, -0.5], [-0.5, 0.5], [0.5, 0.5]]);
/// ```
pub fn norm_and_center_coordinates(x: &Array2<f64>) -> Result<Array2<f64>> {
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("coordinates"));
    }
    let scale = min_pairwise_distance(x)?;
    if scale <= 0.0 {
        return Err(Error::ZeroScale);
    }

    let Some(mean) = x.mean_axis(Axis(0)) else {
        return Err(Error::TooFewPoints(0));
    };
    Ok((x - &mean) / scale)
}

/// Dense Euclidean distance matrix between the rows of `x` and the rows of `y`.
///
/// C[i,j] = ||x_i - y_j||₂
///
/// Rows of the output are filled in parallel; each entry depends only on its
/// own pair so the result is the same as a sequential sweep.
///
/// # Arguments
///
/// * `x` - Source points (m × d)
/// * `y` - Target points (n × d)
///
/// # Returns
///
/// Cost matrix (m × n), or [`Error::DimensionMismatch`] if `d` differs.
pub fn euclidean_cost_matrix(x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>> {
    let d = x.ncols();
    if y.ncols() != d {
        return Err(Error::DimensionMismatch(d, y.ncols()));
    }

    let mut cost = Array2::zeros((x.nrows(), y.nrows()));
    Zip::from(cost.rows_mut())
        .and(x.rows())
        .par_for_each(|mut out, xi| {
            for (c, yj) in out.iter_mut().zip(y.rows()) {
                *c = euclidean(xi, yj);
            }
        });

    Ok(cost)
}
