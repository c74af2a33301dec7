//! Pairwise KL divergence between expression profiles.
//!
//! Each row of a count matrix is turned into a distribution over features,
//! then every row of `X` is compared with every row of `Y`:
//!
//! \[
//! D_{ij} = \mathrm{KL}(x_i \,\|\, y_j)
//!        = \sum_f x_{if} \log x_{if} - \sum_f x_{if} \log y_{jf}
//! \]
//!
//! The first term depends on `i` only, so it is computed once per row and the
//! second term is a single matrix product `X · (log Y)ᵀ`.
//!
//! # Zeros
//!
//! No smoothing is applied. A zero in `Y` gives `+∞`; a zero in `X` gives
//! `0 · log 0 = NaN`. Callers are expected to pass strictly positive profiles
//! (e.g. after adding a pseudo-count).

use crate::{Error, Result};
use ndarray::{Array1, Array2, Axis, Zip};

/// Divide every row by its sum.
pub fn row_normalize(x: &Array2<f64>) -> Array2<f64> {
    let sums = x.sum_axis(Axis(1)).insert_axis(Axis(1));
    x / &sums
}

fn check_features(x: &Array2<f64>, y: &Array2<f64>) -> Result<()> {
    if x.ncols() != y.ncols() {
        return Err(Error::DimensionMismatch(x.ncols(), y.ncols()));
    }
    Ok(())
}

/// Row-wise negative entropy `Σ_f p_f log p_f`.
fn neg_entropy(x: &Array2<f64>) -> Array1<f64> {
    (x * &x.mapv(f64::ln)).sum_axis(Axis(1))
}

/// Pairwise KL divergence (over all pairs of samples) of two count matrices.
///
/// # Arguments
///
/// * `x` - n × k, one profile per row
/// * `y` - m × k, one profile per row
///
/// # Returns
///
/// n × m matrix with `D[i, j] = KL(x_i / |x_i| ‖ y_j / |y_j|)`, or
/// [`Error::DimensionMismatch`] if the feature counts differ.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use spotmatch::kl_divergence;
///
/// let x = array![[1.0, 1.0], [3.0, 1.0]];
/// let d = kl_divergence(&x, &x).unwrap();
/// assert!(d[[0, 0]].abs() < 1e-12 && d[[1, 1]].abs() < 1e-12);
/// assert!(d[[0, 1]] > 0.0 && d[[1, 0]] > 0.0);
/// ```
pub fn kl_divergence(x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>> {
    check_features(x, y)?;

    let x = row_normalize(x);
    let y = row_normalize(y);
    let x_log_x = neg_entropy(&x);
    let log_y = y.mapv(f64::ln);

    let cross = x.dot(&log_y.t());
    Ok(&x_log_x.insert_axis(Axis(1)) - &cross)
}

/// Same as [`kl_divergence`], evaluated row-parallel on the rayon pool.
///
/// Every output row `i` is `x_log_x[i] - log(Y) · x_i`, computed independently,
/// so results agree with [`kl_divergence`] up to floating-point summation order.
pub fn kl_divergence_backend(x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>> {
    check_features(x, y)?;

    let x = row_normalize(x);
    let y = row_normalize(y);
    let x_log_x = neg_entropy(&x);
    let log_y = y.mapv(f64::ln);

    let mut d = Array2::zeros((x.nrows(), y.nrows()));
    Zip::from(d.rows_mut())
        .and(x.rows())
        .and(&x_log_x)
        .par_for_each(|mut out, xi, &h| {
            out.assign(&log_y.dot(&xi));
            out.mapv_inplace(|c| h - c);
        });
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    /// Direct double sum, for reference.
    fn naive_kl(x: &Array2<f64>, y: &Array2<f64>) -> Array2<f64> {
        let x = row_normalize(x);
        let y = row_normalize(y);
        Array2::from_shape_fn((x.nrows(), y.nrows()), |(i, j)| {
            x.row(i)
                .iter()
                .zip(y.row(j).iter())
                .map(|(&p, &q)| p * (p.ln() - q.ln()))
                .sum()
        })
    }

    #[test]
    fn row_normalize_sums_to_one() {
        let x = array![[1.0, 3.0], [2.0, 2.0], [0.5, 0.0]];
        let p = row_normalize(&x);
        assert_eq!(p, array![[0.25, 0.75], [0.5, 0.5], [1.0, 0.0]]);
    }

    #[test]
    fn kl_of_known_pair() {
        let x = array![[1.0, 1.0]];
        let y = array![[1.0, 3.0]];
        let d = kl_divergence(&x, &y).unwrap();
        let expected = 0.5 * (0.5f64 / 0.25).ln() + 0.5 * (0.5f64 / 0.75).ln();
        assert!((d[[0, 0]] - expected).abs() < 1e-12);
    }

    #[test]
    fn kl_is_scale_invariant_per_row() {
        let x = array![[1.0, 2.0, 3.0]];
        let y = array![[3.0, 2.0, 1.0]];
        let d1 = kl_divergence(&x, &y).unwrap();
        let d2 = kl_divergence(&(&x * 10.0), &(&y * 0.1)).unwrap();
        assert!((d1[[0, 0]] - d2[[0, 0]]).abs() < 1e-12);
    }

    #[test]
    fn kl_rectangular_shape_and_asymmetry() {
        let x = array![[1.0, 2.0, 3.0], [4.0, 1.0, 1.0]];
        let y = array![[1.0, 1.0, 1.0], [2.0, 5.0, 1.0], [1.0, 1.0, 8.0]];
        let d = kl_divergence(&x, &y).unwrap();
        assert_eq!(d.shape(), &[2, 3]);
        let d_rev = kl_divergence(&y, &x).unwrap();
        assert!((d[[0, 1]] - d_rev[[1, 0]]).abs() > 1e-6);
        let reference = naive_kl(&x, &y);
        for (a, b) in d.iter().zip(reference.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn kl_rejects_feature_mismatch() {
        let x = array![[1.0, 2.0]];
        let y = array![[1.0, 2.0, 3.0]];
        assert!(matches!(kl_divergence(&x, &y), Err(Error::DimensionMismatch(2, 3))));
        assert!(matches!(
            kl_divergence_backend(&x, &y),
            Err(Error::DimensionMismatch(2, 3))
        ));
    }

    #[test]
    fn zero_in_target_gives_infinite_divergence() {
        let x = array![[1.0, 1.0]];
        let y = array![[1.0, 0.0]];
        let d = kl_divergence(&x, &y).unwrap();
        assert_eq!(d[[0, 0]], f64::INFINITY);
    }

    proptest! {
        #[test]
        fn kl_self_diagonal_is_zero_and_rest_nonnegative(
            (n, k, vals) in (1usize..8, 1usize..10).prop_flat_map(|(n, k)| {
                (Just(n), Just(k), prop::collection::vec(0.01f64..100.0, n * k))
            }),
        ) {
            let x = Array2::from_shape_vec((n, k), vals).unwrap();
            let d = kl_divergence(&x, &x).unwrap();
            for i in 0..n {
                prop_assert!(d[[i, i]].abs() < 1e-10);
                for j in 0..n {
                    prop_assert!(d[[i, j]] >= -1e-10);
                }
            }
        }

        #[test]
        fn backend_matches_sequential(
            (n, m, k, xs, ys) in (1usize..8, 1usize..8, 1usize..10).prop_flat_map(|(n, m, k)| {
                (
                    Just(n),
                    Just(m),
                    Just(k),
                    prop::collection::vec(0.01f64..100.0, n * k),
                    prop::collection::vec(0.01f64..100.0, m * k),
                )
            }),
        ) {
            let x = Array2::from_shape_vec((n, k), xs).unwrap();
            let y = Array2::from_shape_vec((m, k), ys).unwrap();
            let d = kl_divergence(&x, &y).unwrap();
            let db = kl_divergence_backend(&x, &y).unwrap();
            let reference = naive_kl(&x, &y);
            prop_assert_eq!(d.shape(), db.shape());
            for ((a, b), r) in d.iter().zip(db.iter()).zip(reference.iter()) {
                prop_assert!((a - b).abs() <= 1e-6 * a.abs().max(1e-6));
                prop_assert!((a - r).abs() <= 1e-9 * r.abs().max(1.0));
            }
        }
    }
}
