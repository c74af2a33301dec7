//! Minimum-weight full bipartite matching (the rectangular assignment problem).
//!
//! Every element of the smaller side is matched to a distinct element of the
//! larger side, minimizing the summed cost.
//!
//! # Algorithm
//!
//! Shortest augmenting paths with dual potentials (Kuhn-Munkres in the
//! Jonker-Volgenant form). Rows are inserted one at a time; for each, a
//! Dijkstra-like sweep over the columns on reduced costs
//! `c(i, j) - u(i) - v(j)` finds the cheapest path to a free column, then the
//! matching is flipped along it. With `rows ≤ cols` no padding is needed: the
//! sweep simply stops at the first free column. Taller matrices are solved
//! transposed.
//!
//! Non-finite entries are treated as missing edges. If some row cannot reach
//! any free column through finite edges the matching is infeasible.
//!
//! Complexity O(rows² × cols).

use crate::{Error, Result};
use ndarray::{Array2, ArrayView2};
use tracing::debug;

/// Minimum-weight matching that saturates the smaller dimension of `cost`.
///
/// Returns `min(m, n)` pairs `(row, col)`, sorted by row, with every row and
/// every column used at most once.
///
/// # Errors
///
/// [`Error::MatchingInfeasible`] if no full matching exists using only the
/// finite entries of `cost`.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use spotmatch::min_weight_full_bipartite_matching;
///
/// let cost = array![[4.0, 1.0, 3.5], [2.0, 0.0, 5.0]];
/// let pairs = min_weight_full_bipartite_matching(&cost).unwrap();
/// assert_eq!(pairs, vec![(0, 1), (1, 0)]);
/// ```
pub fn min_weight_full_bipartite_matching(cost: &Array2<f64>) -> Result<Vec<(usize, usize)>> {
    let (m, n) = cost.dim();
    if m == 0 || n == 0 {
        return Ok(Vec::new());
    }

    let mut pairs = if m <= n {
        shortest_augmenting_paths(cost.view())?
    } else {
        shortest_augmenting_paths(cost.t())?
            .into_iter()
            .map(|(j, i)| (i, j))
            .collect()
    };
    pairs.sort_unstable_by_key(|&(row, _)| row);

    debug!(
        rows = m,
        cols = n,
        matched = pairs.len(),
        cost = matching_cost(cost, &pairs),
        "bipartite matching solved"
    );
    Ok(pairs)
}

/// Summed cost of a matching.
pub fn matching_cost(cost: &Array2<f64>, pairs: &[(usize, usize)]) -> f64 {
    pairs.iter().map(|&(i, j)| cost[[i, j]]).sum()
}

/// Solve with `rows ≤ cols`.
fn shortest_augmenting_paths(cost: ArrayView2<f64>) -> Result<Vec<(usize, usize)>> {
    let (n_rows, n_cols) = cost.dim();
    debug_assert!(n_rows <= n_cols);
    let inf = f64::INFINITY;

    let edge = |i: usize, j: usize| {
        let c = cost[[i, j]];
        if c.is_finite() {
            c
        } else {
            inf
        }
    };

    // u[i]: potential for row i (1-indexed; index 0 unused).
    // v[j]: potential for column j (1-indexed; index 0 = dummy source).
    let mut u = vec![0.0_f64; n_rows + 1];
    let mut v = vec![0.0_f64; n_cols + 1];
    // p[j]: 1-indexed row assigned to column j (0 = free).
    let mut p = vec![0_usize; n_cols + 1];
    // way[j]: previous column on the current augmenting path.
    let mut way = vec![0_usize; n_cols + 1];
    let mut min_val = vec![inf; n_cols + 1];
    let mut used = vec![false; n_cols + 1];

    for i in 1..=n_rows {
        p[0] = i;
        let mut j0 = 0_usize;
        min_val.fill(inf);
        used.fill(false);

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0_usize;

            for j in 1..=n_cols {
                if !used[j] {
                    let val = edge(i0 - 1, j - 1) - u[i0] - v[j];
                    if val < min_val[j] {
                        min_val[j] = val;
                        way[j] = j0;
                    }
                    if min_val[j] < delta {
                        delta = min_val[j];
                        j1 = j;
                    }
                }
            }

            // Every unvisited column is unreachable: row i cannot be matched
            // without breaking an earlier row.
            if !delta.is_finite() {
                return Err(Error::MatchingInfeasible);
            }

            for j in 0..=n_cols {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_val[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Flip the matching along the path.
        loop {
            let prev = way[j0];
            p[j0] = p[prev];
            j0 = prev;
            if j0 == 0 {
                break;
            }
        }
    }

    Ok((1..=n_cols)
        .filter(|&j| p[j] != 0)
        .map(|j| (p[j] - 1, j - 1))
        .collect())
}
