//! Exact optimal transport (earth mover's distance) by network simplex.
//!
//! Solves the balanced transportation linear program
//!
//! ```text
//! min_P  Σᵢⱼ Pᵢⱼ Cᵢⱼ
//! s.t.   P 1 = a,  Pᵀ 1 = b,  P ≥ 0
//! ```
//!
//! # Algorithm
//!
//! The transportation problem is a min-cost flow on the complete bipartite
//! graph rows → columns. A basic solution is a spanning tree of `m + n - 1`
//! cells; the simplex walks from tree to tree:
//!
//! 1. **Initial tree**: north-west corner rule.
//! 2. **Potentials**: `uᵢ + vⱼ = Cᵢⱼ` on every tree cell, root `u₀ = 0`.
//! 3. **Pricing**: block search for a cell with reduced cost
//!    `Cᵢⱼ - uᵢ - vⱼ < 0` (scan `√(mn)` cells, take the best of the first
//!    block that has a candidate).
//! 4. **Pivot**: push flow around the cycle the entering cell closes in the
//!    tree; the leaving cell is the *last* blocking cell met when walking the
//!    cycle from its apex in the direction of the entering cell.
//!
//! Step 4 is Cunningham's rule. Together with a strongly feasible start it
//! rules out cycling on degenerate problems, and uniform marginals are as
//! degenerate as transport problems get.
//!
//! # References
//!
//! - Ahuja, Magnanti, Orlin (1993). "Network Flows", §11.5–11.6
//! - Cunningham (1976). "A network simplex method"
//! - Bonneel et al. (2011). "Displacement interpolation using Lagrangian mass transport"

use crate::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, warn};

/// Relative tolerance on total mass agreement between the two marginals.
const MASS_TOLERANCE: f64 = 1e-7;

/// Pricing tolerance relative to the largest cost entry.
const PRICING_TOLERANCE: f64 = 1e-10;

/// Configuration for the network simplex solver.
#[derive(Debug, Clone)]
pub struct EmdConfig {
    /// Maximum number of simplex pivots before giving up.
    pub max_iter: usize,
}

impl Default for EmdConfig {
    fn default() -> Self {
        Self { max_iter: 100_000 }
    }
}

impl EmdConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pivot limit.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

/// Optimal coupling together with its certificate.
#[derive(Debug, Clone)]
pub struct EmdSolution {
    /// Transport plan P (m × n).
    pub plan: Array2<f64>,
    /// Transport cost <C, P>.
    pub cost: f64,
    /// Row potentials; `Cᵢⱼ - αᵢ - βⱼ ≥ 0` everywhere, with equality on the support of P.
    pub alpha: Array1<f64>,
    /// Column potentials.
    pub beta: Array1<f64>,
    /// Number of simplex pivots performed.
    pub iterations: usize,
}

/// Spanning-tree basis of the transportation problem.
///
/// Nodes `0..m` are rows, `m..m+n` are columns. Every basic cell is an edge
/// between its row node and its column node, stored in a slot.
struct Basis {
    m: usize,
    n: usize,
    cells: Vec<(usize, usize)>,
    flow: Vec<f64>,
    adj: Vec<Vec<usize>>,
    u: Vec<f64>,
    v: Vec<f64>,
    /// Slot connecting a node to its parent (root: `None`).
    parent: Vec<Option<usize>>,
    depth: Vec<usize>,
    stack: Vec<usize>,
}

impl Basis {
    /// North-west corner rule.
    ///
    /// When a row and a column run out together the row index advances, so
    /// every zero-flow cell `(i + 1, j)` hangs off column `j` and points
    /// toward the root (row 0): the tree is strongly feasible.
    fn north_west_corner(a: &[f64], b: &[f64]) -> Self {
        let m = a.len();
        let n = b.len();
        let mut supply = a.to_vec();
        let mut demand = b.to_vec();

        let mut cells = Vec::with_capacity(m + n - 1);
        let mut flow = Vec::with_capacity(m + n - 1);
        let mut adj = vec![Vec::new(); m + n];

        let (mut i, mut j) = (0, 0);
        loop {
            let x = supply[i].min(demand[j]);
            supply[i] -= x;
            demand[j] -= x;

            adj[i].push(cells.len());
            adj[m + j].push(cells.len());
            cells.push((i, j));
            flow.push(x);

            if i == m - 1 && j == n - 1 {
                break;
            }
            if j == n - 1 || (i < m - 1 && supply[i] <= demand[j]) {
                i += 1;
            } else {
                j += 1;
            }
        }

        Self {
            m,
            n,
            cells,
            flow,
            adj,
            u: vec![0.0; m],
            v: vec![0.0; n],
            parent: vec![None; m + n],
            depth: vec![0; m + n],
            stack: Vec::with_capacity(m + n),
        }
    }

    #[inline]
    fn other_end(&self, slot: usize, node: usize) -> usize {
        let (i, j) = self.cells[slot];
        if node < self.m {
            self.m + j
        } else {
            i
        }
    }

    /// Re-root the tree at row 0: parents, depths and potentials.
    fn reroot(&mut self, cost: &Array2<f64>) {
        let m = self.m;
        self.parent.fill(None);
        self.depth[0] = 0;
        self.u[0] = 0.0;

        self.stack.clear();
        self.stack.push(0);
        while let Some(node) = self.stack.pop() {
            for k in 0..self.adj[node].len() {
                let slot = self.adj[node][k];
                if self.parent[node] == Some(slot) {
                    continue;
                }
                let child = self.other_end(slot, node);
                let (i, j) = self.cells[slot];
                if child >= m {
                    self.v[j] = cost[[i, j]] - self.u[i];
                } else {
                    self.u[i] = cost[[i, j]] - self.v[j];
                }
                self.parent[child] = Some(slot);
                self.depth[child] = self.depth[node] + 1;
                self.stack.push(child);
            }
        }
    }

    /// Block-search pricing. Returns the entering cell, or `None` at optimality.
    fn find_entering(
        &self,
        cost: &Array2<f64>,
        cursor: &mut usize,
        block: usize,
        tol: f64,
    ) -> Option<(usize, usize)> {
        let total = self.m * self.n;
        let mut best = -tol;
        let mut best_cell = None;
        let mut count = 0;

        for step in 0..total {
            let idx = (*cursor + step) % total;
            let (i, j) = (idx / self.n, idx % self.n);
            let reduced = cost[[i, j]] - self.u[i] - self.v[j];
            if reduced < best {
                best = reduced;
                best_cell = Some((i, j));
            }
            count += 1;
            if count == block {
                if best_cell.is_some() {
                    *cursor = (idx + 1) % total;
                    return best_cell;
                }
                count = 0;
            }
        }

        best_cell
    }

    /// Push flow around the cycle closed by `(p, q)` and swap it into the tree.
    fn pivot(&mut self, p: usize, q: usize) -> Result<()> {
        let m = self.m;

        // Climb both endpoints to their common ancestor (the apex).
        // Each entry is (slot, child node of that slot).
        let mut left: Vec<(usize, usize)> = Vec::new();
        let mut right: Vec<(usize, usize)> = Vec::new();
        let (mut x, mut y) = (p, m + q);
        while x != y {
            if self.depth[x] >= self.depth[y] {
                let Some(slot) = self.parent[x] else {
                    return Err(Error::Domain("transport basis is not a spanning tree"));
                };
                left.push((slot, x));
                x = self.other_end(slot, x);
            } else {
                let Some(slot) = self.parent[y] else {
                    return Err(Error::Domain("transport basis is not a spanning tree"));
                };
                right.push((slot, y));
                y = self.other_end(slot, y);
            }
        }

        // Orientation: apex -> p (left, reversed), p -> q (entering), q -> apex (right).
        // Cells are directed row -> column; walking one column -> row lowers its flow.
        // On the left side we walk parent -> child, on the right child -> parent.
        let mut theta = f64::INFINITY;
        let mut leaving = None;
        for &(slot, child) in left.iter().rev() {
            if child < m && self.flow[slot] <= theta {
                theta = self.flow[slot];
                leaving = Some(slot);
            }
        }
        for &(slot, child) in &right {
            if child >= m && self.flow[slot] <= theta {
                theta = self.flow[slot];
                leaving = Some(slot);
            }
        }
        let Some(leaving) = leaving else {
            return Err(Error::Domain("pivot cycle has no blocking cell"));
        };
        let theta = theta.max(0.0);

        if theta > 0.0 {
            for &(slot, child) in &left {
                if child < m {
                    self.flow[slot] = (self.flow[slot] - theta).max(0.0);
                } else {
                    self.flow[slot] += theta;
                }
            }
            for &(slot, child) in &right {
                if child >= m {
                    self.flow[slot] = (self.flow[slot] - theta).max(0.0);
                } else {
                    self.flow[slot] += theta;
                }
            }
        }

        let (li, lj) = self.cells[leaving];
        self.adj[li].retain(|&s| s != leaving);
        self.adj[m + lj].retain(|&s| s != leaving);

        self.cells[leaving] = (p, q);
        self.flow[leaving] = theta;
        self.adj[p].push(leaving);
        self.adj[m + q].push(leaving);

        Ok(())
    }
}

/// Validate marginals and cost, returning the total masses.
fn check_problem(a: &Array1<f64>, b: &Array1<f64>, cost: &Array2<f64>) -> Result<(f64, f64)> {
    let m = a.len();
    let n = b.len();
    if m == 0 || n == 0 {
        return Err(Error::Domain("transport requires non-empty marginals"));
    }
    if cost.nrows() != m || cost.ncols() != n {
        return Err(Error::CostShapeMismatch(m, n, cost.nrows(), cost.ncols()));
    }
    if a.iter().chain(b.iter()).any(|x| !x.is_finite()) {
        return Err(Error::NonFinite("marginals"));
    }
    if a.iter().chain(b.iter()).any(|&x| x < 0.0) {
        return Err(Error::Domain("transport requires nonnegative masses"));
    }
    if cost.iter().any(|c| !c.is_finite()) {
        return Err(Error::NonFinite("cost matrix"));
    }

    let a_sum = a.sum();
    let b_sum = b.sum();
    if a_sum <= 0.0 || b_sum <= 0.0 {
        return Err(Error::Domain("transport requires positive total mass"));
    }
    if (a_sum - b_sum).abs() > MASS_TOLERANCE * a_sum.max(b_sum) {
        return Err(Error::MassMismatch(a_sum, b_sum));
    }
    Ok((a_sum, b_sum))
}

/// Exact optimal transport plan between `a` and `b` under `cost`.
///
/// Uses [`EmdConfig::default`]; see [`emd_with_config`] for the potentials,
/// the transport cost and the pivot count.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use spotmatch::emd;
///
/// let a = array![0.5, 0.5];
/// let b = array![0.5, 0.5];
/// let cost = array![[0.0, 1.0], [1.0, 0.0]];
///
/// let plan = emd(&a, &b, &cost).unwrap();
/// assert_eq!(plan, array![[0.5, 0.0], [0.0, 0.5]]);
/// ```
pub fn emd(a: &Array1<f64>, b: &Array1<f64>, cost: &Array2<f64>) -> Result<Array2<f64>> {
    Ok(emd_with_config(a, b, cost, &EmdConfig::default())?.plan)
}

/// Optimal transport cost `min_P <C, P>` (the earth mover's distance).
pub fn emd2(a: &Array1<f64>, b: &Array1<f64>, cost: &Array2<f64>) -> Result<f64> {
    Ok(emd_with_config(a, b, cost, &EmdConfig::default())?.cost)
}

/// Exact optimal transport with an explicit configuration.
///
/// # Arguments
///
/// * `a` - Source masses (length m), nonnegative
/// * `b` - Target masses (length n), nonnegative, same total as `a`
/// * `cost` - Cost matrix C (m × n), finite
/// * `config` - Pivot limit
///
/// # Errors
///
/// - [`Error::CostShapeMismatch`] if `cost` is not m × n
/// - [`Error::MassMismatch`] if the totals differ by more than 1e-7 relative
/// - [`Error::NonFinite`] / [`Error::Domain`] for invalid entries
/// - [`Error::EmdNotConverged`] if the pivot limit is reached
///
/// Zero-mass rows and columns are taken out before solving; their plan
/// entries are zero and their potentials are set to the tightest feasible value.
pub fn emd_with_config(
    a: &Array1<f64>,
    b: &Array1<f64>,
    cost: &Array2<f64>,
    config: &EmdConfig,
) -> Result<EmdSolution> {
    let (a_sum, b_sum) = check_problem(a, b, cost)?;
    let m = a.len();
    let n = b.len();

    let rows: Vec<usize> = (0..m).filter(|&i| a[i] > 0.0).collect();
    let cols: Vec<usize> = (0..n).filter(|&j| b[j] > 0.0).collect();
    let supply: Vec<f64> = rows.iter().map(|&i| a[i]).collect();
    // Absorb the (tolerated) mass discrepancy into the target side.
    let demand: Vec<f64> = cols.iter().map(|&j| b[j] * (a_sum / b_sum)).collect();
    let sub_cost = cost.select(Axis(0), &rows).select(Axis(1), &cols);

    let max_cost = sub_cost.iter().fold(0.0f64, |acc, &c| acc.max(c.abs()));
    let tol = PRICING_TOLERANCE * max_cost;
    let cells = rows.len() * cols.len();
    let block = ((cells as f64).sqrt().ceil() as usize).max(10).min(cells);

    let mut basis = Basis::north_west_corner(&supply, &demand);
    let mut cursor = 0;

    for iterations in 0..=config.max_iter {
        basis.reroot(&sub_cost);
        let Some((p, q)) = basis.find_entering(&sub_cost, &mut cursor, block, tol) else {
            let solution = assemble(&basis, &rows, &cols, cost, iterations);
            debug!(
                rows = m,
                cols = n,
                iterations,
                cost = solution.cost,
                "network simplex converged"
            );
            return Ok(solution);
        };
        if iterations == config.max_iter {
            break;
        }
        basis.pivot(p, q)?;
    }

    warn!(
        rows = m,
        cols = n,
        max_iter = config.max_iter,
        "network simplex hit its pivot limit"
    );
    Err(Error::EmdNotConverged(config.max_iter))
}

/// Scatter the reduced basis back to the full problem.
fn assemble(
    basis: &Basis,
    rows: &[usize],
    cols: &[usize],
    cost: &Array2<f64>,
    iterations: usize,
) -> EmdSolution {
    let m = cost.nrows();
    let n = cost.ncols();

    let mut plan = Array2::zeros((m, n));
    for (&(i, j), &f) in basis.cells.iter().zip(basis.flow.iter()) {
        plan[[rows[i], cols[j]]] = f;
    }
    let total: f64 = cost.iter().zip(plan.iter()).map(|(&c, &p)| c * p).sum();

    let mut alpha = Array1::from_elem(m, f64::NAN);
    let mut beta = Array1::from_elem(n, f64::NAN);
    for (k, &i) in rows.iter().enumerate() {
        alpha[i] = basis.u[k];
    }
    for (k, &j) in cols.iter().enumerate() {
        beta[j] = basis.v[k];
    }
    // Zero-mass rows and columns: largest potential keeping reduced costs nonnegative.
    for i in 0..m {
        if alpha[i].is_nan() {
            alpha[i] = cols
                .iter()
                .map(|&j| cost[[i, j]] - beta[j])
                .fold(f64::INFINITY, f64::min);
        }
    }
    for j in 0..n {
        if beta[j].is_nan() {
            beta[j] = (0..m)
                .map(|i| cost[[i, j]] - alpha[i])
                .fold(f64::INFINITY, f64::min);
        }
    }

    EmdSolution {
        plan,
        cost: total,
        alpha,
        beta,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    fn assert_marginals(plan: &Array2<f64>, a: &Array1<f64>, b: &Array1<f64>, tol: f64) {
        for (i, r) in plan.sum_axis(Axis(1)).iter().enumerate() {
            assert!((r - a[i]).abs() <= tol, "row {i}: {r} vs {}", a[i]);
        }
        for (j, c) in plan.sum_axis(Axis(0)).iter().enumerate() {
            assert!((c - b[j]).abs() <= tol, "col {j}: {c} vs {}", b[j]);
        }
        assert!(plan.iter().all(|&p| p >= 0.0));
    }

    fn permutations(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![Vec::new()];
        }
        let mut out = Vec::new();
        for perm in permutations(n - 1) {
            for pos in 0..=perm.len() {
                let mut p = perm.clone();
                p.insert(pos, n - 1);
                out.push(p);
            }
        }
        out
    }

    #[test]
    fn emd_identity_is_free() {
        let a = array![0.25, 0.25, 0.5];
        let cost = array![[0.0, 1.0, 2.0], [1.0, 0.0, 1.0], [2.0, 1.0, 0.0]];
        let sol = emd_with_config(&a, &a, &cost, &EmdConfig::default()).unwrap();
        assert!(sol.cost.abs() < 1e-12);
        assert_marginals(&sol.plan, &a, &a, 1e-12);
        for i in 0..3 {
            assert!((sol.plan[[i, i]] - a[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn emd_swaps_when_anti_diagonal_is_cheaper() {
        let a = array![0.5, 0.5];
        let cost = array![[1.0, 0.0], [0.0, 1.0]];
        let sol = emd_with_config(&a, &a, &cost, &EmdConfig::default()).unwrap();
        assert_eq!(sol.plan, array![[0.0, 0.5], [0.5, 0.0]]);
        assert!(sol.cost.abs() < 1e-12);
        assert!(sol.iterations >= 1);
    }

    #[test]
    fn emd_rectangular_line() {
        // Three sources on a line feeding two sinks.
        let a = array![1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0];
        let b = array![0.5, 0.5];
        let cost = array![[0.0, 2.0], [1.0, 1.0], [2.0, 0.0]];
        let sol = emd_with_config(&a, &b, &cost, &EmdConfig::default()).unwrap();
        assert_marginals(&sol.plan, &a, &b, 1e-12);
        // Middle source splits evenly; total cost = 2 * (1/6) * 1.
        assert!((sol.cost - 1.0 / 3.0).abs() < 1e-12, "cost={}", sol.cost);
    }

    #[test]
    fn emd_duals_certify_optimality() {
        let a = array![0.2, 0.3, 0.5];
        let b = array![0.4, 0.4, 0.2];
        let cost = array![[3.0, 1.0, 4.0], [1.0, 5.0, 9.0], [2.0, 6.0, 5.0]];
        let sol = emd_with_config(&a, &b, &cost, &EmdConfig::default()).unwrap();
        assert_marginals(&sol.plan, &a, &b, 1e-12);

        let dual = a.dot(&sol.alpha) + b.dot(&sol.beta);
        assert!((dual - sol.cost).abs() < 1e-9, "dual={} primal={}", dual, sol.cost);
        for i in 0..3 {
            for j in 0..3 {
                let r = cost[[i, j]] - sol.alpha[i] - sol.beta[j];
                assert!(r >= -1e-9, "negative reduced cost at ({i},{j}): {r}");
                if sol.plan[[i, j]] > 1e-12 {
                    assert!(r.abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn emd_handles_zero_mass_bins() {
        let a = array![0.0, 0.6, 0.4];
        let b = array![0.5, 0.0, 0.5];
        let cost = array![[0.0, 1.0, 2.0], [1.0, 0.0, 1.0], [2.0, 1.0, 0.0]];
        let sol = emd_with_config(&a, &b, &cost, &EmdConfig::default()).unwrap();
        assert_marginals(&sol.plan, &a, &b, 1e-12);
        assert!(sol.plan.row(0).iter().all(|&p| p == 0.0));
        assert!(sol.plan.column(1).iter().all(|&p| p == 0.0));
        // Row 1 must cover all of column 0; the rest goes straight down.
        assert!((sol.cost - 0.6).abs() < 1e-12, "cost={}", sol.cost);
        assert!(sol.alpha.iter().chain(sol.beta.iter()).all(|x| x.is_finite()));
    }

    #[test]
    fn emd_single_source() {
        let a = array![1.0];
        let b = array![0.25, 0.75];
        let cost = array![[2.0, 4.0]];
        let plan = emd(&a, &b, &cost).unwrap();
        assert_eq!(plan, array![[0.25, 0.75]]);
        assert!((emd2(&a, &b, &cost).unwrap() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn emd_rejects_bad_inputs() {
        let a = array![0.5, 0.5];
        let cost = array![[0.0, 1.0], [1.0, 0.0]];

        assert!(matches!(
            emd(&a, &array![0.5, 0.5, 0.0], &cost),
            Err(Error::CostShapeMismatch(2, 3, 2, 2))
        ));
        assert!(matches!(
            emd(&a, &array![0.5, 0.6], &cost),
            Err(Error::MassMismatch(..))
        ));
        assert!(matches!(
            emd(&a, &array![1.5, -0.5], &cost),
            Err(Error::Domain(_))
        ));
        assert!(matches!(
            emd(&a, &a, &array![[0.0, f64::INFINITY], [1.0, 0.0]]),
            Err(Error::NonFinite(_))
        ));
        assert!(matches!(
            emd(&Array1::zeros(0), &Array1::zeros(0), &Array2::zeros((0, 0))),
            Err(Error::Domain(_))
        ));
    }

    #[test]
    fn emd_reports_pivot_limit() {
        let a = array![0.5, 0.5];
        let cost = array![[1.0, 0.0], [0.0, 1.0]];
        let config = EmdConfig::new().with_max_iter(0);
        assert!(matches!(
            emd_with_config(&a, &a, &cost, &config),
            Err(Error::EmdNotConverged(0))
        ));
    }

    #[test]
    fn emd_matches_best_permutation() {
        // For square uniform marginals an optimal vertex is a scaled permutation.
        let cost = array![
            [4.0, 1.0, 3.0, 7.0, 2.0],
            [2.0, 0.0, 5.0, 1.0, 6.0],
            [3.0, 2.0, 2.0, 8.0, 4.0],
            [9.0, 4.0, 1.0, 3.0, 2.0],
            [1.0, 5.0, 7.0, 2.0, 3.0]
        ];
        let n = 5;
        let u = Array1::from_elem(n, 1.0 / n as f64);
        let got = emd2(&u, &u, &cost).unwrap();
        let best = permutations(n)
            .iter()
            .map(|p| p.iter().enumerate().map(|(i, &j)| cost[[i, j]]).sum::<f64>())
            .fold(f64::INFINITY, f64::min)
            / n as f64;
        assert!((got - best).abs() < 1e-12, "got={} best={}", got, best);
    }

    proptest! {
        #[test]
        fn emd_plan_respects_uniform_marginals(
            (m, n, costs) in (1usize..9, 1usize..9).prop_flat_map(|(m, n)| {
                (Just(m), Just(n), prop::collection::vec(0.0f64..10.0, m * n))
            }),
        ) {
            let cost = Array2::from_shape_vec((m, n), costs).unwrap();
            let a = Array1::from_elem(m, 1.0 / m as f64);
            let b = Array1::from_elem(n, 1.0 / n as f64);
            let sol = emd_with_config(&a, &b, &cost, &EmdConfig::default()).unwrap();

            for r in sol.plan.sum_axis(Axis(1)).iter() {
                prop_assert!((r - 1.0 / m as f64).abs() < 1e-9);
            }
            for c in sol.plan.sum_axis(Axis(0)).iter() {
                prop_assert!((c - 1.0 / n as f64).abs() < 1e-9);
            }
            prop_assert!(sol.plan.iter().all(|&p| p >= 0.0));
            prop_assert!((sol.plan.sum() - 1.0).abs() < 1e-9);

            // Weak duality gap closes at the optimum.
            let dual = a.dot(&sol.alpha) + b.dot(&sol.beta);
            prop_assert!((dual - sol.cost).abs() < 1e-8);
            for i in 0..m {
                for j in 0..n {
                    prop_assert!(cost[[i, j]] - sol.alpha[i] - sol.beta[j] >= -1e-8);
                }
            }
        }

        #[test]
        fn emd_square_uniform_equals_assignment(
            costs in prop::collection::vec(0.0f64..5.0, 16),
        ) {
            let n = 4;
            let cost = Array2::from_shape_vec((n, n), costs).unwrap();
            let u = Array1::from_elem(n, 0.25);
            let got = emd2(&u, &u, &cost).unwrap();
            let best = permutations(n)
                .iter()
                .map(|p| p.iter().enumerate().map(|(i, &j)| cost[[i, j]]).sum::<f64>())
                .fold(f64::INFINITY, f64::min)
                / n as f64;
            prop_assert!((got - best).abs() < 1e-9, "got={} best={}", got, best);
        }
    }
}
