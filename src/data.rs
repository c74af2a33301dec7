//! Data-matrix plumbing: sparse/dense storage and representation lookup.
//!
//! Count matrices from spot arrays are mostly zeros and usually arrive in
//! compressed sparse row (CSR) form; alternative representations (PCA
//! embeddings, spatial coordinates) are dense. The numeric routines in this
//! crate take dense arrays, so [`to_dense_array`] is the single conversion point.

use crate::{Error, Result};
use ndarray::Array2;
use std::collections::BTreeMap;

/// Compressed sparse row matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    /// `indptr[i]..indptr[i + 1]` is the range of row `i` in `indices`/`data`.
    pub indptr: Vec<usize>,
    /// Column index of every stored entry.
    pub indices: Vec<usize>,
    /// Value of every stored entry.
    pub data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

impl CsrMatrix {
    /// Build from `(row, col, value)` triplets.
    ///
    /// Entries are ordered by row then column. Duplicates are kept as separate
    /// stored entries and add up when densified.
    pub fn from_triplets<I>(nrows: usize, ncols: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut sorted: Vec<_> = entries.into_iter().collect();
        if let Some(&(row, col, _)) = sorted.iter().find(|(r, c, _)| *r >= nrows || *c >= ncols) {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                nrows,
                ncols,
            });
        }
        sorted.sort_by_key(|&(r, c, _)| (r, c));

        let mut indptr = vec![0usize; nrows + 1];
        for &(r, _, _) in &sorted {
            indptr[r + 1] += 1;
        }
        for i in 1..=nrows {
            indptr[i] += indptr[i - 1];
        }

        let (indices, data) = sorted.into_iter().map(|(_, c, v)| (c, v)).unzip();
        Ok(Self {
            indptr,
            indices,
            data,
            nrows,
            ncols,
        })
    }

    /// Build from raw CSR buffers, checking their consistency.
    pub fn from_raw(
        nrows: usize,
        ncols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self> {
        if indptr.len() != nrows + 1 {
            return Err(Error::LengthMismatch(indptr.len(), nrows + 1));
        }
        if indices.len() != data.len() {
            return Err(Error::LengthMismatch(indices.len(), data.len()));
        }
        if indptr[0] != 0 || indptr[nrows] != data.len() || indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::Domain("indptr must be nondecreasing from 0 to nnz"));
        }
        for row in 0..nrows {
            for &col in &indices[indptr[row]..indptr[row + 1]] {
                if col >= ncols {
                    return Err(Error::IndexOutOfBounds {
                        row,
                        col,
                        nrows,
                        ncols,
                    });
                }
            }
        }
        Ok(Self {
            indptr,
            indices,
            data,
            nrows,
            ncols,
        })
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Dense copy; duplicate entries are summed.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.nrows, self.ncols));
        for row in 0..self.nrows {
            for k in self.indptr[row]..self.indptr[row + 1] {
                out[[row, self.indices[k]]] += self.data[k];
            }
        }
        out
    }
}

/// A data matrix that is either stored densely or in CSR form.
#[derive(Debug, Clone, PartialEq)]
pub enum DataMatrix {
    /// Dense row-major array.
    Dense(Array2<f64>),
    /// Compressed sparse rows.
    Sparse(CsrMatrix),
}

impl DataMatrix {
    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            DataMatrix::Dense(x) => x.dim(),
            DataMatrix::Sparse(x) => x.shape(),
        }
    }

    /// Dense copy of the matrix.
    pub fn to_dense(&self) -> Array2<f64> {
        match self {
            DataMatrix::Dense(x) => x.clone(),
            DataMatrix::Sparse(x) => x.to_dense(),
        }
    }
}

impl From<Array2<f64>> for DataMatrix {
    fn from(x: Array2<f64>) -> Self {
        DataMatrix::Dense(x)
    }
}

impl From<CsrMatrix> for DataMatrix {
    fn from(x: CsrMatrix) -> Self {
        DataMatrix::Sparse(x)
    }
}

/// Dense array from either storage.
pub fn to_dense_array(x: &DataMatrix) -> Array2<f64> {
    x.to_dense()
}

/// Observations × features data with named alternative representations.
///
/// `x` is the primary matrix (typically counts); `obsm` holds per-observation
/// matrices such as embeddings or spatial coordinates, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedData {
    /// Primary data matrix.
    pub x: Option<DataMatrix>,
    /// Alternative representations, one row per observation.
    pub obsm: BTreeMap<String, DataMatrix>,
}

impl AnnotatedData {
    /// Wrap a primary matrix.
    pub fn new(x: impl Into<DataMatrix>) -> Self {
        Self {
            x: Some(x.into()),
            obsm: BTreeMap::new(),
        }
    }

    /// Add (or replace) a named representation.
    pub fn with_representation(mut self, key: impl Into<String>, rep: impl Into<DataMatrix>) -> Self {
        self.obsm.insert(key.into(), rep.into());
        self
    }
}

/// The primary matrix when `rep` is `None`, otherwise the named representation.
///
/// ```rust
/// use ndarray::array;
/// use spotmatch::{extract_data_matrix, AnnotatedData};
///
/// let adata = AnnotatedData::new(array![[1.0, 0.0], [0.0, 2.0]])
///     .with_representation("spatial", array![[0.0, 0.0], [1.0, 0.0]]);
///
/// assert_eq!(extract_data_matrix(&adata, None).unwrap().shape(), (2, 2));
/// assert!(extract_data_matrix(&adata, Some("pca")).is_err());
/// ```
pub fn extract_data_matrix<'a>(adata: &'a AnnotatedData, rep: Option<&str>) -> Result<&'a DataMatrix> {
    match rep {
        None => adata
            .x
            .as_ref()
            .ok_or(Error::Domain("annotated data has no primary matrix")),
        Some(key) => adata
            .obsm
            .get(key)
            .ok_or_else(|| Error::MissingRepresentation(key.to_string())),
    }
}
