// =============================================================================
// Design Matrices
// =============================================================================
//
// The optimizers only ever touch X through two products:
//
//     η = Xβ        (linear predictor, one entry per sample)
//     g = Xᵀr       (gradient, one entry per feature)
//
// The `Design` trait captures exactly that, so the same fitting code runs on
// a dense `ndarray::Array2<f64>` or on a compressed sparse row matrix. Count
// data with many indicator columns is often >95% zeros, where CSR saves both
// memory and time.
//
// =============================================================================

use ndarray::{Array1, Array2};
use rayon::prelude::*;

use crate::error::{AmgdError, Result};

/// Row count above which sparse matrix-vector products run on the rayon pool.
const PARALLEL_ROW_THRESHOLD: usize = 4096;

/// A read-only n × p design matrix.
pub trait Design {
    /// Number of samples n.
    fn nrows(&self) -> usize;

    /// Number of features p.
    fn ncols(&self) -> usize;

    /// Xβ, length n. `beta` has length p.
    fn matvec(&self, beta: &Array1<f64>) -> Array1<f64>;

    /// Xᵀr, length p. `r` has length n.
    fn rmatvec(&self, r: &Array1<f64>) -> Array1<f64>;

    /// First stored entry that is NaN or infinite, as (row, col, value).
    fn first_non_finite(&self) -> Option<(usize, usize, f64)>;
}

// =============================================================================
// Dense
// =============================================================================

impl Design for Array2<f64> {
    fn nrows(&self) -> usize {
        Array2::nrows(self)
    }

    fn ncols(&self) -> usize {
        Array2::ncols(self)
    }

    fn matvec(&self, beta: &Array1<f64>) -> Array1<f64> {
        self.dot(beta)
    }

    fn rmatvec(&self, r: &Array1<f64>) -> Array1<f64> {
        self.t().dot(r)
    }

    fn first_non_finite(&self) -> Option<(usize, usize, f64)> {
        self.indexed_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|((i, j), &v)| (i, j, v))
    }
}

// =============================================================================
// Compressed Sparse Row
// =============================================================================

/// Sparse matrix in compressed sparse row (CSR) layout.
///
/// Row `i` owns the half-open range `indptr[i]..indptr[i + 1]` of `indices`
/// (column numbers) and `data` (values).
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    nrows: usize,
    ncols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// Build a CSR matrix from raw parts, checking the structure.
    pub fn new(
        nrows: usize,
        ncols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self> {
        if indptr.len() != nrows + 1 {
            return Err(AmgdError::InvalidInput(format!(
                "CSR indptr has {} entries but {} rows need {}",
                indptr.len(),
                nrows,
                nrows + 1
            )));
        }
        if indices.len() != data.len() {
            return Err(AmgdError::InvalidInput(format!(
                "CSR indices has {} entries but data has {}",
                indices.len(),
                data.len()
            )));
        }
        if indptr[0] != 0 || indptr[nrows] != data.len() {
            return Err(AmgdError::InvalidInput(format!(
                "CSR indptr must start at 0 and end at nnz = {}",
                data.len()
            )));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(AmgdError::InvalidInput(
                "CSR indptr must be non-decreasing".to_string(),
            ));
        }
        if let Some(&col) = indices.iter().find(|&&c| c >= ncols) {
            return Err(AmgdError::InvalidInput(format!(
                "CSR column index {} out of range for {} columns",
                col, ncols
            )));
        }

        Ok(Self {
            nrows,
            ncols,
            indptr,
            indices,
            data,
        })
    }

    /// Compress a dense matrix, dropping exact zeros.
    pub fn from_dense(x: &Array2<f64>) -> Self {
        let mut indptr = Vec::with_capacity(x.nrows() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for row in x.rows() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    indices.push(j);
                    data.push(v);
                }
            }
            indptr.push(data.len());
        }

        Self {
            nrows: x.nrows(),
            ncols: x.ncols(),
            indptr,
            indices,
            data,
        }
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.nrows, self.ncols));
        for i in 0..self.nrows {
            for k in self.indptr[i]..self.indptr[i + 1] {
                out[[i, self.indices[k]]] = self.data[k];
            }
        }
        out
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    fn row_dot(&self, i: usize, beta: &Array1<f64>) -> f64 {
        (self.indptr[i]..self.indptr[i + 1])
            .map(|k| self.data[k] * beta[self.indices[k]])
            .sum()
    }
}

impl Design for CsrMatrix {
    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn matvec(&self, beta: &Array1<f64>) -> Array1<f64> {
        if self.nrows >= PARALLEL_ROW_THRESHOLD {
            let rows: Vec<f64> = (0..self.nrows)
                .into_par_iter()
                .map(|i| self.row_dot(i, beta))
                .collect();
            Array1::from(rows)
        } else {
            (0..self.nrows).map(|i| self.row_dot(i, beta)).collect()
        }
    }

    fn rmatvec(&self, r: &Array1<f64>) -> Array1<f64> {
        // Scatter: each stored entry contributes x_ij · r_i to column j
        let mut out = Array1::zeros(self.ncols);
        for i in 0..self.nrows {
            let ri = r[i];
            for k in self.indptr[i]..self.indptr[i + 1] {
                out[self.indices[k]] += self.data[k] * ri;
            }
        }
        out
    }

    fn first_non_finite(&self) -> Option<(usize, usize, f64)> {
        for i in 0..self.nrows {
            for k in self.indptr[i]..self.indptr[i + 1] {
                if !self.data[k].is_finite() {
                    return Some((i, self.indices[k], self.data[k]));
                }
            }
        }
        None
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn sample_dense() -> Array2<f64> {
        array![[1.0, 0.0, 2.0], [0.0, 0.0, 3.0], [4.0, 5.0, 0.0], [0.0, 0.0, 0.0]]
    }

    #[test]
    fn test_csr_products_match_dense() {
        let dense = sample_dense();
        let sparse = CsrMatrix::from_dense(&dense);
        assert_eq!(sparse.nnz(), 5);

        let beta = array![0.5, -1.0, 2.0];
        let r = array![1.0, 2.0, 3.0, 4.0];

        let dv = Design::matvec(&dense, &beta);
        let sv = sparse.matvec(&beta);
        let dt = Design::rmatvec(&dense, &r);
        let st = sparse.rmatvec(&r);

        for i in 0..4 {
            assert_abs_diff_eq!(dv[i], sv[i], epsilon = 1e-12);
        }
        for j in 0..3 {
            assert_abs_diff_eq!(dt[j], st[j], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_csr_roundtrip_dense() {
        let dense = sample_dense();
        assert_eq!(CsrMatrix::from_dense(&dense).to_dense(), dense);
    }

    #[test]
    fn test_csr_parallel_path_matches_sequential() {
        let n = PARALLEL_ROW_THRESHOLD + 10;
        let dense = Array2::from_shape_fn((n, 3), |(i, j)| ((i + j) % 3) as f64);
        let sparse = CsrMatrix::from_dense(&dense);
        let beta = array![1.0, 2.0, -1.0];

        let expected = dense.dot(&beta);
        let got = sparse.matvec(&beta);
        assert_eq!(got.len(), n);
        for i in 0..n {
            assert_abs_diff_eq!(expected[i], got[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_csr_rejects_bad_structure() {
        // indptr too short
        assert!(CsrMatrix::new(2, 2, vec![0, 1], vec![0], vec![1.0]).is_err());
        // column out of range
        assert!(CsrMatrix::new(1, 2, vec![0, 1], vec![5], vec![1.0]).is_err());
        // decreasing indptr
        assert!(CsrMatrix::new(2, 2, vec![0, 2, 1], vec![0, 1], vec![1.0, 1.0]).is_err());
    }

    #[test]
    fn test_first_non_finite() {
        let mut dense = sample_dense();
        assert!(Design::first_non_finite(&dense).is_none());
        dense[[2, 1]] = f64::NAN;
        let (i, j, _) = Design::first_non_finite(&dense).unwrap();
        assert_eq!((i, j), (2, 1));

        let sparse = CsrMatrix::new(1, 2, vec![0, 1], vec![1], vec![f64::INFINITY]).unwrap();
        assert_eq!(sparse.first_non_finite().map(|(i, j, _)| (i, j)), Some((0, 1)));
    }
}
