use nalgebra::DMatrix;

/// Symmetric matrix stored as its packed upper triangle (column-major, LAPACK `'U'` layout).
///
/// Element `(i, j)` with `i <= j` lives at `i + j * (j + 1) / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedSymmetricMatrix {
    dim: usize,
    data: Vec<f64>,
}

#[inline]
pub(crate) const fn packed_index(i: usize, j: usize) -> usize {
    i + j * (j + 1) / 2
}

impl PackedSymmetricMatrix {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            data: vec![0.0; dim * (dim + 1) / 2],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        self.data[packed_index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        self.data[packed_index(i, j)] = value;
    }

    /// Whether every stored entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Expands to a full dense matrix.
    pub fn to_dense(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.dim, self.dim, |i, j| self.get(i, j))
    }

    /// Induced 1-norm (maximum absolute column sum).
    pub fn norm_one(&self) -> f64 {
        (0..self.dim)
            .map(|j| (0..self.dim).map(|i| self.get(i, j).abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }
}
