//! Column-major storage for per-iteration input samples.
//!
//! Column `j` holds every draw of input `j`, so marginal generation and rank reordering work
//! on contiguous slices. Rows (one per iteration) are gathered on demand for model evaluation.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// `rows x cols` matrix of samples stored column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl SampleMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix from equally long columns.
    ///
    /// # Panics
    /// Panics if the columns have different lengths.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Self {
        let cols = columns.len();
        let rows = columns.first().map_or(0, Vec::len);
        assert!(
            columns.iter().all(|c| c.len() == rows),
            "all sample columns must have the same length"
        );
        let mut data = Vec::with_capacity(rows * cols);
        for column in columns {
            data.extend(column);
        }
        Self { rows, cols, data }
    }

    /// Number of iterations.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of inputs.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn column(&self, j: usize) -> &[f64] {
        &self.data[j * self.rows..(j + 1) * self.rows]
    }

    #[inline]
    pub fn column_mut(&mut self, j: usize) -> &mut [f64] {
        &mut self.data[j * self.rows..(j + 1) * self.rows]
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[col * self.rows + row]
    }

    /// Copies row `row` into `out`, which must have length `cols`.
    #[inline]
    pub fn row_into(&self, row: usize, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.cols);
        for (j, slot) in out.iter_mut().enumerate() {
            *slot = self.data[j * self.rows + row];
        }
    }

    pub fn row(&self, row: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.cols];
        self.row_into(row, &mut out);
        out
    }

    pub fn columns(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.cols).map(move |j| self.column(j))
    }

    /// Mutable iterator over columns.
    pub fn columns_mut(&mut self) -> std::slice::ChunksMut<'_, f64> {
        self.data.chunks_mut(self.rows.max(1))
    }

    /// Parallel mutable iterator over columns.
    #[cfg(feature = "parallel")]
    pub fn par_columns_mut(&mut self) -> rayon::slice::ChunksMut<'_, f64> {
        self.data.par_chunks_mut(self.rows.max(1))
    }

    /// Runs `f(j, column_j)` for every column, on the rayon pool when `parallel` is set and
    /// the `parallel` feature is enabled.
    pub fn for_each_column_mut<F>(&mut self, parallel: bool, f: F)
    where
        F: Fn((usize, &mut [f64])) + Send + Sync,
    {
        if self.rows == 0 {
            return;
        }

        #[cfg(feature = "parallel")]
        {
            if parallel {
                self.par_columns_mut().enumerate().for_each(f);
                return;
            }
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        self.columns_mut().enumerate().for_each(f);
    }

    pub fn into_columns(self) -> Vec<Vec<f64>> {
        if self.rows == 0 {
            return vec![Vec::new(); self.cols];
        }
        self.data.chunks(self.rows).map(<[f64]>::to_vec).collect()
    }
}
