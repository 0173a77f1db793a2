use crate::error::{MatmulError, Result};
use crate::shape::Shape;
use std::fmt;

/// An owned dense matrix of `f32` values in row-major order.
///
/// Element (i, j) lives at linear index `i * cols + j`. The backing storage
/// always holds exactly `rows * cols` elements and both dimensions are positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f32>,
    shape: Shape,
}

impl Matrix {
    /// Create a matrix from row-major data and a shape.
    ///
    /// # Errors
    /// `InvalidShape` if a dimension is zero, `StorageLength` if
    /// `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Result<Self> {
        check_storage(data.len(), shape)?;
        Ok(Matrix { data, shape })
    }

    /// Create a matrix from row-major data with explicit dimensions.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        Matrix::new(data, Shape::new(rows, cols))
    }

    /// Build a matrix from a list of rows. All rows must have the same length.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            data.extend_from_slice(row.as_ref());
        }
        Matrix::from_vec(rows.len(), cols, data)
    }

    /// Build a matrix by casting integer entries to `f32`.
    pub fn from_integers(rows: usize, cols: usize, values: &[i32]) -> Result<Self> {
        Matrix::from_vec(rows, cols, values.iter().map(|&v| v as f32).collect())
    }

    /// A matrix with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f32) -> Result<Self> {
        let shape = Shape::new(rows, cols);
        shape.validate()?;
        Ok(Matrix {
            data: vec![value; shape.numel()],
            shape,
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn ones(rows: usize, cols: usize) -> Result<Self> {
        Matrix::filled(rows, cols, 1.0)
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Matrix::zeros(n, n)?;
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        Ok(m)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    /// Returns the row-major backing data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consume the matrix and return its row-major data.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns element (i, j), or `None` if out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.view().get(i, j)
    }

    /// Returns row `i`.
    ///
    /// # Panics
    /// Panics if `i >= rows()`.
    pub fn row(&self, i: usize) -> &[f32] {
        let cols = self.shape.cols;
        &self.data[i * cols..(i + 1) * cols]
    }

    /// Borrow this matrix as a read-only view.
    pub fn view(&self) -> MatrixView<'_> {
        MatrixView {
            data: &self.data,
            shape: self.shape,
        }
    }

    /// Element-wise comparison with a relative tolerance.
    ///
    /// Two elements `x` and `y` match when
    /// `|x - y| <= rel_tol * max(1, |x|, |y|)`. Shapes must be equal.
    pub fn approx_eq(&self, other: &Matrix, rel_tol: f32) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&x, &y)| (x - y).abs() <= rel_tol * 1.0f32.max(x.abs()).max(y.abs()))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix {}", self.shape)?;
        for i in 0..self.rows() {
            let cells: Vec<String> = self.row(i).iter().map(|v| format!("{:.4}", v)).collect();
            writeln!(f, "  [{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

/// A borrowed, read-only view over row-major `f32` data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixView<'a> {
    data: &'a [f32],
    shape: Shape,
}

impl<'a> MatrixView<'a> {
    /// Wrap a slice as a `rows x cols` matrix.
    ///
    /// # Errors
    /// Same conditions as [`Matrix::new`].
    pub fn new(data: &'a [f32], rows: usize, cols: usize) -> Result<Self> {
        let shape = Shape::new(rows, cols);
        check_storage(data.len(), shape)?;
        Ok(MatrixView { data, shape })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.shape.rows || j >= self.shape.cols {
            return None;
        }
        Some(self.data[self.shape.index(i, j)])
    }

    /// Copy the viewed data into an owned matrix.
    pub fn to_matrix(&self) -> Matrix {
        Matrix {
            data: self.data.to_vec(),
            shape: self.shape,
        }
    }
}

impl<'a> From<&'a Matrix> for MatrixView<'a> {
    fn from(m: &'a Matrix) -> Self {
        m.view()
    }
}

fn check_storage(len: usize, shape: Shape) -> Result<()> {
    shape.validate()?;
    if len != shape.numel() {
        return Err(MatmulError::StorageLength {
            rows: shape.rows,
            cols: shape.cols,
            len,
        });
    }
    Ok(())
}
