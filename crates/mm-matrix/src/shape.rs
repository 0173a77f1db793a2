use crate::error::{MatmulError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row and column counts of a dense row-major matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }

    /// Total number of elements (rows * cols).
    ///
    /// Only meaningful for shapes that pass [`Shape::validate`]; use
    /// [`Shape::checked_numel`] for untrusted dimensions.
    pub fn numel(&self) -> usize {
        self.rows * self.cols
    }

    /// `rows * cols`, or `None` if an f32 buffer of that many elements could
    /// not be allocated (the byte size would exceed `isize::MAX`).
    pub fn checked_numel(&self) -> Option<usize> {
        self.rows
            .checked_mul(self.cols)
            .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<f32>())
    }

    /// Linear index of element (i, j) in row-major order.
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    /// Row-major strides `[cols, 1]`.
    pub fn strides(&self) -> [usize; 2] {
        [self.cols, 1]
    }

    /// Returns an error if either dimension is zero or the element count
    /// does not fit in an f32 buffer.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 || self.checked_numel().is_none() {
            return Err(MatmulError::InvalidShape {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}]", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Shape::new(rows, cols)
    }
}

/// Dimensions of a single product: `[n x m] @ [m x p] -> [n x p]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatmulDims {
    pub n: usize,
    pub m: usize,
    pub p: usize,
}

impl MatmulDims {
    pub fn new(n: usize, m: usize, p: usize) -> Self {
        MatmulDims { n, m, p }
    }

    /// Derive the product dimensions from two operand shapes.
    ///
    /// Shape validity is checked before the inner dimension, so a zero-sized
    /// operand reports `InvalidShape` even when the inner dimensions also differ.
    pub fn from_shapes(lhs: Shape, rhs: Shape) -> Result<Self> {
        lhs.validate()?;
        rhs.validate()?;
        if lhs.cols != rhs.rows {
            return Err(MatmulError::DimensionMismatch {
                n: lhs.rows,
                m: lhs.cols,
                m2: rhs.rows,
                p: rhs.cols,
            });
        }
        let dims = MatmulDims::new(lhs.rows, lhs.cols, rhs.cols);
        dims.out_shape().validate()?;
        Ok(dims)
    }

    /// Checks all three shapes involved, including the product's, so the
    /// length helpers below cannot overflow afterwards.
    pub fn validate(&self) -> Result<()> {
        self.lhs_shape().validate()?;
        self.rhs_shape().validate()?;
        self.out_shape().validate()
    }

    /// Expected length of the left operand.
    pub fn lhs_len(&self) -> usize {
        self.n * self.m
    }

    /// Expected length of the right operand.
    pub fn rhs_len(&self) -> usize {
        self.m * self.p
    }

    /// Length of the product.
    pub fn out_len(&self) -> usize {
        self.n * self.p
    }

    pub fn lhs_shape(&self) -> Shape {
        Shape::new(self.n, self.m)
    }

    pub fn rhs_shape(&self) -> Shape {
        Shape::new(self.m, self.p)
    }

    pub fn out_shape(&self) -> Shape {
        Shape::new(self.n, self.p)
    }

    /// Check operand slices against these dimensions.
    pub fn check_operands(&self, a: &[f32], b: &[f32]) -> Result<()> {
        self.validate()?;
        if a.len() != self.lhs_len() {
            return Err(MatmulError::StorageLength {
                rows: self.n,
                cols: self.m,
                len: a.len(),
            });
        }
        if b.len() != self.rhs_len() {
            return Err(MatmulError::StorageLength {
                rows: self.m,
                cols: self.p,
                len: b.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for MatmulDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}] @ [{}x{}]", self.n, self.m, self.m, self.p)
    }
}
