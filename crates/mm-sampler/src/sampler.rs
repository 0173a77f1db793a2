use mm_matrix::{Matrix, Result};

/// Trait for generators that produce input matrices for a multiply.
pub trait MatrixSampler: Send {
    /// Returns the name of this sampler.
    fn name(&self) -> &str;

    /// Draw the next value.
    fn next_value(&mut self) -> f32;

    /// Produce a `rows x cols` matrix filled in row-major order.
    ///
    /// # Errors
    /// `InvalidShape` if either dimension is zero.
    fn sample(&mut self, rows: usize, cols: usize) -> Result<Matrix> {
        mm_matrix::Shape::new(rows, cols).validate()?;
        let data = (0..rows * cols).map(|_| self.next_value()).collect();
        Matrix::from_vec(rows, cols, data)
    }

    /// Produce a compatible operand pair `([n x m], [m x p])`.
    fn sample_pair(&mut self, n: usize, m: usize, p: usize) -> Result<(Matrix, Matrix)> {
        let a = self.sample(n, m)?;
        let b = self.sample(m, p)?;
        Ok((a, b))
    }
}
