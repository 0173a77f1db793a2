use crate::shape::MatmulDims;

/// Compute a contiguous band of output rows.
///
/// `out` holds rows `row_start..row_start + out.len() / p` of the product.
/// Each element is the plain dot product of a row of `a` and a column of `b`,
/// accumulated left to right.
pub(crate) fn matmul_rows(a: &[f32], b: &[f32], dims: MatmulDims, row_start: usize, out: &mut [f32]) {
    let MatmulDims { m, p, .. } = dims;
    for (r, out_row) in out.chunks_exact_mut(p).enumerate() {
        let i = row_start + r;
        let a_row = &a[i * m..(i + 1) * m];
        for (j, cell) in out_row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (k, &a_ik) in a_row.iter().enumerate() {
                sum += a_ik * b[k * p + j];
            }
            *cell = sum;
        }
    }
}
