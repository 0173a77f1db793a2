/// Entry point name of the matmul kernel inside [`MATMUL_KERNEL_SOURCE`].
pub const MATMUL_KERNEL_NAME: &str = "matmul_f32";

/// Metal Shading Language source for the f32 matmul kernel.
///
/// One thread computes one output element (`gid.y` is the row, `gid.x` the
/// column). Threads outside the `n x p` output return immediately, so the grid
/// may be rounded up to whole threadgroups.
pub const MATMUL_KERNEL_SOURCE: &str = r#"
#include <metal_stdlib>
using namespace metal;

struct MatmulDims {
    uint n;
    uint m;
    uint p;
};

kernel void matmul_f32(
    device const float* a [[buffer(0)]],
    device const float* b [[buffer(1)]],
    device float* c [[buffer(2)]],
    constant MatmulDims& dims [[buffer(3)]],
    uint2 gid [[thread_position_in_grid]]
) {
    const uint row = gid.y;
    const uint col = gid.x;
    if (row >= dims.n || col >= dims.p) {
        return;
    }

    float sum = 0.0f;
    for (uint k = 0; k < dims.m; ++k) {
        sum = fma(a[row * dims.m + k], b[k * dims.p + col], sum);
    }
    c[row * dims.p + col] = sum;
}
"#;

/// Host-side mirror of the kernel's `MatmulDims` argument.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelDims {
    pub n: u32,
    pub m: u32,
    pub p: u32,
}
