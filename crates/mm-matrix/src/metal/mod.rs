// Metal GPU compute backend (macOS only).
//
// The device, command queue and compiled pipeline are acquired once in
// `MetalBackend::new` and released when the backend is dropped. Buffers for a
// single product live only for the duration of one `matmul` call.

pub mod kernel;

use std::ffi::c_void;
use std::ptr::NonNull;

use log::{debug, info};
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_foundation::{NSError, NSString};
use objc2_metal::{
    MTLBuffer, MTLCommandBuffer, MTLCommandBufferStatus, MTLCommandEncoder, MTLCommandQueue,
    MTLComputeCommandEncoder, MTLComputePipelineState, MTLCopyAllDevices,
    MTLCreateSystemDefaultDevice, MTLDevice, MTLLibrary, MTLResourceOptions, MTLSize,
};

use crate::backend::ComputeBackend;
use crate::config::BackendKind;
use crate::error::{MatmulError, Result};
use crate::shape::MatmulDims;
use kernel::{KernelDims, MATMUL_KERNEL_NAME, MATMUL_KERNEL_SOURCE};

type Device = Retained<ProtocolObject<dyn MTLDevice>>;
type Buffer = Retained<ProtocolObject<dyn MTLBuffer>>;

/// Matrix multiplication on a Metal GPU.
#[derive(Debug)]
pub struct MetalBackend {
    device: Device,
    queue: Retained<ProtocolObject<dyn MTLCommandQueue>>,
    pipeline: Retained<ProtocolObject<dyn MTLComputePipelineState>>,
    device_name: String,
}

// SAFETY: MTLDevice, MTLCommandQueue and MTLComputePipelineState are
// thread-safe per Apple's documentation; per-call objects are never shared.
unsafe impl Send for MetalBackend {}
unsafe impl Sync for MetalBackend {}

impl MetalBackend {
    /// Open a device, create a command queue and compile the matmul kernel.
    ///
    /// `device_index = None` uses the system default device.
    ///
    /// # Errors
    /// `BackendUnavailable` if there is no such device or the kernel fails to
    /// compile.
    pub fn new(device_index: Option<usize>, log_kernel_build: bool) -> Result<Self> {
        let device = open_device(device_index)?;
        let device_name = device.name().to_string();

        let queue = device
            .newCommandQueue()
            .ok_or_else(|| MatmulError::unavailable("metal", "failed to create command queue"))?;

        let source = NSString::from_str(MATMUL_KERNEL_SOURCE);
        #[allow(unused_unsafe)]
        let library = unsafe { device.newLibraryWithSource_options_error(&source, None) }
            .map_err(|e| {
                MatmulError::unavailable("metal", format!("kernel compile failed: {}", describe(&e)))
            })?;
        let function = library
            .newFunctionWithName(&NSString::from_str(MATMUL_KERNEL_NAME))
            .ok_or_else(|| {
                MatmulError::unavailable("metal", format!("kernel '{}' not found", MATMUL_KERNEL_NAME))
            })?;
        let pipeline = device
            .newComputePipelineStateWithFunction_error(&function)
            .map_err(|e| {
                MatmulError::unavailable("metal", format!("pipeline creation failed: {}", describe(&e)))
            })?;

        if log_kernel_build {
            info!(
                "compiled Metal kernel '{}' on {}: thread execution width {}, max {} threads per threadgroup",
                MATMUL_KERNEL_NAME,
                device_name,
                pipeline.threadExecutionWidth(),
                pipeline.maxTotalThreadsPerThreadgroup()
            );
        }

        Ok(Self {
            device,
            queue,
            pipeline,
            device_name,
        })
    }

    /// Returns true if a default Metal device can be opened.
    pub fn is_available() -> bool {
        open_device(None).is_ok()
    }

    /// Name reported by the underlying device.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    fn upload(&self, data: &[f32]) -> Result<Buffer> {
        let ptr = NonNull::new(data.as_ptr() as *mut c_void)
            .ok_or_else(|| MatmulError::ComputeFailure("null host buffer".to_string()))?;
        // SAFETY: `ptr` points to `size_of_val(data)` readable bytes; Metal
        // copies them before returning.
        unsafe {
            self.device.newBufferWithBytes_length_options(
                ptr,
                std::mem::size_of_val(data),
                MTLResourceOptions::StorageModeShared,
            )
        }
        .ok_or_else(|| MatmulError::ComputeFailure("device buffer allocation failed".to_string()))
    }
}

impl ComputeBackend for MetalBackend {
    fn name(&self) -> &str {
        "metal"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Metal
    }

    #[allow(unused_unsafe)]
    fn matmul(&self, a: &[f32], b: &[f32], dims: MatmulDims) -> Result<Vec<f32>> {
        dims.check_operands(a, b)?;
        let kernel_dims = to_kernel_dims(dims)?;
        let out_len = dims.out_len();

        let a_buf = self.upload(a)?;
        let b_buf = self.upload(b)?;
        let c_buf = unsafe {
            self.device.newBufferWithLength_options(
                out_len * std::mem::size_of::<f32>(),
                MTLResourceOptions::StorageModeShared,
            )
        }
        .ok_or_else(|| MatmulError::ComputeFailure("device buffer allocation failed".to_string()))?;

        let command_buffer = self
            .queue
            .commandBuffer()
            .ok_or_else(|| MatmulError::ComputeFailure("failed to create command buffer".to_string()))?;
        let encoder = command_buffer
            .computeCommandEncoder()
            .ok_or_else(|| MatmulError::ComputeFailure("failed to create compute encoder".to_string()))?;

        let width = self.pipeline.threadExecutionWidth().max(1);
        let height = (self.pipeline.maxTotalThreadsPerThreadgroup() / width).max(1);
        let group = MTLSize {
            width,
            height,
            depth: 1,
        };
        let groups = MTLSize {
            width: dims.p.div_ceil(width),
            height: dims.n.div_ceil(height),
            depth: 1,
        };
        debug!(
            "metal matmul {} on {}: {}x{} threadgroups of {}x{}",
            dims, self.device_name, groups.width, groups.height, width, height
        );

        // SAFETY: buffer indices match the kernel signature and every buffer
        // outlives the command buffer, which is awaited below. The kernel
        // bounds-checks threads that fall outside the output.
        unsafe {
            encoder.setComputePipelineState(&self.pipeline);
            encoder.setBuffer_offset_atIndex(Some(&a_buf), 0, 0);
            encoder.setBuffer_offset_atIndex(Some(&b_buf), 0, 1);
            encoder.setBuffer_offset_atIndex(Some(&c_buf), 0, 2);
            encoder.setBytes_length_atIndex(
                NonNull::from(&kernel_dims).cast::<c_void>(),
                std::mem::size_of::<KernelDims>(),
                3,
            );
            encoder.dispatchThreadgroups_threadsPerThreadgroup(groups, group);
        }
        encoder.endEncoding();

        command_buffer.commit();
        command_buffer.waitUntilCompleted();

        if command_buffer.status() != MTLCommandBufferStatus::Completed {
            let reason = command_buffer
                .error()
                .map(|e| describe(&e))
                .unwrap_or_else(|| format!("command buffer status {:?}", command_buffer.status()));
            return Err(MatmulError::ComputeFailure(reason));
        }

        // SAFETY: the command buffer has completed, so the shared-mode output
        // buffer holds `out_len` initialised f32 values and no GPU work aliases it.
        let out = unsafe {
            std::slice::from_raw_parts(c_buf.contents().as_ptr() as *const f32, out_len)
        };
        Ok(out.to_vec())
    }
}

fn open_device(index: Option<usize>) -> Result<Device> {
    match index {
        None => {
            #[allow(unused_unsafe)]
            let device = unsafe { MTLCreateSystemDefaultDevice() };
            device.ok_or_else(|| MatmulError::unavailable("metal", "no Metal device found"))
        }
        Some(i) => {
            #[allow(unused_unsafe)]
            let devices = unsafe { MTLCopyAllDevices() };
            if i >= devices.count() {
                return Err(MatmulError::unavailable(
                    "metal",
                    format!("device index {} out of range ({} devices)", i, devices.count()),
                ));
            }
            Ok(devices.objectAtIndex(i))
        }
    }
}

fn to_kernel_dims(dims: MatmulDims) -> Result<KernelDims> {
    let narrow = |v: usize| {
        u32::try_from(v).map_err(|_| {
            MatmulError::ComputeFailure(format!("{} exceeds the kernel's 32-bit index range", dims))
        })
    };
    // Linear indices inside the kernel are 32-bit as well.
    narrow(dims.lhs_len().max(dims.rhs_len()).max(dims.out_len()))?;
    Ok(KernelDims {
        n: narrow(dims.n)?,
        m: narrow(dims.m)?,
        p: narrow(dims.p)?,
    })
}

fn describe(error: &NSError) -> String {
    error.localizedDescription().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CpuBackend;

    #[test]
    fn test_kernel_dims() {
        assert_eq!(
            to_kernel_dims(MatmulDims::new(3, 4, 5)).unwrap(),
            KernelDims { n: 3, m: 4, p: 5 }
        );
    }

    #[test]
    fn test_matches_reference_when_device_present() {
        let backend = match MetalBackend::new(None, true) {
            Ok(b) => b,
            Err(_) => return, // no GPU on this machine
        };
        let dims = MatmulDims::new(19, 7, 23);
        let a: Vec<f32> = (0..dims.lhs_len()).map(|i| (i % 5) as f32 - 2.0).collect();
        let b: Vec<f32> = (0..dims.rhs_len()).map(|i| (i % 3) as f32 * 0.5).collect();
        let expected = CpuBackend::new().matmul(&a, &b, dims).unwrap();
        let got = backend.matmul(&a, &b, dims).unwrap();
        for (x, y) in got.iter().zip(expected.iter()) {
            approx::assert_relative_eq!(x, y, max_relative = 1e-4, epsilon = 1e-5);
        }
    }
}
