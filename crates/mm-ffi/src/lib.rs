mod context;
mod error;
mod types;

pub use context::*;
pub use error::*;
pub use types::*;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::AssertUnwindSafe;
use std::sync::OnceLock;

use mm_matrix::{BackendKind, MatrixView, MultiplierConfig};

/// Execute a closure that returns an `MMStatus`, catching any panics
/// and converting them into `MMStatus::ErrorInternal`.
///
/// The context is never touched again after a panic is caught, so the
/// closure is asserted unwind safe.
fn catch_panic<F: FnOnce() -> MMStatus>(f: F) -> MMStatus {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            MMStatus::ErrorInternal
        }
    }
}

/// Create a new multiplication context bound to `backend`.
///
/// On success, writes a heap-allocated `MMContext` pointer into `*ctx_out`
/// and returns `MMStatus::Ok`. The caller must later call `mm_context_destroy`
/// to free the context. Requesting an unavailable backend fails with
/// `MMStatus::ErrorBackendUnavailable`.
#[no_mangle]
pub unsafe extern "C" fn mm_context_create(
    backend: MMBackendType,
    ctx_out: *mut *mut MMContext,
) -> MMStatus {
    catch_panic(|| {
        if ctx_out.is_null() {
            set_last_error("ctx_out is null".to_string());
            return MMStatus::ErrorInvalidArgument;
        }
        let ctx = match MMContext::new(MultiplierConfig::with_backend(backend.into())) {
            Ok(c) => Box::new(c),
            Err(e) => return report(&e),
        };
        unsafe {
            *ctx_out = Box::into_raw(ctx);
        }
        MMStatus::Ok
    })
}

/// Destroy a context previously created by `mm_context_create`.
///
/// Passing a null pointer is a no-op and returns `MMStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn mm_context_destroy(ctx: *mut MMContext) -> MMStatus {
    if ctx.is_null() {
        return MMStatus::Ok;
    }
    drop(Box::from_raw(ctx));
    MMStatus::Ok
}

/// Multiply `a` (`a_rows x a_cols`) by `b` (`b_rows x b_cols`).
///
/// All buffers are row-major f32. `out` must have room for exactly
/// `a_rows * b_cols` elements; `out_len` states its capacity. On failure
/// `out` is left untouched.
#[no_mangle]
pub unsafe extern "C" fn mm_multiply(
    ctx: *const MMContext,
    a: *const f32,
    a_rows: usize,
    a_cols: usize,
    b: *const f32,
    b_rows: usize,
    b_cols: usize,
    out: *mut f32,
    out_len: usize,
) -> MMStatus {
    catch_panic(|| {
        if ctx.is_null() || a.is_null() || b.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return MMStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };
        let (a_len, b_len) = match (a_rows.checked_mul(a_cols), b_rows.checked_mul(b_cols)) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                set_last_error("matrix size overflows usize".to_string());
                return MMStatus::ErrorInvalidArgument;
            }
        };
        let (a_data, b_data) = unsafe {
            (
                std::slice::from_raw_parts(a, a_len),
                std::slice::from_raw_parts(b, b_len),
            )
        };
        let result = MatrixView::new(a_data, a_rows, a_cols)
            .and_then(|av| Ok((av, MatrixView::new(b_data, b_rows, b_cols)?)))
            .and_then(|(av, bv)| ctx.multiplier.multiply(av, bv));
        let product = match result {
            Ok(p) => p,
            Err(e) => return report(&e),
        };

        if product.data().len() != out_len {
            set_last_error(format!(
                "output buffer holds {} elements, product has {}",
                out_len,
                product.data().len()
            ));
            return MMStatus::ErrorInvalidArgument;
        }
        let out = unsafe { std::slice::from_raw_parts_mut(out, out_len) };
        out.copy_from_slice(product.data());
        MMStatus::Ok
    })
}

/// Name of the backend a context is using, as a static C string.
///
/// Returns null if `ctx` is null. The string must not be freed.
#[no_mangle]
pub unsafe extern "C" fn mm_backend_name(ctx: *const MMContext) -> *const c_char {
    if ctx.is_null() {
        return std::ptr::null();
    }
    match backend_c_name((*ctx).multiplier.backend_kind()) {
        Some(name) => name.as_ptr(),
        None => std::ptr::null(),
    }
}

/// NUL-terminated copies of `BackendKind::as_str`, built once.
fn backend_c_name(kind: BackendKind) -> Option<&'static CStr> {
    static NAMES: OnceLock<Vec<CString>> = OnceLock::new();
    let names = NAMES.get_or_init(|| {
        BackendKind::ALL
            .iter()
            .map(|k| CString::new(k.as_str()).unwrap_or_default())
            .collect()
    });
    let index = BackendKind::ALL.iter().position(|&k| k == kind)?;
    names.get(index).map(|n| n.as_c_str())
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `mm_free_string`.
#[no_mangle]
pub extern "C" fn mm_last_error() -> *mut c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by `mm_last_error`.
#[no_mangle]
pub unsafe extern "C" fn mm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
