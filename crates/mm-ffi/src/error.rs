use std::cell::RefCell;
use std::ffi::CString;

use mm_matrix::MatmulError;

use crate::types::MMStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `mm_last_error`.
pub fn set_last_error(msg: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Record `e` as the last error and map it to a status code.
pub fn report(e: &MatmulError) -> MMStatus {
    log::debug!("ffi call failed: {}", e);
    set_last_error(e.to_string());
    MMStatus::from(e)
}
