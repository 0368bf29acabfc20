use std::ffi::CString;
use std::os::raw::c_char;

/// C-compatible result envelope for all FFI calls.
///
/// Both `data` and `error` are heap-allocated C strings owned by this struct.
/// The caller must free the entire envelope (including the inner strings) by
/// passing the pointer to `tm_free`.
#[repr(C)]
pub struct TmResult {
    /// `true` on success, `false` on failure.
    pub ok: bool,
    /// JSON payload on success; null pointer on failure.
    pub data: *mut c_char,
    /// Error message on failure; null pointer on success.
    pub error: *mut c_char,
}

impl TmResult {
    /// Allocate a successful result whose data field holds `json`.
    ///
    /// Ownership passes to the caller, who must eventually call `tm_free`.
    pub fn success(json: &str) -> *mut Self {
        Box::into_raw(Box::new(TmResult {
            ok: true,
            data: to_c_string(json).into_raw(),
            error: std::ptr::null_mut(),
        }))
    }

    /// Allocate a failure result whose error field holds `message`.
    ///
    /// Ownership passes to the caller, who must eventually call `tm_free`.
    pub fn failure(message: &str) -> *mut Self {
        Box::into_raw(Box::new(TmResult {
            ok: false,
            data: std::ptr::null_mut(),
            error: to_c_string(message).into_raw(),
        }))
    }

    /// Envelope for an operation outcome: `Ok` carries JSON, `Err` a message.
    pub fn from_outcome(outcome: Result<String, String>) -> *mut Self {
        match outcome {
            Ok(json) => Self::success(&json),
            Err(message) => Self::failure(&message),
        }
    }

    /// Reclaim ownership of the inner C strings and the struct itself.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a pointer produced by `TmResult::success` or
    /// `TmResult::failure` that has not been freed already.
    pub unsafe fn free(ptr: *mut Self) {
        if ptr.is_null() {
            return;
        }

        let result = Box::from_raw(ptr);

        if !result.data.is_null() {
            drop(CString::from_raw(result.data));
        }

        if !result.error.is_null() {
            drop(CString::from_raw(result.error));
        }
    }
}

/// `CString` from `s` with interior NUL bytes removed.
fn to_c_string(s: &str) -> CString {
    CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}
