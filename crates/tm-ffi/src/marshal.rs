use std::ffi::CStr;
use std::os::raw::c_char;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Serialize `value` to a JSON string.
pub fn to_json(value: &impl Serialize) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

/// Parse `json` into `T`, naming `what` in the error.
pub fn deserialize_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("failed to parse {what} JSON: {e}"))
}

pub fn parse_uuid(s: &str, what: &str) -> Result<Uuid, String> {
    Uuid::parse_str(s).map_err(|e| format!("invalid {what} UUID: {e}"))
}

/// Borrow the null-terminated C string at `ptr` and return it as an owned
/// `String`.
///
/// # Safety
///
/// `ptr` must be a valid, non-null pointer to a null-terminated UTF-8 string
/// that remains alive for the duration of this call.
///
/// Returns an error string if `ptr` is null or if the bytes are not valid
/// UTF-8.
pub unsafe fn cstring_to_str(ptr: *const c_char) -> Result<String, String> {
    if ptr.is_null() {
        return Err("received null pointer".to_string());
    }

    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| s.to_owned())
        .map_err(|e| format!("invalid UTF-8 in C string: {e}"))
}

/// Like [`cstring_to_str`], but a null pointer yields `None`.
///
/// # Safety
///
/// Same contract as [`cstring_to_str`] for non-null pointers.
pub unsafe fn optional_cstring(ptr: *const c_char) -> Result<Option<String>, String> {
    if ptr.is_null() {
        return Ok(None);
    }
    cstring_to_str(ptr).map(Some)
}
