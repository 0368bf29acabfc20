use std::collections::HashMap;
use std::os::raw::c_char;
use std::sync::{Mutex, MutexGuard, OnceLock};

use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use tm_compare::{semantic_similarity, CompareConfig, CompareEngine};
use tm_merge::Selection;
use tm_session::validator::validate_inputs;
use tm_session::ComparisonSession;

use crate::marshal::{cstring_to_str, deserialize_json, optional_cstring, parse_uuid, to_json};
use crate::result::TmResult;

/// Log filter used when `tm_init_logging` receives a null pointer.
const DEFAULT_LOG_FILTER: &str = "info";

// ---------------------------------------------------------------------------
// Global session registry
// ---------------------------------------------------------------------------

static SESSIONS: OnceLock<Mutex<HashMap<Uuid, ComparisonSession>>> = OnceLock::new();

/// Lock the registry. Each FFI call holds the lock for one whole operation,
/// which serializes merges on the same session.
fn sessions() -> Result<MutexGuard<'static, HashMap<Uuid, ComparisonSession>>, String> {
    SESSIONS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .map_err(|_| "session registry is poisoned".to_string())
}

/// Run `op` against the session identified by the C string `id_ptr`.
unsafe fn with_session<T>(
    id_ptr: *const c_char,
    op: impl FnOnce(&mut ComparisonSession) -> Result<T, String>,
) -> Result<T, String> {
    let id = parse_uuid(&cstring_to_str(id_ptr)?, "session")?;
    let mut registry = sessions()?;
    let session = registry
        .get_mut(&id)
        .ok_or_else(|| format!("session not found: {id}"))?;
    op(session)
}

/// Parse compare options; null or `"{}"` selects the defaults.
unsafe fn read_config(options_json: *const c_char) -> Result<CompareConfig, String> {
    let config = match optional_cstring(options_json)? {
        Some(json) => deserialize_json::<CompareConfig>(&json, "options")?,
        None => CompareConfig::default(),
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a `TmResult` that was returned by any `tm_*` function.
///
/// Passing a null pointer is a no-op.
///
/// # Safety
///
/// `ptr` must be either null or a valid pointer that was previously returned
/// by one of the `tm_*` functions and has not yet been freed.
#[no_mangle]
pub unsafe extern "C" fn tm_free(ptr: *mut TmResult) {
    TmResult::free(ptr);
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a `tracing` fmt subscriber filtered by `filter` (an `EnvFilter`
/// directive string such as `"tm_merge=debug,info"`). A null `filter` uses
/// `"info"`.
///
/// Only the first call succeeds; later calls return a failure envelope.
///
/// # Safety
///
/// `filter` must be null or a valid, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn tm_init_logging(filter: *const c_char) -> *mut TmResult {
    let directives = match optional_cstring(filter) {
        Ok(s) => s.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        Err(e) => return TmResult::failure(&e),
    };

    let env_filter = match EnvFilter::try_new(&directives) {
        Ok(f) => f,
        Err(e) => return TmResult::failure(&format!("invalid log filter '{directives}': {e}")),
    };

    match tracing_subscriber::fmt().with_env_filter(env_filter).try_init() {
        Ok(()) => TmResult::success("{}"),
        Err(_) => TmResult::failure(
            "Logging already initialized; tm_init_logging may only be called once.",
        ),
    }
}

// ---------------------------------------------------------------------------
// Stateless operations
// ---------------------------------------------------------------------------

/// Compare two texts.
///
/// `left`, `right`: null-terminated UTF-8 texts; both must be non-blank.
/// `options_json`: `CompareConfig` JSON, `"{}"` or null for defaults.
///
/// Returns a `TmResult` whose `data` field is a `ComparisonResult` JSON
/// object on success.
///
/// The returned pointer must be freed with `tm_free`.
///
/// # Safety
///
/// `left` and `right` must be valid, non-null, null-terminated C strings;
/// `options_json` must be null or one.
#[no_mangle]
pub unsafe extern "C" fn tm_compare(
    left: *const c_char,
    right: *const c_char,
    options_json: *const c_char,
) -> *mut TmResult {
    let left = match cstring_to_str(left) {
        Ok(s) => s,
        Err(e) => return TmResult::failure(&e),
    };
    let right = match cstring_to_str(right) {
        Ok(s) => s,
        Err(e) => return TmResult::failure(&e),
    };
    let config = match read_config(options_json) {
        Ok(c) => c,
        Err(e) => return TmResult::failure(&e),
    };
    if let Err(e) = validate_inputs(&left, &right) {
        return TmResult::failure(&e.to_string());
    }

    let result = CompareEngine::new(config).compare(&left, &right);
    TmResult::from_outcome(to_json(&result))
}

/// Holistic word-set similarity of two texts.
///
/// No oracle is reachable across the C boundary, so this is always the
/// deterministic Jaccard fallback. `data` is `{"similarity": <f64>}`.
///
/// # Safety
///
/// Both pointer arguments must be valid, non-null, null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn tm_similarity(left: *const c_char, right: *const c_char) -> *mut TmResult {
    let left = match cstring_to_str(left) {
        Ok(s) => s,
        Err(e) => return TmResult::failure(&e),
    };
    let right = match cstring_to_str(right) {
        Ok(s) => s,
        Err(e) => return TmResult::failure(&e),
    };

    let similarity = semantic_similarity(None, &left, &right);
    TmResult::from_outcome(to_json(&serde_json::json!({ "similarity": similarity })))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Open a session and run its first comparison.
///
/// Returns the session JSON (including `id`) on success.
///
/// # Safety
///
/// `left` and `right` must be valid, non-null, null-terminated C strings;
/// `options_json` must be null or one.
#[no_mangle]
pub unsafe extern "C" fn tm_session_open(
    left: *const c_char,
    right: *const c_char,
    options_json: *const c_char,
) -> *mut TmResult {
    let outcome = (|| -> Result<String, String> {
        let left = cstring_to_str(left)?;
        let right = cstring_to_str(right)?;
        let config = read_config(options_json)?;

        let mut session = ComparisonSession::with_config(config);
        session.compare(&left, &right, None).map_err(|e| e.to_string())?;
        let json = to_json(&session)?;

        let id = session.id;
        sessions()?.insert(id, session);
        info!(session_id = %id, "session opened");
        Ok(json)
    })();
    TmResult::from_outcome(outcome)
}

/// Merge a selection into a session's result.
///
/// `selection_json`: e.g. `{"unit":"word","side":"left","index":4}`.
///
/// `data` is `{"outcome": MergeOutcome, "result": ComparisonResult}`. A stale
/// selection still succeeds, with a `skipped` outcome.
///
/// # Safety
///
/// Both pointer arguments must be valid, non-null, null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn tm_session_merge(
    session_id: *const c_char,
    selection_json: *const c_char,
) -> *mut TmResult {
    let selection: Selection = match cstring_to_str(selection_json)
        .and_then(|json| deserialize_json(&json, "selection"))
    {
        Ok(s) => s,
        Err(e) => return TmResult::failure(&e),
    };

    TmResult::from_outcome(with_session(session_id, |session| {
        let outcome = session.merge(&selection).map_err(|e| e.to_string())?;
        to_json(&serde_json::json!({
            "outcome": outcome,
            "result": session.result(),
        }))
    }))
}

/// Clear a session back to `EMPTY`. Returns the session JSON.
///
/// # Safety
///
/// `session_id` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn tm_session_clear(session_id: *const c_char) -> *mut TmResult {
    TmResult::from_outcome(with_session(session_id, |session| {
        session.clear().map_err(|e| e.to_string())?;
        to_json(&*session)
    }))
}

/// Fetch a session with its change explanations.
///
/// `data` is `{"session": ComparisonSession, "explanations": [...]}`.
///
/// # Safety
///
/// `session_id` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn tm_session_get(session_id: *const c_char) -> *mut TmResult {
    TmResult::from_outcome(with_session(session_id, |session| {
        to_json(&serde_json::json!({
            "session": session,
            "explanations": session.explanations(),
        }))
    }))
}

/// Drop a session from the registry.
///
/// # Safety
///
/// `session_id` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn tm_session_close(session_id: *const c_char) -> *mut TmResult {
    let outcome = (|| -> Result<String, String> {
        let id = parse_uuid(&cstring_to_str(session_id)?, "session")?;
        sessions()?
            .remove(&id)
            .ok_or_else(|| format!("session not found: {id}"))?;
        info!(session_id = %id, "session closed");
        to_json(&serde_json::json!({ "closed": id }))
    })();
    TmResult::from_outcome(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    const LEFT: &str = "Modern technology continues to transform the way humans interact with information and with one another.";
    const RIGHT: &str = "Modern technology keeps changing how people interact with information and each other.";

    fn to_cstr(s: &str) -> CString {
        CString::new(s).expect("CString::new")
    }

    /// Consume an envelope: `Ok(data JSON)` or `Err(error message)`.
    fn take(ptr: *mut TmResult) -> Result<serde_json::Value, String> {
        assert!(!ptr.is_null(), "FFI returned null");
        unsafe {
            let out = if (*ptr).ok {
                let data = CStr::from_ptr((*ptr).data).to_str().expect("utf-8");
                Ok(serde_json::from_str(data).expect("data is JSON"))
            } else {
                Err(CStr::from_ptr((*ptr).error).to_str().expect("utf-8").to_string())
            };
            tm_free(ptr);
            out
        }
    }

    fn open_session() -> String {
        let (l, r) = (to_cstr(LEFT), to_cstr(RIGHT));
        let session = take(unsafe { tm_session_open(l.as_ptr(), r.as_ptr(), std::ptr::null()) })
            .expect("open session");
        session["id"].as_str().expect("id").to_string()
    }

    #[test]
    fn tm_free_null_is_safe() {
        unsafe { tm_free(std::ptr::null_mut()) };
    }

    #[test]
    fn compare_returns_result_json() {
        let (l, r, opts) = (to_cstr(LEFT), to_cstr(RIGHT), to_cstr("{}"));
        let data =
            take(unsafe { tm_compare(l.as_ptr(), r.as_ptr(), opts.as_ptr()) }).expect("compare");
        assert_eq!(data["left_tokens"].as_array().expect("tokens").len(), 29);
        assert_eq!(data["removals"], 16);
        assert_eq!(data["additions"], 10);
    }

    #[test]
    fn compare_honours_options() {
        let (l, r) = (to_cstr(LEFT), to_cstr(RIGHT));
        let opts = to_cstr(r#"{"alignment":"content_lcs"}"#);
        let data =
            take(unsafe { tm_compare(l.as_ptr(), r.as_ptr(), opts.as_ptr()) }).expect("compare");
        assert_eq!(data["removals"], 15);
        assert_eq!(data["additions"], 9);
        let chunks = data["chunks"].as_array().expect("chunks");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1]["left_text"], serde_json::json!(["the", " ", "way", " ", "humans"]));
        assert_eq!(chunks[1]["right_text"], serde_json::json!(["how", " ", "people"]));
    }

    #[test]
    fn compare_rejects_blank_and_null_input() {
        let (blank, r) = (to_cstr("  "), to_cstr(RIGHT));
        let err =
            take(unsafe { tm_compare(blank.as_ptr(), r.as_ptr(), std::ptr::null()) }).unwrap_err();
        assert!(err.contains("left text is empty"), "{err}");

        let err = take(unsafe { tm_compare(std::ptr::null(), r.as_ptr(), std::ptr::null()) })
            .unwrap_err();
        assert_eq!(err, "received null pointer");
    }

    #[test]
    fn compare_rejects_bad_options() {
        let (l, r) = (to_cstr("a"), to_cstr("b"));
        let opts = to_cstr(r#"{"identical_threshold": 3.0}"#);
        let err = take(unsafe { tm_compare(l.as_ptr(), r.as_ptr(), opts.as_ptr()) }).unwrap_err();
        assert!(err.contains("identical_threshold"), "{err}");
    }

    #[test]
    fn similarity_is_word_set_jaccard() {
        let (l, r) = (to_cstr(LEFT), to_cstr(RIGHT));
        let data = take(unsafe { tm_similarity(l.as_ptr(), r.as_ptr()) }).expect("similarity");
        let score = data["similarity"].as_f64().expect("f64");
        assert!((score - 0.3).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn session_lifecycle() {
        let id = open_session();
        let id_c = to_cstr(&id);

        let selection = to_cstr(r#"{"unit":"word","side":"left","index":4}"#);
        let merged =
            take(unsafe { tm_session_merge(id_c.as_ptr(), selection.as_ptr()) }).expect("merge");
        assert_eq!(merged["outcome"]["status"], "applied");
        assert_eq!(merged["result"]["removals"], 15);

        let stale =
            take(unsafe { tm_session_merge(id_c.as_ptr(), selection.as_ptr()) }).expect("merge");
        assert_eq!(stale["outcome"]["status"], "skipped");
        assert_eq!(stale["outcome"]["reason"], "not_highlighted");

        let got = take(unsafe { tm_session_get(id_c.as_ptr()) }).expect("get");
        assert_eq!(got["session"]["events"].as_array().expect("events").len(), 3);
        assert!(got["explanations"].is_array());

        let cleared = take(unsafe { tm_session_clear(id_c.as_ptr()) }).expect("clear");
        assert_eq!(cleared["state"], "EMPTY");

        let err = take(unsafe { tm_session_merge(id_c.as_ptr(), selection.as_ptr()) }).unwrap_err();
        assert!(err.contains("not permitted"), "{err}");

        let closed = take(unsafe { tm_session_close(id_c.as_ptr()) }).expect("close");
        assert_eq!(closed["closed"], id.as_str());
        let err = take(unsafe { tm_session_get(id_c.as_ptr()) }).unwrap_err();
        assert!(err.starts_with("session not found"), "{err}");
    }

    #[test]
    fn session_calls_validate_arguments() {
        let bad_id = to_cstr("not-a-uuid");
        let err = take(unsafe { tm_session_get(bad_id.as_ptr()) }).unwrap_err();
        assert!(err.starts_with("invalid session UUID"), "{err}");

        let id = open_session();
        let id_c = to_cstr(&id);
        let bad_selection = to_cstr(r#"{"unit":"paragraph","side":"left","index":0}"#);
        let err = take(unsafe { tm_session_merge(id_c.as_ptr(), bad_selection.as_ptr()) })
            .unwrap_err();
        assert!(err.starts_with("failed to parse selection JSON"), "{err}");

        take(unsafe { tm_session_close(id_c.as_ptr()) }).expect("close");
        let err = take(unsafe { tm_session_close(id_c.as_ptr()) }).unwrap_err();
        assert!(err.starts_with("session not found"), "{err}");
    }

    #[test]
    fn logging_initializes_once() {
        let filter = to_cstr("tm_merge=debug,info");
        take(unsafe { tm_init_logging(filter.as_ptr()) }).expect("first init");
        let err = take(unsafe { tm_init_logging(std::ptr::null()) }).unwrap_err();
        assert!(err.contains("already initialized"), "{err}");
    }
}
