//! FFI (Foreign Function Interface) layer for C integration
//!
//! This module exposes the conversion engine to C callers through four
//! functions: `md_html_converter_new`, `md_html_convert`,
//! `md_html_result_free` and `md_html_converter_free`.
//!
//! # FFI Boundary Contract
//!
//! ## String Representation
//!
//! **All strings use UTF-8 bytes + length (NOT NUL-terminated C strings)**
//!
//! Every string field is a pointer field (`*const u8` in, `*mut u8` out) and a
//! `usize` length field with a `_len` suffix holding the exact byte count. C
//! code must use the length field and never call `strlen()` on these pointers.
//!
//! ## Memory Management
//!
//! - Rust allocates all output memory as `Box<[u8]>`
//! - C must call `md_html_result_free()` exactly once per populated result
//! - After freeing, all pointers in the result are NULL and lengths are 0
//!
//! ```rust
//! use markdown_html_converter::ffi::{
//!     md_html_convert, md_html_converter_free, md_html_converter_new,
//!     md_html_result_free, MdHtmlOptions, MdHtmlResult,
//! };
//!
//! let handle = md_html_converter_new();
//! let source = b"# Hello";
//! let options = MdHtmlOptions::default();
//! let mut result = MdHtmlResult::default();
//!
//! unsafe {
//!     md_html_convert(handle, source.as_ptr(), source.len(), &options, &mut result);
//! }
//! assert_eq!(result.error_code, 0);
//! let html = unsafe { std::slice::from_raw_parts(result.html, result.html_len) };
//! assert_eq!(html, b"<h1>Hello</h1>");
//!
//! unsafe {
//!     md_html_result_free(&mut result);
//!     md_html_converter_free(handle);
//! }
//! assert!(result.html.is_null());
//! ```
//!
//! ## Error Handling Contract
//!
//! - Success: `error_code = 0`, `error_message = NULL`, `html` holds the
//!   fragment (NULL with `html_len = 0` for an empty fragment)
//! - Error: `error_code != 0`, `error_message` holds a UTF-8 description,
//!   `html` is NULL
//! - Panics are caught with `catch_unwind` and reported as `ERROR_INTERNAL`
//!
//! ## Thread Safety
//!
//! A converter handle holds only immutable options. One handle may be used
//! from several threads at once as long as each call has its own result.

use std::panic;
use std::ptr;
use std::slice;

use crate::converter::{ConversionOptions, HtmlConverter};
use crate::error::ConversionError;

// ============================================================================
// Error Code Constants
// ============================================================================

/// Success - no error occurred
pub const ERROR_SUCCESS: u32 = 0;

/// Character encoding error (invalid bytes, unsupported charset label)
pub const ERROR_ENCODING: u32 = 2;

/// Invalid input data (NULL pointers, invalid parameters)
pub const ERROR_INVALID_INPUT: u32 = 5;

/// A placeholder token named a span that was never registered
pub const ERROR_UNKNOWN_PLACEHOLDER: u32 = 6;

/// A registered placeholder token was lost before restoration
pub const ERROR_ORPHANED_PLACEHOLDER: u32 = 7;

/// Internal error (unexpected condition, panic caught)
pub const ERROR_INTERNAL: u32 = 99;

// ============================================================================
// FFI Data Structures
// ============================================================================

/// Conversion options passed from C to Rust
///
/// # Field Descriptions
///
/// - `heading_ids`: 0 = plain headers, 1 = headers carry a slug `id`
/// - `charset`: optional charset label for the source bytes (e.g.
///   `"windows-1252"`); NULL means UTF-8. A byte order mark always wins.
/// - `charset_len`: byte length of `charset`, 0 when NULL
///
/// # Example Usage (C)
///
/// ```c
/// const char *label = "windows-1252";
/// md_html_options_t options = {
///     .heading_ids = 1,
///     .charset = (const uint8_t*)label,
///     .charset_len = strlen(label)
/// };
/// ```
#[repr(C)]
pub struct MdHtmlOptions {
    /// Emit header ids: 0=no, 1=yes
    pub heading_ids: u8,
    /// Charset label (UTF-8 bytes, can be NULL)
    pub charset: *const u8,
    /// Length of charset in bytes (0 if NULL)
    pub charset_len: usize,
}

impl Default for MdHtmlOptions {
    fn default() -> Self {
        Self {
            heading_ids: 0,
            charset: ptr::null(),
            charset_len: 0,
        }
    }
}

/// Conversion result returned from Rust to C
///
/// # State Invariants
///
/// **Success (error_code == 0):**
/// - `html` points to `html_len` bytes of UTF-8, or is NULL when the fragment
///   is empty
/// - `error_message` is NULL and `error_len` is 0
///
/// **Error (error_code != 0):**
/// - `html` is NULL and `html_len` is 0
/// - `error_message` points to `error_len` bytes of UTF-8
///
/// # Example Usage (C)
///
/// ```c
/// md_html_result_t result;
/// md_html_convert(converter, source, source_len, &options, &result);
///
/// if (result.error_code == 0) {
///     fwrite(result.html, 1, result.html_len, stdout);
/// } else {
///     log_error(result.error_code, result.error_message, result.error_len);
/// }
///
/// md_html_result_free(&result);
/// ```
#[repr(C)]
pub struct MdHtmlResult {
    /// Output HTML (UTF-8 bytes, NOT NUL-terminated)
    pub html: *mut u8,
    /// Length of html in bytes
    pub html_len: usize,
    /// Error code: 0=success, non-zero=error (see ERROR_* constants)
    pub error_code: u32,
    /// Error message (UTF-8 bytes, NULL on success)
    pub error_message: *mut u8,
    /// Length of error message in bytes
    pub error_len: usize,
}

impl Default for MdHtmlResult {
    fn default() -> Self {
        Self {
            html: ptr::null_mut(),
            html_len: 0,
            error_code: ERROR_SUCCESS,
            error_message: ptr::null_mut(),
            error_len: 0,
        }
    }
}

/// Opaque handle to a Rust converter instance
///
/// # Lifecycle
///
/// 1. Create: `md_html_converter_new()` returns a handle
/// 2. Use: pass the handle to `md_html_convert()` any number of times
/// 3. Destroy: `md_html_converter_free()` deallocates the handle
pub struct MdHtmlConverterHandle {
    base_options: ConversionOptions,
}

fn reset_result(result: &mut MdHtmlResult) {
    *result = MdHtmlResult::default();
}

fn set_error_result(result: &mut MdHtmlResult, error_code: u32, error_message: String) {
    let error_bytes = error_message.into_bytes().into_boxed_slice();
    result.html = ptr::null_mut();
    result.html_len = 0;
    result.error_code = error_code;
    result.error_len = error_bytes.len();
    result.error_message = Box::into_raw(error_bytes) as *mut u8;
}

fn set_success_result(result: &mut MdHtmlResult, html: String) {
    result.error_code = ERROR_SUCCESS;
    result.error_message = ptr::null_mut();
    result.error_len = 0;
    if html.is_empty() {
        result.html = ptr::null_mut();
        result.html_len = 0;
        return;
    }
    let bytes = html.into_bytes().into_boxed_slice();
    result.html_len = bytes.len();
    result.html = Box::into_raw(bytes) as *mut u8;
}

fn required_ref<'a, T>(ptr: *const T, name: &str) -> Result<&'a T, ConversionError> {
    if ptr.is_null() {
        return Err(ConversionError::InvalidInput(format!("{name} pointer is NULL")));
    }

    // SAFETY: Caller provided a non-NULL pointer and accepts the FFI contract
    // that it points to a valid, properly aligned value.
    Ok(unsafe { &*ptr })
}

fn required_bytes<'a>(ptr: *const u8, len: usize, name: &str) -> Result<&'a [u8], ConversionError> {
    if len == 0 {
        return Ok(&[]);
    }

    if ptr.is_null() {
        return Err(ConversionError::InvalidInput(format!(
            "{name}_len > 0 with NULL {name} pointer"
        )));
    }

    // SAFETY: Pointer was validated as non-NULL above; caller guarantees `len`
    // bytes are valid and readable for the duration of this call.
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

fn charset_label(options: &MdHtmlOptions) -> Result<Option<&str>, ConversionError> {
    let bytes = required_bytes(options.charset, options.charset_len, "charset")?;
    if bytes.is_empty() {
        return Ok(None);
    }
    std::str::from_utf8(bytes)
        .map(Some)
        .map_err(|_| ConversionError::InvalidInput("charset label is not UTF-8".to_string()))
}

fn convert_inner(
    handle: &MdHtmlConverterHandle,
    source: &[u8],
    options: &MdHtmlOptions,
) -> Result<String, ConversionError> {
    let charset = charset_label(options)?;
    if source.is_empty() {
        return Ok(String::new());
    }

    let converter = HtmlConverter::with_options(ConversionOptions {
        heading_ids: options.heading_ids != 0,
        ..handle.base_options.clone()
    });
    converter
        .convert_bytes(source, charset)
        .map(|conversion| conversion.html)
}

fn free_buffer(ptr_field: &mut *mut u8, len_field: &mut usize) {
    if (*ptr_field).is_null() {
        return;
    }

    let raw = ptr::slice_from_raw_parts_mut(*ptr_field, *len_field);
    // SAFETY: `raw` was allocated by `Box<[u8]>` via `Box::into_raw`.
    let _ = unsafe { Box::from_raw(raw) };
    *ptr_field = ptr::null_mut();
    *len_field = 0;
}

// ============================================================================
// FFI Functions
// ============================================================================

/// Create a new converter instance
///
/// # Returns
///
/// - Non-NULL pointer to `MdHtmlConverterHandle` on success
/// - NULL if initialization panicked
///
/// The handle must be freed with `md_html_converter_free()`.
#[unsafe(no_mangle)]
pub extern "C" fn md_html_converter_new() -> *mut MdHtmlConverterHandle {
    let result = panic::catch_unwind(|| {
        let handle = MdHtmlConverterHandle {
            base_options: ConversionOptions::default(),
        };
        Box::into_raw(Box::new(handle))
    });

    result.unwrap_or(ptr::null_mut())
}

/// Convert markdown bytes to an HTML fragment
///
/// # Parameters
///
/// - `handle`: converter from `md_html_converter_new()`, non-NULL
/// - `source`: markdown bytes; may be NULL only when `source_len == 0`
/// - `source_len`: byte length of `source`
/// - `options`: conversion options, non-NULL
/// - `result`: result to populate, non-NULL; previous contents are overwritten
///   without being freed
///
/// # Error Codes
///
/// - `ERROR_INVALID_INPUT` (5): NULL pointer or invalid parameter
/// - `ERROR_ENCODING` (2): source bytes cannot be decoded
/// - `ERROR_UNKNOWN_PLACEHOLDER` (6), `ERROR_ORPHANED_PLACEHOLDER` (7):
///   placeholder invariant violated
/// - `ERROR_INTERNAL` (99): internal error or panic caught
///
/// # Safety
///
/// - NULL pointers are rejected with `ERROR_INVALID_INPUT`; a NULL `result`
///   makes the call a no-op
/// - Non-NULL pointers must be valid for the stated lengths
/// - The result must be released with `md_html_result_free()`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn md_html_convert(
    handle: *const MdHtmlConverterHandle,
    source: *const u8,
    source_len: usize,
    options: *const MdHtmlOptions,
    result: *mut MdHtmlResult,
) {
    if result.is_null() {
        return;
    }

    // SAFETY: `result` was validated as non-NULL above.
    let result_ref = unsafe { &mut *result };
    reset_result(result_ref);

    let panic_result = panic::catch_unwind(|| -> Result<String, ConversionError> {
        let handle_ref = required_ref(handle, "Converter handle")?;
        let options_ref = required_ref(options, "Options")?;
        let source_slice = required_bytes(source, source_len, "source")?;
        convert_inner(handle_ref, source_slice, options_ref)
    });

    match panic_result {
        Ok(Ok(html)) => set_success_result(result_ref, html),
        Ok(Err(e)) => {
            log::warn!("conversion failed at the C boundary: {}", e);
            set_error_result(result_ref, e.code(), e.to_string());
        }
        Err(_) => {
            set_error_result(
                result_ref,
                ERROR_INTERNAL,
                "Internal panic during conversion".to_string(),
            );
        }
    }
}

/// Free memory owned by a conversion result
///
/// Frees `html` and `error_message`, sets pointers to NULL and lengths to 0.
/// Calling it again on the same result is a no-op.
///
/// # Safety
///
/// - NULL `result` is a no-op
/// - The result must have been populated by `md_html_convert()`
/// - Never call C `free()` on result pointers
#[unsafe(no_mangle)]
pub unsafe extern "C" fn md_html_result_free(result: *mut MdHtmlResult) {
    if result.is_null() {
        return;
    }

    // SAFETY: `result` was validated as non-NULL above.
    let result_ref = unsafe { &mut *result };
    free_buffer(&mut result_ref.html, &mut result_ref.html_len);
    free_buffer(&mut result_ref.error_message, &mut result_ref.error_len);
    result_ref.error_code = ERROR_SUCCESS;
}

/// Destroy a converter instance
///
/// # Safety
///
/// - NULL `handle` is a no-op
/// - The handle must come from `md_html_converter_new()` and must not be used
///   afterwards
#[unsafe(no_mangle)]
pub unsafe extern "C" fn md_html_converter_free(handle: *mut MdHtmlConverterHandle) {
    if handle.is_null() {
        return;
    }

    // SAFETY: `handle` is non-NULL and was created by `Box::into_raw` in
    // `md_html_converter_new`.
    unsafe { drop(Box::from_raw(handle)) };
}
