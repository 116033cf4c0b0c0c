//! Growable-buffer formatting of C variadic log messages.
//!
//! A C logging callback hands over a `printf`-style format string and a
//! `va_list`; [`log_to_string`] renders them into a heap-allocated,
//! null-terminated string without the caller having to guess an output size
//! up front. The buffer starts at 256 bytes and is regrown until the rendered
//! text fits, then ownership passes to the caller, who releases it with
//! [`log_to_string_free`].
//!
//! Rust callers can use [`format_va`] instead, which returns an owned
//! [`FormattedString`] that releases itself on drop.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod atoi;
pub mod buffer;
pub mod printf;
pub mod strlen;
pub mod variadic;

#[cfg(test)]
pub(crate) mod testing;

use core::ffi::c_char;
use core::ptr;
use core::slice::from_raw_parts;

pub use crate::buffer::{format_va, FormattedString, OutOfMemory};
use crate::strlen::strlen;
use crate::variadic::va_list;

/// C entry point: `char *log_to_string(const char *fmt, va_list vargs)`.
///
/// Renders `fmt` and `vargs` into a heap-allocated, null-terminated string.
/// Returns a null pointer when `fmt` is null or an allocation fails; no
/// partially formatted buffer is ever returned. `vargs` itself is never
/// consumed, every rendering attempt works on a fresh copy of the cursor.
///
/// Release the result with [`log_to_string_free`].
///
/// # Safety
/// `fmt` must be null or point to a null-terminated string, and the argument
/// block behind `vargs` must match the format directives in type and count.
#[no_mangle]
pub unsafe extern "C" fn log_to_string(fmt: *const c_char, vargs: va_list) -> *mut c_char {
    if fmt.is_null() {
        return ptr::null_mut();
    }
    let format = from_raw_parts(fmt as *const u8, strlen(fmt as *const u8));
    match format_va(format, vargs) {
        Ok(formatted) => formatted.into_raw(),
        Err(OutOfMemory) => ptr::null_mut(),
    }
}

/// Releases a string returned by [`log_to_string`]. A null pointer is a
/// no-op.
///
/// # Safety
/// `buffer` must be null or a pointer obtained from [`log_to_string`] (or
/// [`FormattedString::into_raw`]) that has not been released already.
#[no_mangle]
pub unsafe extern "C" fn log_to_string_free(buffer: *mut c_char) {
    if !buffer.is_null() {
        drop(FormattedString::from_raw(buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ArgBlock;
    use std::ffi::CStr;

    #[test]
    fn c_entry_points_round_trip() {
        let mut args = ArgBlock::new();
        args.push_i32(7);
        let fmt = b"port %d\0";

        let out = unsafe { log_to_string(fmt.as_ptr() as *const c_char, args.list()) };
        assert!(!out.is_null());
        assert_eq!(unsafe { CStr::from_ptr(out) }.to_bytes(), b"port 7");
        unsafe { log_to_string_free(out) };
    }

    #[test]
    fn null_format_yields_null() {
        let args = ArgBlock::new();
        let out = unsafe { log_to_string(ptr::null(), args.list()) };
        assert!(out.is_null());
    }

    #[test]
    fn freeing_null_is_a_no_op() {
        unsafe { log_to_string_free(ptr::null_mut()) };
    }
}
