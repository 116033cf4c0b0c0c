//! Helpers for assembling fake variadic argument blocks in tests.

use core::ffi::c_void;

use crate::variadic::va_list;

/// A packed argument block laid out the way [`VaList`](crate::variadic::VaList)
/// walks it: every value padded out to a whole promotion slot.
pub(crate) struct ArgBlock {
    data: Vec<u8>,
}

impl ArgBlock {
    pub fn new() -> ArgBlock {
        ArgBlock { data: Vec::new() }
    }

    pub fn push_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_ne_bytes());
    }

    pub fn push_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_ne_bytes());
    }

    pub fn push_f64(&mut self, value: f64) {
        self.data.extend_from_slice(&value.to_ne_bytes());
    }

    /// The pointed-at bytes must stay alive, and null-terminated for `%s`,
    /// for as long as the block is consumed.
    pub fn push_ptr(&mut self, value: *const u8) {
        self.data.extend_from_slice(&(value as usize).to_ne_bytes());
    }

    /// A `va_list` positioned at the start of the block. The block must
    /// outlive every cursor built from the list.
    pub fn list(&self) -> va_list {
        va_list {
            __ap: self.data.as_ptr() as *mut c_void,
        }
    }
}
