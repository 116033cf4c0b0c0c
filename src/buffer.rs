//! The growth loop: render, learn the required size, regrow, retry.

use core::ffi::c_char;
use core::fmt;
use core::mem::{align_of, forget, size_of};
use core::ptr::{self, NonNull};
use core::slice::{from_raw_parts, from_raw_parts_mut};

use alloc::alloc::{alloc, dealloc, realloc, Layout};

use crate::printf::vsnprintf;
use crate::strlen::strlen;
use crate::variadic::{va_list, VaList};

/// First capacity tried before any growth.
const INITIAL_CAPACITY: usize = 256;

/// Bytes reserved ahead of the text to remember the block's capacity, so the
/// bare text pointer handed to C is enough to release the block later.
const HEADER: usize = size_of::<usize>();

/// Formatting failed because a heap allocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory;

impl fmt::Display for OutOfMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("out of memory")
    }
}

/// Malloc-style allocation seam. Sizes are in bytes; every call passes the
/// size the block was created with.
pub(crate) trait RawAllocator {
    fn alloc(&self, size: usize) -> *mut u8;
    fn realloc(&self, ptr: *mut u8, old_size: usize, new_size: usize) -> *mut u8;
    unsafe fn dealloc(&self, ptr: *mut u8, size: usize);
}

/// The global heap.
pub(crate) struct Heap;

fn layout(size: usize) -> Option<Layout> {
    Layout::from_size_align(size, align_of::<usize>()).ok()
}

impl RawAllocator for Heap {
    fn alloc(&self, size: usize) -> *mut u8 {
        match layout(size) {
            Some(layout) => unsafe { alloc(layout) },
            None => ptr::null_mut(),
        }
    }

    fn realloc(&self, ptr: *mut u8, old_size: usize, new_size: usize) -> *mut u8 {
        match (layout(old_size), layout(new_size)) {
            (Some(old), Some(_)) => unsafe { realloc(ptr, old, new_size) },
            // an unrepresentable size fails like any other allocation,
            // leaving the old block to the caller
            _ => ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, size: usize) {
        if let Some(layout) = layout(size) {
            dealloc(ptr, layout);
        }
    }
}

/// What to do after a rendering attempt into `capacity` bytes reported
/// `reported`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Growth {
    /// The text, terminator included, fit.
    Done,
    /// Retry with this capacity.
    Grow(usize),
}

pub(crate) fn next_capacity(reported: i32, capacity: usize) -> Growth {
    if reported >= 0 {
        let needed = reported as usize;
        if needed < capacity {
            Growth::Done
        } else {
            // the renderer told us the exact length, grow to just that plus
            // the terminator
            Growth::Grow(needed + 1)
        }
    } else {
        // no length to go on, double and retry
        Growth::Grow(capacity.saturating_mul(2))
    }
}

/// Renders `format` and `args` into a freshly allocated block, growing it
/// until the whole output fits. Returns the text pointer (the capacity header
/// sits just ahead of it), or null when any allocation fails; on that path
/// the previously held block has already been released.
///
/// Each attempt consumes a fresh copy of the argument cursor, so `args` is
/// left untouched for the caller.
pub(crate) fn format_raw<A: RawAllocator>(heap: &A, format: &[u8], args: va_list) -> *mut c_char {
    let mut capacity = INITIAL_CAPACITY;
    let mut block = heap.alloc(HEADER + capacity);
    if block.is_null() {
        return ptr::null_mut();
    }

    loop {
        let text = unsafe { from_raw_parts_mut(block.add(HEADER), capacity) };
        let mut cursor = VaList::from(args);
        let reported = vsnprintf(text, format, &mut cursor);

        let grown = match next_capacity(reported, capacity) {
            Growth::Done => break,
            Growth::Grow(next) => next,
        };

        let old_size = HEADER + capacity;
        let new_size = match HEADER.checked_add(grown) {
            Some(size) => size,
            None => {
                unsafe { heap.dealloc(block, old_size) };
                return ptr::null_mut();
            }
        };
        let regrown = heap.realloc(block, old_size, new_size);
        if regrown.is_null() {
            unsafe { heap.dealloc(block, old_size) };
            return ptr::null_mut();
        }
        block = regrown;
        capacity = grown;
    }

    unsafe {
        (block as *mut usize).write(capacity);
        block.add(HEADER) as *mut c_char
    }
}

/// Releases a block produced by [`format_raw`]. Null is a no-op.
pub(crate) unsafe fn release_raw<A: RawAllocator>(heap: &A, buffer: *mut c_char) {
    if buffer.is_null() {
        return;
    }
    let block = (buffer as *mut u8).sub(HEADER);
    let capacity = (block as *const usize).read();
    heap.dealloc(block, HEADER + capacity);
}

/// Formats `format` and `args` into an owned string, growing from a 256-byte
/// buffer until the output fits. `args` is not consumed; every rendering
/// attempt works on a fresh copy of the cursor.
pub fn format_va(format: &[u8], args: va_list) -> Result<FormattedString, OutOfMemory> {
    match NonNull::new(format_raw(&Heap, format, args)) {
        Some(ptr) => Ok(FormattedString { ptr }),
        None => Err(OutOfMemory),
    }
}

/// An owned, null-terminated formatted string.
///
/// The text is preceded in memory by a capacity header, so the bare text
/// pointer from [`FormattedString::into_raw`] can be released on its own,
/// either through [`log_to_string_free`](crate::log_to_string_free) or by
/// rebuilding the owner with [`FormattedString::from_raw`].
pub struct FormattedString {
    ptr: NonNull<c_char>,
}

impl FormattedString {
    /// Rebuilds ownership over a pointer from [`FormattedString::into_raw`].
    ///
    /// # Safety
    /// `ptr` must come from `into_raw` or [`log_to_string`](crate::log_to_string)
    /// and must not be used again afterwards.
    pub unsafe fn from_raw(ptr: *mut c_char) -> FormattedString {
        FormattedString {
            ptr: NonNull::new_unchecked(ptr),
        }
    }

    /// Hands the text pointer to the caller, who becomes responsible for
    /// releasing it.
    pub fn into_raw(self) -> *mut c_char {
        let ptr = self.ptr.as_ptr();
        forget(self);
        ptr
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.ptr.as_ptr()
    }

    /// The formatted text, terminator excluded.
    pub fn as_bytes(&self) -> &[u8] {
        let ptr = self.ptr.as_ptr() as *const u8;
        unsafe { from_raw_parts(ptr, strlen(ptr)) }
    }

    /// Bytes available in the underlying block, terminator included. Growth
    /// never shrinks back, so this can exceed the text length plus one.
    pub fn capacity(&self) -> usize {
        unsafe { ((self.ptr.as_ptr() as *const u8).sub(HEADER) as *const usize).read() }
    }
}

impl Drop for FormattedString {
    fn drop(&mut self) {
        unsafe { release_raw(&Heap, self.ptr.as_ptr()) };
    }
}

impl fmt::Debug for FormattedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormattedString")
            .field("len", &self.as_bytes().len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
