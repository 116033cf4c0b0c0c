mod format;

pub use crate::printf::format::{Chunk, DecimalFormat, FormatSpec, FormatString};

use core::convert::TryFrom;

use crate::variadic::VaList;

/// Renders `format` and `args` into `output`, C `vsnprintf` style.
///
/// At most `output.len() - 1` bytes of text are stored and the stored text is
/// always null-terminated. The return value is the length the complete output
/// requires, excluding the terminator, so a value `>= output.len()` means the
/// text was truncated and a larger buffer is needed. A negative value means
/// the required length cannot be represented in a C `int`.
pub fn vsnprintf(output: &mut [u8], format: &[u8], args: &mut VaList) -> i32 {
    let needed = FormatString::from(format).merge(output, args);
    i32::try_from(needed).unwrap_or(-1)
}
