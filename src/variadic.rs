#![allow(non_camel_case_types)]

use core::ffi::c_void;
use core::mem::size_of;

pub type va_list = __builtin_va_list;
pub type __gnuc_va_list = __builtin_va_list;
pub type __builtin_va_list = __va_list;

/// The C `va_list`: a handle on the caller's packed argument block.
///
/// The value is `Copy`; building a [`VaList`] from it is the `va_copy`
/// equivalent and leaves the original handle untouched, so the same list can
/// be walked any number of times.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct __va_list {
    pub __ap: *mut c_void,
}

/// Reads successive arguments out of a `va_list`.
pub struct VaList {
    ap: *mut c_void,
}

impl VaList {
    pub fn va_arg<E>(&mut self) -> E {
        unsafe {
            // The block carries no alignment guarantee.
            let arg = self.ap.cast::<E>().read_unaligned();
            self.ap = self.ap.add(Self::va_argsiz::<E>());
            arg
        }
    }

    // Every argument occupies a whole promotion slot, whatever its own size.
    fn va_argsiz<E>() -> usize {
        (size_of::<E>() + size_of::<u32>() - 1) / size_of::<u32>() * size_of::<u32>()
    }
}

impl From<__va_list> for VaList {
    fn from(va_list: __va_list) -> Self {
        VaList { ap: va_list.__ap }
    }
}

#[cfg(test)]
mod tests {
    use super::VaList;
    use crate::testing::ArgBlock;

    #[test]
    fn walks_mixed_width_arguments_in_order() {
        let mut args = ArgBlock::new();
        args.push_i32(-5);
        args.push_f64(2.5);
        args.push_u32(9);

        let mut cursor = VaList::from(args.list());
        assert_eq!(cursor.va_arg::<i32>(), -5);
        assert_eq!(cursor.va_arg::<f64>(), 2.5);
        assert_eq!(cursor.va_arg::<u32>(), 9);
    }

    #[test]
    fn copies_restart_from_the_beginning() {
        let mut args = ArgBlock::new();
        args.push_i32(1);

        let list = args.list();
        let mut first = VaList::from(list);
        assert_eq!(first.va_arg::<i32>(), 1);

        // the original handle was not advanced
        let mut second = VaList::from(list);
        assert_eq!(second.va_arg::<i32>(), 1);
    }
}
