/// Byte length of a null-terminated C string.
pub fn strlen(s: *const u8) -> usize {
    let mut len = 0;
    unsafe {
        while *s.add(len) != 0 {
            len += 1;
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::strlen;

    #[test]
    fn counts_bytes_up_to_the_terminator() {
        assert_eq!(strlen(b"howdy\0".as_ptr()), 5);
        assert_eq!(strlen(b"\0".as_ptr()), 0);
        assert_eq!(strlen(b"a\0b\0".as_ptr()), 1);
    }
}
