/// Parses an unsigned decimal number out of raw bytes.
///
/// Returns `None` on an empty slice, a non-digit byte, or overflow.
pub fn atoi_usize(s: &[u8]) -> Option<usize> {
    if s.is_empty() {
        return None;
    }

    let mut value: usize = 0;
    for b in s {
        if !(b'0'..=b'9').contains(b) {
            return None;
        }
        value = value.checked_mul(10)?.checked_add((b - b'0') as usize)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::atoi_usize;

    #[test]
    fn parses_plain_digits() {
        assert_eq!(atoi_usize(b"0"), Some(0));
        assert_eq!(atoi_usize(b"32"), Some(32));
        assert_eq!(atoi_usize(b"1024"), Some(1024));
    }

    #[test]
    fn rejects_empty_and_non_digit_input() {
        assert_eq!(atoi_usize(b""), None);
        assert_eq!(atoi_usize(b"-3"), None);
        assert_eq!(atoi_usize(b"1x"), None);
    }
}
