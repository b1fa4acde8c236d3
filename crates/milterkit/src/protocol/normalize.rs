//! Line-ending normalization for outbound text.

use std::borrow::Cow;

/// Collapses CRLF line endings to bare LF.
///
/// MTAs such as postfix expect LF-terminated lines on this side of the
/// protocol; forwarding CRLF verbatim produces doubled carriage returns in
/// the delivered message. A run of CRs immediately preceding an LF collapses
/// with it, so the result never contains a CRLF pair and normalizing an
/// already-normalized buffer is a no-op. Lone CRs and LFs pass through
/// unchanged.
#[must_use]
pub fn normalize_crlf(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.windows(2).any(|w| w == b"\r\n") {
        return Cow::Borrowed(input);
    }

    let mut out = Vec::with_capacity(input.len());
    let mut pending_cr = 0usize;
    for &byte in input {
        match byte {
            b'\r' => pending_cr += 1,
            b'\n' => {
                pending_cr = 0;
                out.push(b'\n');
            }
            _ => {
                out.extend(std::iter::repeat_n(b'\r', pending_cr));
                pending_cr = 0;
                out.push(byte);
            }
        }
    }
    out.extend(std::iter::repeat_n(b'\r', pending_cr));
    Cow::Owned(out)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_crlf_collapsed() {
        assert_eq!(normalize_crlf(b"a\r\nb\r\n").as_ref(), b"a\nb\n");
    }

    #[test]
    fn test_untouched_input_is_borrowed() {
        assert!(matches!(normalize_crlf(b"a\nb"), Cow::Borrowed(_)));
        assert!(matches!(normalize_crlf(b""), Cow::Borrowed(_)));
    }

    #[test]
    fn test_lone_lf_preserved() {
        assert_eq!(normalize_crlf(b"a\nb").as_ref(), b"a\nb");
    }

    #[test]
    fn test_lone_cr_preserved() {
        assert_eq!(normalize_crlf(b"a\rb\r\n").as_ref(), b"a\rb\n");
        assert_eq!(normalize_crlf(b"trailing\rx").as_ref(), b"trailing\rx");
    }

    #[test]
    fn test_cr_run_before_lf_collapses() {
        // One pass must reach the fixpoint; a naive single replace would
        // leave "\r\n" behind here.
        assert_eq!(normalize_crlf(b"\r\r\n").as_ref(), b"\n");
        assert_eq!(normalize_crlf(b"a\r\r\r\nb").as_ref(), b"a\nb");
    }

    #[test]
    fn test_idempotent_example() {
        let once = normalize_crlf(b"x\r\r\ny\r\nz").into_owned();
        let twice = normalize_crlf(&once).into_owned();
        assert_eq!(once, twice);
    }

    proptest! {
        #[test]
        fn prop_idempotent(input in proptest::collection::vec(any::<u8>(), 0..256)) {
            let once = normalize_crlf(&input).into_owned();
            let twice = normalize_crlf(&once).into_owned();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_no_crlf_in_output(input in proptest::collection::vec(any::<u8>(), 0..256)) {
            let out = normalize_crlf(&input).into_owned();
            prop_assert!(!out.windows(2).any(|w| w == b"\r\n"));
        }

        #[test]
        fn prop_non_line_bytes_preserved(input in proptest::collection::vec(any::<u8>(), 0..256)) {
            let out = normalize_crlf(&input).into_owned();
            let expect: Vec<u8> = input.iter().copied().filter(|&b| b != b'\r' && b != b'\n').collect();
            let got: Vec<u8> = out.iter().copied().filter(|&b| b != b'\r' && b != b'\n').collect();
            prop_assert_eq!(expect, got);
        }
    }
}
