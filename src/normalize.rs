//! Answer canonicalization for case/punctuation/whitespace-insensitive
//! comparison.
//!
//! Applied identically to the stored answer and the submitted answer before
//! equality comparison. Total: never fails, empty input yields an empty key.

/// Produce the canonical comparison key for an answer.
///
/// Every character that is not an ASCII letter, digit, space, or period is
/// replaced by a space, runs of whitespace collapse to a single space, the
/// result is trimmed and lower-cased.
pub fn normalize(raw: &str) -> String {
    let scrubbed: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == ' ' || c == '.' {
                c
            } else {
                ' '
            }
        })
        .collect();

    scrubbed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Compare a submitted answer against the stored one under normalization.
pub fn answers_match(submitted: &str, stored: &str) -> bool {
    normalize(submitted) == normalize(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(normalize("Madrid!!"), "madrid");
        assert_eq!(normalize("¿Madrid?"), "madrid");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  la   Paz  "), "la paz");
        assert_eq!(normalize("la\t\tpaz"), "la paz");
    }

    #[test]
    fn test_keeps_digits_and_periods() {
        assert_eq!(normalize("3.14"), "3.14");
        assert_eq!(normalize("Rust 1.0"), "rust 1.0");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["Madrid!!", " MADRID ", "la   paz", "", "3,14", "a-b_c"] {
            assert_eq!(normalize(&normalize(raw)), normalize(raw));
        }
    }

    #[test]
    fn test_equates_variants() {
        let key = normalize("madrid");
        assert_eq!(normalize("Madrid!!"), key);
        assert_eq!(normalize(" MADRID "), key);
    }

    #[test]
    fn test_empty_never_matches_nonempty() {
        assert_eq!(normalize(""), "");
        assert!(!answers_match("", "madrid"));
        assert!(answers_match("", "!!!"));
    }
}
