//! Cache-key fingerprints for source queries.
//!
//! A fingerprint is the hex BLAKE3 digest of the adapter name followed by every query
//! parameter. Each field is written as a tag byte and a little-endian length before its
//! bytes, so no parameter value can shift a field boundary. Absent parameters get their
//! own tag, so `("a", None)`, `(None, "a")` and `("a", "")` never collide.

use blake3::Hasher;

const PRESENT_TAG: u8 = b'S';
const ABSENT_TAG: u8 = b'N';

/// Computes the cache fingerprint for `adapter` queried with `params`.
pub fn fingerprint(adapter: &str, params: &[Option<&str>]) -> String {
    let mut hasher = Hasher::new();
    write_field(&mut hasher, adapter);

    for param in params {
        match param {
            Some(value) => write_field(&mut hasher, &normalize_param(value)),
            None => {
                hasher.update(&[ABSENT_TAG]);
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}

fn write_field(hasher: &mut Hasher, value: &str) {
    hasher.update(&[PRESENT_TAG]);
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Trims and collapses internal whitespace so cosmetic differences share one key.
fn normalize_param(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fingerprint_determinism() {
        let a = fingerprint("crossref_search", &[Some("Attention"), Some("Vaswani")]);
        let b = fingerprint("crossref_search", &[Some("Attention"), Some("Vaswani")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_is_hex_digest() {
        let fp = fingerprint("arxiv", &[Some("x")]);
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_adapter_sensitivity() {
        let params = [Some("Deep Residual Learning"), Some("He"), Some("2016")];
        let keys: HashSet<_> = ["crossref_search", "arxiv", "semantic_scholar"]
            .iter()
            .map(|adapter| fingerprint(adapter, &params))
            .collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_fingerprint_absent_vs_empty_vs_shifted() {
        let absent = fingerprint("s", &[Some("a"), None]);
        let shifted = fingerprint("s", &[None, Some("a")]);
        let empty = fingerprint("s", &[Some("a"), Some("")]);
        assert_ne!(absent, shifted);
        assert_ne!(absent, empty);
    }

    #[test]
    fn test_fingerprint_separator_prevents_ambiguity() {
        let a = fingerprint("s", &[Some("ab"), Some("c")]);
        let b = fingerprint("s", &[Some("a"), Some("bc")]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_pipe_inside_value_keeps_fields_apart() {
        let a = fingerprint("s", &[Some("a|b"), Some("c")]);
        let b = fingerprint("s", &[Some("a"), Some("b|c")]);
        assert_ne!(a, b);

        let adapter_shift = fingerprint("s|a", &[Some("b")]);
        let param_shift = fingerprint("s", &[Some("a|b")]);
        assert_ne!(adapter_shift, param_shift);
    }

    #[test]
    fn test_fingerprint_whitespace_normalization() {
        let a = fingerprint("s", &[Some("  Attention   is all\tyou need ")]);
        let b = fingerprint("s", &[Some("Attention is all you need")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_case_sensitive() {
        let a = fingerprint("s", &[Some("Attention")]);
        let b = fingerprint("s", &[Some("attention")]);
        assert_ne!(a, b);
    }
}
