//! SHA-1 handshake signature.

use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

/// Compute the signature the platform sends for a handshake.
///
/// The timestamp, nonce and shared token are sorted lexicographically,
/// concatenated with no separator and hashed; the result is lowercase hex.
pub fn reference_signature(timestamp: &str, nonce: &str, token: &str) -> String {
    let mut parts = [timestamp, nonce, token];
    parts.sort_unstable();

    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Compare a computed signature with the one supplied by the caller.
pub fn signatures_match(expected: &str, supplied: &str) -> bool {
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signature() {
        // sha1("12abc")
        assert_eq!(
            reference_signature("1", "2", "abc"),
            "2809f5614d4b6b0c4e1bb4c3f67ef361c7ef7281"
        );
    }

    #[test]
    fn test_signature_is_order_independent() {
        let expected = reference_signature("1414587457", "nonce123", "abc");
        assert_eq!(expected, "954cee95204afdc1807880c8f989532e4c14078d");
        assert_eq!(reference_signature("nonce123", "abc", "1414587457"), expected);
        assert_eq!(reference_signature("abc", "1414587457", "nonce123"), expected);
    }

    #[test]
    fn test_signature_is_deterministic() {
        assert_eq!(
            reference_signature("1500000000", "nonceX", "mytoken"),
            reference_signature("1500000000", "nonceX", "mytoken")
        );
        assert_eq!(
            reference_signature("1500000000", "nonceX", "mytoken"),
            "0a13285ff0d45b45cb1f549d103f9e821b5b20c8"
        );
    }

    #[test]
    fn test_signatures_match() {
        let expected = reference_signature("1", "2", "abc");
        assert!(signatures_match(&expected, &expected));
        assert!(!signatures_match(&expected, "2809f5614d4b6b0c4e1bb4c3f67ef361c7ef7280"));
        assert!(!signatures_match(&expected, ""));
        assert!(!signatures_match(&expected, &expected.to_uppercase()));
    }
}
