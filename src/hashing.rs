use hex;
use sha2::{Digest, Sha256};

/// SHA-256 normalization of personal identifiers before transmission.
///
/// The Conversions API matches users on hashed identifiers, so email and
/// phone never cross the outbound boundary in plaintext. Normalization
/// follows Meta's matching rules:
///
/// 1. Emails are trimmed and lowercased before hashing
/// 2. Phone numbers are reduced to their digits before hashing
///
/// Both functions are total: hashing the empty string yields the well-known
/// empty digest. Whether a field is sent at all is decided separately, when
/// the outbound payload is built.

/// Hex SHA-256 digest of the trimmed, lowercased input.
pub fn sha256_lower(value: &str) -> String {
    let normalized = value.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hex SHA-256 digest of the input with every non-digit character removed.
pub fn sha256_phone(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let mut hasher = Sha256::new();
    hasher.update(digits.as_bytes());
    hex::encode(hasher.finalize())
}
