//! Room codes.
//!
//! Codes are 6 characters from Crockford's Base32 alphabet so they can be read
//! aloud and typed without confusing `I`/`1` or `O`/`0`.

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

pub const JOIN_CODE_LEN: usize = 6;

/// Generate a fresh room code.
///
/// # Example
/// ```
/// use monopoly_backend::utils::join_code::{generate_join_code, JOIN_CODE_LEN};
///
/// let code = generate_join_code();
/// assert_eq!(code.len(), JOIN_CODE_LEN);
/// ```
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LEN)
        .map(|_| CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char)
        .collect()
}

/// Canonical form of a code typed by a person: trimmed, upper-cased, with the
/// look-alike letters folded onto their digits. `None` when the result is not
/// a well-formed code.
pub fn normalize_join_code(raw: &str) -> Option<String> {
    let code: String = raw
        .trim()
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'I' | 'L' => '1',
            'O' => '0',
            other => other,
        })
        .collect();
    let valid = code.len() == JOIN_CODE_LEN && code.bytes().all(|b| CROCKFORD.contains(&b));
    valid.then_some(code)
}
