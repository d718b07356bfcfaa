//! License key generation for subscription activations.
//!
//! Keys are opaque tokens validated by the licensed desktop client; they carry
//! no embedded structure. Format: four dash-separated groups of four symbols
//! from an unambiguous uppercase alphabet (no 0/O/1/I/L), e.g.
//! `7XKM-Q2RW-9NAB-D4TE`. 16 symbols over a 31-character alphabet is roughly
//! 79 bits of entropy; uniqueness is probabilistic and not checked against
//! existing keys.

use rand::rngs::OsRng;
use rand::Rng;

/// Alphabet without visually ambiguous characters.
const KEY_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

const GROUPS: usize = 4;
const GROUP_LEN: usize = 4;

/// Generate a fresh license key from the OS entropy source.
pub fn generate_key() -> String {
    let mut rng = OsRng;
    let mut key = String::with_capacity(GROUPS * GROUP_LEN + GROUPS - 1);

    for group in 0..GROUPS {
        if group > 0 {
            key.push('-');
        }
        for _ in 0..GROUP_LEN {
            let idx = rng.gen_range(0..KEY_ALPHABET.len());
            key.push(KEY_ALPHABET[idx] as char);
        }
    }

    key
}

/// Check that a string has the shape of a generated license key.
pub fn is_valid_key_format(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    groups.len() == GROUPS
        && groups.iter().all(|g| {
            g.len() == GROUP_LEN && g.bytes().all(|b| KEY_ALPHABET.contains(&b))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = generate_key();
        assert_eq!(key.len(), 19); // 16 symbols + 3 dashes
        assert!(is_valid_key_format(&key), "generated key should validate: {}", key);
    }

    #[test]
    fn test_keys_differ() {
        // Probabilistic, but a collision here would indicate a broken RNG.
        let a = generate_key();
        let b = generate_key();
        assert_ne!(a, b);
    }

    #[test]
    fn test_format_validation_rejects_garbage() {
        assert!(!is_valid_key_format(""));
        assert!(!is_valid_key_format("ABCD-EFGH-JKMN")); // too few groups
        assert!(!is_valid_key_format("ABCD-EFGH-JKMN-PQRS-TUVW")); // too many
        assert!(!is_valid_key_format("abcd-efgh-jkmn-pqrs")); // lowercase
        assert!(!is_valid_key_format("AB0D-EFGH-JKMN-PQRS")); // ambiguous char
        assert!(!is_valid_key_format("ABCDE-FGH-JKMN-PQRS")); // uneven groups
    }
}
