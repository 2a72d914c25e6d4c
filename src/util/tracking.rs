use rand::rngs::OsRng;
use rand::RngCore;

/// Prefix of every public tracking identifier.
pub const TRACKING_PREFIX: &str = "ANA-";

const RANDOM_BYTES: usize = 4;

/// Generate a tracking identifier: `ANA-` followed by 8 uppercase hex
/// characters derived from 4 cryptographically random bytes.
///
/// Uniqueness rests on 32 bits of randomness per call; the store's
/// unique index on `tracking_id` is the actual guarantee.
pub fn generate_tracking_id() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("{}{}", TRACKING_PREFIX, hex::encode_upper(bytes))
}

/// Check the `ANA-XXXXXXXX` shape without touching the store.
pub fn is_valid_tracking_id(id: &str) -> bool {
    match id.strip_prefix(TRACKING_PREFIX) {
        Some(rest) => {
            rest.len() == RANDOM_BYTES * 2
                && rest
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_matches_format() {
        for _ in 0..100 {
            let id = generate_tracking_id();
            assert!(is_valid_tracking_id(&id), "bad tracking id: {}", id);
            assert_eq!(id.len(), TRACKING_PREFIX.len() + 8);
        }
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_tracking_id()));
        }
    }

    #[test]
    fn test_format_check_rejects_bad_shapes() {
        assert!(is_valid_tracking_id("ANA-0A1B2C3D"));
        assert!(!is_valid_tracking_id("ANA-0a1b2c3d")); // lowercase
        assert!(!is_valid_tracking_id("ANA-0A1B2C")); // too short
        assert!(!is_valid_tracking_id("ANA-0A1B2C3D4E")); // too long
        assert!(!is_valid_tracking_id("ANB-0A1B2C3D")); // wrong prefix
        assert!(!is_valid_tracking_id("ANA-0A1B2C3G")); // non-hex
        assert!(!is_valid_tracking_id(""));
    }
}
