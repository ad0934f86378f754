//! Seal (MAC) computation for outbound payment requests.
//!
//! The gateway authenticates a request by recomputing a keyed digest over
//! the submitted fields. Three steps reproduce its published algorithm:
//!
//! 1. derive the usable binary key from the 40-hex-character security key,
//! 2. serialize the fields canonically — entries sorted by name, rendered
//!    `name=value` and joined by `*`,
//! 3. HMAC-SHA1 the canonical string and render the digest as upper-case
//!    hex.
//!
//! Step 2 makes the seal a pure function of the field *mapping*: permuting
//! insertion order elsewhere in the pipeline cannot change it.

use ring::hmac;

use crate::error::Error;
use crate::fields::FieldSet;

/// Required security key length, in hexadecimal characters.
pub const SECURITY_KEY_LENGTH: usize = 40;

/// Length of the derived binary key, in bytes.
pub const USABLE_KEY_LENGTH: usize = 20;

/// Derives the usable binary key from the shared security key.
///
/// The security key is the hex rendering of the key material, with a
/// gateway-specific twist on the last two characters: a 39th character in
/// ASCII `71..=96` is shifted down by 23, and a trailing `M` becomes `0`.
/// The adjusted 40-character string is then hex-decoded.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] if the input is not 40 characters or the
/// adjusted string is not valid hex.
pub fn usable_key(security_key: &str) -> Result<[u8; USABLE_KEY_LENGTH], Error> {
    let invalid = Error::InvalidKey {
        expected: SECURITY_KEY_LENGTH,
    };

    let bytes = security_key.as_bytes();
    if bytes.len() != SECURITY_KEY_LENGTH || !security_key.is_ascii() {
        return Err(invalid);
    }

    let mut hex_key = String::with_capacity(SECURITY_KEY_LENGTH);
    hex_key.push_str(&security_key[..SECURITY_KEY_LENGTH - 2]);

    let before_last = bytes[SECURITY_KEY_LENGTH - 2];
    let last = bytes[SECURITY_KEY_LENGTH - 1] as char;
    if (71..97).contains(&before_last) {
        hex_key.push((before_last - 23) as char);
        hex_key.push(last);
    } else if last == 'M' {
        hex_key.push(before_last as char);
        hex_key.push('0');
    } else {
        hex_key.push(before_last as char);
        hex_key.push(last);
    }

    let decoded = hex::decode(&hex_key).map_err(|_| invalid.clone())?;
    decoded.try_into().map_err(|_| invalid)
}

/// Serializes a field mapping into the canonical sealed string.
///
/// Entries are sorted by field name (byte order), rendered `name=value`
/// and joined by `*` with no trailing delimiter.
#[must_use]
pub fn canonical_string(fields: &FieldSet) -> String {
    let mut entries: Vec<(&str, &str)> = fields.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    entries
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("*")
}

/// Computes the seal over a field mapping with an already-derived key.
///
/// Deterministic in the mapping contents and independent of field
/// insertion order.
#[cfg_attr(feature = "telemetry", tracing::instrument(level = "debug", skip_all))]
#[must_use]
pub fn generate(usable_key: &[u8], fields: &FieldSet) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, usable_key);
    let tag = hmac::sign(&key, canonical_string(fields).as_bytes());
    hex::encode(tag.as_ref()).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_KEY: &str = "0123456789012345678901234567890123456789";

    #[test]
    fn test_usable_key_passthrough() {
        let key = usable_key(PLAIN_KEY).unwrap();
        assert_eq!(key.len(), USABLE_KEY_LENGTH);
        assert_eq!(hex::encode(key), PLAIN_KEY);
    }

    #[test]
    fn test_usable_key_shifts_high_before_last_char() {
        // 'G' (71) is shifted down by 23 to '0'.
        let key = usable_key("01234567890123456789012345678901234567G5").unwrap();
        assert_eq!(
            hex::encode(key),
            "0123456789012345678901234567890123456705"
        );
    }

    #[test]
    fn test_usable_key_replaces_trailing_m() {
        let key = usable_key("012345678901234567890123456789012345678M").unwrap();
        assert_eq!(
            hex::encode(key),
            "0123456789012345678901234567890123456780"
        );
    }

    #[test]
    fn test_usable_key_rejects_bad_length_and_non_hex() {
        assert!(matches!(usable_key("FOO"), Err(Error::InvalidKey { .. })));
        assert!(matches!(
            usable_key("zz23456789012345678901234567890123456789"),
            Err(Error::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_canonical_string_sorts_by_name() {
        let fields: FieldSet = [("montant", "50EUR"), ("TPE", "1234567"), ("lgue", "FR")]
            .into_iter()
            .collect();
        assert_eq!(
            canonical_string(&fields),
            "TPE=1234567*lgue=FR*montant=50EUR"
        );
    }

    #[test]
    fn test_seal_is_order_independent() {
        let key = usable_key(PLAIN_KEY).unwrap();
        let forward: FieldSet = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        let backward: FieldSet = [("c", "3"), ("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(generate(&key, &forward), generate(&key, &backward));
    }

    #[test]
    fn test_seal_shape() {
        let key = usable_key(PLAIN_KEY).unwrap();
        let fields: FieldSet = [("reference", "ABC123")].into_iter().collect();
        let seal = generate(&key, &fields);
        // HMAC-SHA1 digest: 20 bytes, upper-case hex.
        assert_eq!(seal.len(), 40);
        assert!(seal.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(seal, seal.to_uppercase());
    }

    #[test]
    fn test_seal_depends_on_key_and_contents() {
        let key_a = usable_key(PLAIN_KEY).unwrap();
        let key_b = usable_key("A123456789012345678901234567890123456789").unwrap();
        let fields: FieldSet = [("reference", "ABC123")].into_iter().collect();
        assert_ne!(generate(&key_a, &fields), generate(&key_b, &fields));

        let other: FieldSet = [("reference", "ABC124")].into_iter().collect();
        assert_ne!(generate(&key_a, &fields), generate(&key_a, &other));
    }
}
