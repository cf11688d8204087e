use base64::{engine::general_purpose, Engine as _};

use super::DecodeError;

/// Decode the base64 `inlineData.data` field into raw PCM bytes.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(general_purpose::STANDARD.decode(payload.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_known_payload() {
        // 0x0000, 0x7FFF
        assert_eq!(decode_base64("AAD/fw==").unwrap(), vec![0x00, 0x00, 0xFF, 0x7F]);
    }

    #[test]
    fn empty_payload_is_empty_bytes() {
        assert!(decode_base64("").unwrap().is_empty());
    }

    #[test]
    fn tolerates_trailing_newline() {
        assert_eq!(decode_base64("AAD/fw==\n").unwrap().len(), 4);
    }

    #[test]
    fn rejects_invalid_payload() {
        assert!(matches!(
            decode_base64("not*base64"),
            Err(DecodeError::InvalidBase64(_))
        ));
        // Truncated padding
        assert!(decode_base64("AAD/fw=").is_err());
    }

    proptest! {
        #[test]
        fn round_trips_any_bytes(bytes in prop::collection::vec(any::<u8>(), 0..4096)) {
            let encoded = general_purpose::STANDARD.encode(&bytes);
            prop_assert_eq!(decode_base64(&encoded).unwrap(), bytes);
        }
    }
}
