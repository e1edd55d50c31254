//! Binary-to-text alphabets for ciphertext and IV.
//!
//! Two families are supported: 64-symbol and 32-symbol encodings. The family is
//! a tagged variant so callers branch with `match` instead of inspecting types.

mod base32;
mod base64;

pub use base32::Base32Alphabet;
pub use base64::Base64Alphabet;

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Alphabet used to render bytes as printable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    Base64(Base64Alphabet),
    Base32(Base32Alphabet),
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::Base64(Base64Alphabet::Standard)
    }
}

impl Alphabet {
    /// Every supported alphabet, in display order.
    pub const ALL: [Alphabet; 6] = [
        Alphabet::Base64(Base64Alphabet::Standard),
        Alphabet::Base64(Base64Alphabet::UrlSafe),
        Alphabet::Base64(Base64Alphabet::StandardNoPad),
        Alphabet::Base32(Base32Alphabet::Standard),
        Alphabet::Base32(Base32Alphabet::Lowercase),
        Alphabet::Base32(Base32Alphabet::Hex),
    ];

    /// Encode bytes into text.
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Alphabet::Base64(alphabet) => alphabet.encode(bytes),
            Alphabet::Base32(alphabet) => alphabet.encode(bytes),
        }
    }

    /// Decode text back into bytes.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            Alphabet::Base64(alphabet) => alphabet.decode(text),
            Alphabet::Base32(alphabet) => alphabet.decode(text),
        }
    }

    /// Whether this is a 64-symbol alphabet.
    pub fn is_base64(&self) -> bool {
        matches!(self, Alphabet::Base64(_))
    }

    /// Short name accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Alphabet::Base64(Base64Alphabet::Standard) => "base64",
            Alphabet::Base64(Base64Alphabet::UrlSafe) => "base64url",
            Alphabet::Base64(Base64Alphabet::StandardNoPad) => "base64-nopad",
            Alphabet::Base32(Base32Alphabet::Standard) => "base32",
            Alphabet::Base32(Base32Alphabet::Lowercase) => "base32-lower",
            Alphabet::Base32(Base32Alphabet::Hex) => "base32hex",
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Alphabet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Alphabet::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidAlphabet(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Vec<u8>> {
        vec![
            Vec::new(),
            vec![0x00],
            vec![0xFF, 0x10],
            b"hello".to_vec(),
            (0..=255u8).collect(),
            (0..37u8).map(|i| i.wrapping_mul(97)).collect(),
        ]
    }

    #[test]
    fn test_roundtrip_every_alphabet() {
        for alphabet in Alphabet::ALL {
            for bytes in samples() {
                let text = alphabet.encode(&bytes);
                let decoded = alphabet.decode(&text).unwrap();
                assert_eq!(decoded, bytes, "alphabet {alphabet}");
            }
        }
    }

    #[test]
    fn test_empty_input_encodes_to_empty_text() {
        for alphabet in Alphabet::ALL {
            assert_eq!(alphabet.encode(&[]), "");
        }
    }

    #[test]
    fn test_family_branch() {
        assert!(Alphabet::default().is_base64());
        assert!(!Alphabet::Base32(Base32Alphabet::Hex).is_base64());
    }

    #[test]
    fn test_names_parse_back() {
        for alphabet in Alphabet::ALL {
            assert_eq!(alphabet.to_string().parse::<Alphabet>().unwrap(), alphabet);
        }
        assert_eq!(
            "BASE32".parse::<Alphabet>().unwrap(),
            Alphabet::Base32(Base32Alphabet::Standard)
        );
        assert!(matches!(
            "base58".parse::<Alphabet>(),
            Err(Error::InvalidAlphabet(_))
        ));
    }

    #[test]
    fn test_decode_rejects_foreign_symbols() {
        let base32 = Alphabet::Base32(Base32Alphabet::Standard);
        assert!(base32.decode("a!b?").is_err());
        assert!(Alphabet::default().decode("@@@@").is_err());
    }
}
