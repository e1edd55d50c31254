//! 64-symbol alphabets.

use crate::error::Result;
use data_encoding::{Encoding, BASE64, BASE64URL, BASE64_NOPAD};

/// A 64-symbol alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base64Alphabet {
    /// RFC 4648 `A-Za-z0-9+/` with `=` padding.
    Standard,
    /// RFC 4648 URL and filename safe alphabet with `=` padding.
    UrlSafe,
    /// Standard symbols without padding.
    StandardNoPad,
}

static STANDARD: Encoding = BASE64;
static URL_SAFE: Encoding = BASE64URL;
static STANDARD_NO_PAD: Encoding = BASE64_NOPAD;

impl Base64Alphabet {
    fn encoding(&self) -> &'static Encoding {
        match self {
            Base64Alphabet::Standard => &STANDARD,
            Base64Alphabet::UrlSafe => &URL_SAFE,
            Base64Alphabet::StandardNoPad => &STANDARD_NO_PAD,
        }
    }

    /// Encode bytes into text.
    pub fn encode(&self, bytes: &[u8]) -> String {
        self.encoding().encode(bytes)
    }

    /// Decode text into bytes.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>> {
        Ok(self.encoding().decode(text.as_bytes())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(Base64Alphabet::Standard.encode(b"f"), "Zg==");
        assert_eq!(Base64Alphabet::StandardNoPad.encode(b"f"), "Zg");
        assert_eq!(Base64Alphabet::Standard.encode(&[0xFB, 0xFF]), "+/8=");
        assert_eq!(Base64Alphabet::UrlSafe.encode(&[0xFB, 0xFF]), "-_8=");
    }

    #[test]
    fn test_padding_is_enforced() {
        assert!(Base64Alphabet::Standard.decode("Zg").is_err());
        assert!(Base64Alphabet::StandardNoPad.decode("Zg==").is_err());
    }
}
