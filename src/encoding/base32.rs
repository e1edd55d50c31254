//! 32-symbol alphabets.

use crate::error::Result;
use data_encoding::{Encoding, Specification, BASE32, BASE32HEX};
use std::sync::OnceLock;

/// A 32-symbol alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base32Alphabet {
    /// RFC 4648 `A-Z2-7` with `=` padding.
    Standard,
    /// `a-z2-7` with `=` padding.
    Lowercase,
    /// RFC 4648 extended hex alphabet `0-9A-V` with `=` padding.
    Hex,
}

static STANDARD: Encoding = BASE32;
static HEX: Encoding = BASE32HEX;

fn lowercase() -> &'static Encoding {
    static LOWERCASE: OnceLock<Encoding> = OnceLock::new();
    LOWERCASE.get_or_init(|| {
        let mut spec = Specification::new();
        spec.symbols.push_str("abcdefghijklmnopqrstuvwxyz234567");
        spec.padding = Some('=');
        spec.encoding().expect("valid base32 specification")
    })
}

impl Base32Alphabet {
    fn encoding(&self) -> &'static Encoding {
        match self {
            Base32Alphabet::Standard => &STANDARD,
            Base32Alphabet::Lowercase => lowercase(),
            Base32Alphabet::Hex => &HEX,
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
