//! Names and building blocks of the PBES2 schemes.

use crate::error::{crypto_failure, Result};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

/// Pseudo-random function driving PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prf {
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl Prf {
    pub const ALL: [Prf; 5] = [
        Prf::HmacSha1,
        Prf::HmacSha224,
        Prf::HmacSha256,
        Prf::HmacSha384,
        Prf::HmacSha512,
    ];

    /// Digest name as it appears in algorithm names (`SHA256`).
    pub fn digest_name(&self) -> &'static str {
        match self {
            Prf::HmacSha1 => "SHA1",
            Prf::HmacSha224 => "SHA224",
            Prf::HmacSha256 => "SHA256",
            Prf::HmacSha384 => "SHA384",
            Prf::HmacSha512 => "SHA512",
        }
    }

    /// HMAC output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Prf::HmacSha1 => 20,
            Prf::HmacSha224 => 28,
            Prf::HmacSha256 => 32,
            Prf::HmacSha384 => 48,
            Prf::HmacSha512 => 64,
        }
    }

    fn parse(digest: &str) -> Option<Self> {
        Prf::ALL
            .into_iter()
            .find(|prf| prf.digest_name().eq_ignore_ascii_case(digest))
    }

    /// Fill `out` with PBKDF2 output.
    pub fn pbkdf2(&self, password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) -> Result<()> {
        if rounds == 0 {
            return Err(crypto_failure("PBKDF2 iteration count must be >= 1"));
        }
        if salt.is_empty() {
            return Err(crypto_failure("PBKDF2 salt must not be empty"));
        }

        let result = match self {
            Prf::HmacSha1 => pbkdf2::<Hmac<Sha1>>(password, salt, rounds, out),
            Prf::HmacSha224 => pbkdf2::<Hmac<Sha224>>(password, salt, rounds, out),
            Prf::HmacSha256 => pbkdf2::<Hmac<Sha256>>(password, salt, rounds, out),
            Prf::HmacSha384 => pbkdf2::<Hmac<Sha384>>(password, salt, rounds, out),
            Prf::HmacSha512 => pbkdf2::<Hmac<Sha512>>(password, salt, rounds, out),
        };
        result.map_err(|e| crypto_failure(format!("PBKDF2 failed: {e}")))
    }
}

/// Block cipher mode behind a PBES2 scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherKind {
    /// AES-CBC with PKCS#7 padding.
    Cbc,
    /// AES-GCM with a 128-bit tag.
    Gcm,
}

impl CipherKind {
    /// IV (nonce) length in bytes.
    pub fn iv_len(&self) -> usize {
        match self {
            CipherKind::Cbc => 16,
            CipherKind::Gcm => 12,
        }
    }
}

/// A `PBEWithHmac<digest>AndAES_<bits>[_GCM]` scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pbes2Scheme {
    pub prf: Prf,
    /// AES key size in bytes.
    pub key_size: usize,
    pub kind: CipherKind,
}

impl Pbes2Scheme {
    /// Parse a scheme name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let rest = lower.strip_prefix("pbewithhmac")?;
        let (digest, rest) = rest.split_once("andaes_")?;
        let prf = Prf::parse(digest)?;

        let (bits, kind) = match rest.strip_suffix("_gcm") {
            Some(bits) => (bits, CipherKind::Gcm),
            None => (rest, CipherKind::Cbc),
        };
        let key_size = match bits {
            "128" => 16,
            "256" => 32,
            _ => return None,
        };

        Some(Self {
            prf,
            key_size,
            kind,
        })
    }

    /// Canonical algorithm name.
    pub fn name(&self) -> String {
        let suffix = match self.kind {
            CipherKind::Cbc => "",
            CipherKind::Gcm => "_GCM",
        };
        format!(
            "PBEWithHmac{}AndAES_{}{}",
            self.prf.digest_name(),
            self.key_size * 8,
            suffix
        )
    }

    /// Every scheme the built-in provider offers.
    pub fn all() -> Vec<Self> {
        let mut schemes = Vec::new();
        for kind in [CipherKind::Cbc, CipherKind::Gcm] {
            for prf in Prf::ALL {
                for key_size in [16, 32] {
                    schemes.push(Self {
                        prf,
                        key_size,
                        kind,
                    });
                }
            }
        }
        schemes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_algorithm_name() {
        let scheme = Pbes2Scheme::from_name("PBEWithHmacSHA1andAES_128").unwrap();
        assert_eq!(scheme.prf, Prf::HmacSha1);
        assert_eq!(scheme.key_size, 16);
        assert_eq!(scheme.kind, CipherKind::Cbc);
        assert_eq!(scheme.name(), "PBEWithHmacSHA1AndAES_128");
    }

    #[test]
    fn test_parse_gcm_name() {
        let scheme = Pbes2Scheme::from_name("pbewithhmacsha512andaes_256_gcm").unwrap();
        assert_eq!(scheme.prf, Prf::HmacSha512);
        assert_eq!(scheme.key_size, 32);
        assert_eq!(scheme.kind, CipherKind::Gcm);
    }

    #[test]
    fn test_reject_unknown_names() {
        assert!(Pbes2Scheme::from_name("PBEWithMD5AndDES").is_none());
        assert!(Pbes2Scheme::from_name("PBEWithHmacSHA256AndAES_192").is_none());
        assert!(Pbes2Scheme::from_name("PBEWithHmacMD5AndAES_128").is_none());
        assert!(Pbes2Scheme::from_name("AES/CBC/PKCS5Padding").is_none());
    }

    #[test]
    fn test_all_names_parse_back() {
        let schemes = Pbes2Scheme::all();
        assert_eq!(schemes.len(), 20);
        for scheme in schemes {
            assert_eq!(Pbes2Scheme::from_name(&scheme.name()), Some(scheme));
        }
    }

    #[test]
    fn test_pbkdf2_rejects_zero_rounds() {
        let mut out = [0u8; 16];
        assert!(Prf::HmacSha256.pbkdf2(b"pw", b"salt", 0, &mut out).is_err());
    }

    #[test]
    fn test_pbkdf2_rfc6070_vector() {
        // RFC 6070, c = 2
        let mut out = [0u8; 20];
        Prf::HmacSha1
            .pbkdf2(b"password", b"salt", 2, &mut out)
            .unwrap();
        assert_eq!(hex::encode(out), "ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957");
    }
}
