//! Algorithm parameters: salt, iteration count and an optional IV.

use crate::crypto::scheme::Pbes2Scheme;
use crate::error::{crypto_failure, Result};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on a serialized parameters blob.
const MAX_ENCODED_LEN: u64 = 4096;

/// Inputs used to generate [`AlgorithmParameters`].
#[derive(Clone, PartialEq, Eq)]
pub struct PbeParameterSpec {
    pub salt: Vec<u8>,
    pub iteration_count: u32,
    pub iv: Option<Vec<u8>>,
}

impl fmt::Debug for PbeParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PbeParameterSpec")
            .field("salt", &hex::encode(&self.salt))
            .field("iteration_count", &self.iteration_count)
            .field("iv", &self.iv.as_ref().map(hex::encode))
            .finish()
    }
}

/// Parameters a cipher was initialized with.
///
/// Decryption needs exactly the parameters encryption produced, so callers
/// keep these (or their [`to_bytes`](Self::to_bytes) blob) next to the
/// ciphertext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmParameters {
    algorithm: String,
    salt: Vec<u8>,
    iteration_count: u32,
    iv: Option<Vec<u8>>,
}

impl AlgorithmParameters {
    pub fn new(algorithm: impl Into<String>, spec: PbeParameterSpec) -> Self {
        Self {
            algorithm: algorithm.into(),
            salt: spec.salt,
            iteration_count: spec.iteration_count,
            iv: spec.iv,
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    /// IV carried by the parameters, if the cipher uses one.
    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    /// Same parameters with the IV replaced.
    pub fn with_iv(mut self, iv: Vec<u8>) -> Self {
        self.iv = Some(iv);
        self
    }

    pub fn parameter_spec(&self) -> PbeParameterSpec {
        PbeParameterSpec {
            salt: self.salt.clone(),
            iteration_count: self.iteration_count,
            iv: self.iv.clone(),
        }
    }

    fn codec() -> impl Options {
        bincode::DefaultOptions::new().with_limit(MAX_ENCODED_LEN)
    }

    /// Serialize into an opaque blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(Self::codec().serialize(self)?)
    }

    /// Parse a blob produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::codec().deserialize(bytes)?)
    }
}

impl fmt::Debug for AlgorithmParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmParameters")
            .field("algorithm", &self.algorithm)
            .field("salt", &hex::encode(&self.salt))
            .field("iteration_count", &self.iteration_count)
            .field("iv", &self.iv.as_ref().map(hex::encode))
            .finish()
    }
}

/// Generates algorithm parameters for a named algorithm.
pub trait ParameterCodec: Send {
    fn algorithm(&self) -> &str;

    /// Validate the spec and wrap it as parameters for this algorithm.
    fn generate(&self, spec: PbeParameterSpec) -> Result<AlgorithmParameters>;
}

/// Parameter codec for the PBES2 schemes.
#[derive(Debug, Clone)]
pub struct Pbes2ParameterCodec {
    scheme: Pbes2Scheme,
    algorithm: String,
}

impl Pbes2ParameterCodec {
    pub fn new(scheme: Pbes2Scheme) -> Self {
        Self {
            scheme,
            algorithm: scheme.name(),
        }
    }
}

impl ParameterCodec for Pbes2ParameterCodec {
    fn algorithm(&self) -> &str {
        &self.algorithm
    }

    fn generate(&self, spec: PbeParameterSpec) -> Result<AlgorithmParameters> {
        if spec.salt.is_empty() {
            return Err(crypto_failure("parameter salt must not be empty"));
        }
        if spec.iteration_count == 0 {
            return Err(crypto_failure("parameter iteration count must be >= 1"));
        }
        if let Some(iv) = &spec.iv {
            let expected = self.scheme.kind.iv_len();
            if iv.len() != expected {
                return Err(crypto_failure(format!(
                    "IV must be {expected} bytes for {}, got {}",
                    self.algorithm,
                    iv.len()
                )));
            }
        }

        Ok(AlgorithmParameters::new(self.algorithm.clone(), spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn codec(name: &str) -> Pbes2ParameterCodec {
        Pbes2ParameterCodec::new(Pbes2Scheme::from_name(name).unwrap())
    }

    fn spec(iv: Option<Vec<u8>>) -> PbeParameterSpec {
        PbeParameterSpec {
            salt: vec![1, 2, 3, 4, 5, 6, 7, 8],
            iteration_count: 200,
            iv,
        }
    }

    #[test]
    fn test_generate_without_iv() {
        let params = codec("PBEWithHmacSHA1andAES_128").generate(spec(None)).unwrap();

        assert_eq!(params.algorithm(), "PBEWithHmacSHA1AndAES_128");
        assert_eq!(params.salt(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(params.iteration_count(), 200);
        assert!(params.iv().is_none());
    }

    #[test]
    fn test_iv_length_checked_per_mode() {
        let cbc = codec("PBEWithHmacSHA256AndAES_256");
        let gcm = codec("PBEWithHmacSHA256AndAES_256_GCM");

        assert!(cbc.generate(spec(Some(vec![0; 16]))).is_ok());
        assert!(cbc.generate(spec(Some(vec![0; 12]))).is_err());
        assert!(gcm.generate(spec(Some(vec![0; 12]))).is_ok());
        assert!(gcm.generate(spec(Some(vec![0; 16]))).is_err());
    }

    #[test]
    fn test_generate_rejects_empty_salt_and_zero_iterations() {
        let codec = codec("PBEWithHmacSHA256AndAES_128");
        let empty_salt = PbeParameterSpec {
            salt: Vec::new(),
            ..spec(None)
        };
        let zero = PbeParameterSpec {
            iteration_count: 0,
            ..spec(None)
        };

        assert!(matches!(codec.generate(empty_salt), Err(Error::CryptoOperation)));
        assert!(matches!(codec.generate(zero), Err(Error::CryptoOperation)));
    }

    #[test]
    fn test_blob_preserves_iv() {
        let params = codec("PBEWithHmacSHA1andAES_128")
            .generate(spec(Some(vec![9; 16])))
            .unwrap();

        let restored = AlgorithmParameters::from_bytes(&params.to_bytes().unwrap()).unwrap();

        assert_eq!(restored, params);
        assert_eq!(restored.iv(), Some(&[9u8; 16][..]));
    }

    #[test]
    fn test_garbage_blob_fails() {
        let result = AlgorithmParameters::from_bytes(&[0xFF; 3]);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_with_iv_replaces_iv() {
        let params = AlgorithmParameters::new("x", spec(None)).with_iv(vec![5; 12]);
        assert_eq!(params.parameter_spec().iv, Some(vec![5; 12]));
    }
}
