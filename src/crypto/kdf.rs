//! Password based key derivation.

use crate::config::argon2_params;
use crate::crypto::scheme::{Pbes2Scheme, Prf};
use crate::error::{crypto_failure, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use std::fmt;
use zeroize::Zeroizing;

/// Raw key material labelled with the algorithm it is meant for.
#[derive(Clone)]
pub struct SecretKey {
    algorithm: String,
    material: Zeroizing<Vec<u8>>,
}

impl SecretKey {
    pub fn new(algorithm: impl Into<String>, material: Vec<u8>) -> Self {
        Self {
            algorithm: algorithm.into(),
            material: Zeroizing::new(material),
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn material(&self) -> &[u8] {
        &self.material
    }

    /// Relabel the same key bytes for another algorithm.
    pub fn rewrap(self, algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            material: self.material,
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("algorithm", &self.algorithm)
            .field("len", &self.material.len())
            .finish_non_exhaustive()
    }
}

/// Inputs to a key derivation.
#[derive(Clone, Copy)]
pub struct PbeKeySpec<'a> {
    pub password: &'a str,
    pub salt: &'a [u8],
    pub iteration_count: u32,
    /// Requested key length in bits; `None` selects the natural length.
    pub key_length: Option<u32>,
}

impl PbeKeySpec<'_> {
    /// Output length in bytes for an algorithm with the given natural length.
    pub fn output_len(&self, natural: usize) -> Result<usize> {
        match self.key_length {
            None => Ok(natural),
            Some(bits) if bits == 0 || bits % 8 != 0 => Err(crypto_failure(format!(
                "key length must be a positive multiple of 8 bits, got {bits}"
            ))),
            Some(bits) => Ok(bits as usize / 8),
        }
    }
}

/// A named key derivation function.
pub trait KeyDerivation: Send {
    /// Algorithm name.
    fn algorithm(&self) -> &str;

    /// Key length in bytes used when no length is requested.
    fn natural_key_length(&self) -> usize;

    /// Derive key material from the spec.
    fn derive(&self, spec: &PbeKeySpec<'_>) -> Result<SecretKey>;
}

/// PBKDF2 with an HMAC pseudo-random function.
#[derive(Debug, Clone)]
pub struct Pbkdf2Kdf {
    algorithm: String,
    prf: Prf,
    natural_len: usize,
}

impl Pbkdf2Kdf {
    /// `PBKDF2WithHmac<digest>`, natural length is the HMAC output size.
    pub fn new(prf: Prf) -> Self {
        Self {
            algorithm: format!("PBKDF2WithHmac{}", prf.digest_name()),
            prf,
            natural_len: prf.output_len(),
        }
    }

    /// Key factory for a PBES2 scheme, natural length is the AES key size.
    pub fn for_scheme(scheme: Pbes2Scheme) -> Self {
        Self {
            algorithm: scheme.name(),
            prf: scheme.prf,
            natural_len: scheme.key_size,
        }
    }

    /// Parse a `PBKDF2WithHmac<digest>` name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Prf::ALL
            .into_iter()
            .map(Self::new)
            .find(|kdf| kdf.algorithm.eq_ignore_ascii_case(name))
    }
}

impl KeyDerivation for Pbkdf2Kdf {
    fn algorithm(&self) -> &str {
        &self.algorithm
    }

    fn natural_key_length(&self) -> usize {
        self.natural_len
    }

    fn derive(&self, spec: &PbeKeySpec<'_>) -> Result<SecretKey> {
        let len = spec.output_len(self.natural_len)?;
        let mut key = Zeroizing::new(vec![0u8; len]);
        self.prf.pbkdf2(
            spec.password.as_bytes(),
            spec.salt,
            spec.iteration_count,
            &mut key,
        )?;

        Ok(SecretKey {
            algorithm: self.algorithm.clone(),
            material: key,
        })
    }
}

/// Argon2id key derivation.
///
/// The iteration count is the Argon2 time cost; memory and parallelism come
/// from [`argon2_params`].
#[derive(Debug, Clone, Default)]
pub struct Argon2Kdf;

impl Argon2Kdf {
    pub const NAME: &'static str = "Argon2id";
}

impl KeyDerivation for Argon2Kdf {
    fn algorithm(&self) -> &str {
        Self::NAME
    }

    fn natural_key_length(&self) -> usize {
        argon2_params::OUTPUT_LENGTH
    }

    fn derive(&self, spec: &PbeKeySpec<'_>) -> Result<SecretKey> {
        if spec.salt.len() < argon2_params::MIN_SALT_LENGTH {
            return Err(crypto_failure(format!(
                "argon2 salt must be at least {} bytes",
                argon2_params::MIN_SALT_LENGTH
            )));
        }
        let len = spec.output_len(argon2_params::OUTPUT_LENGTH)?;

        let params = Params::new(
            argon2_params::MEMORY_COST,
            spec.iteration_count,
            argon2_params::PARALLELISM,
            Some(len),
        )
        .map_err(|e| crypto_failure(format!("invalid argon2 parameters: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = Zeroizing::new(vec![0u8; len]);
        argon2
            .hash_password_into(spec.password.as_bytes(), spec.salt, &mut key)
            .map_err(|e| crypto_failure(format!("argon2 key derivation failed: {e}")))?;

        Ok(SecretKey {
            algorithm: Self::NAME.to_string(),
            material: key,
        })
    }
}
