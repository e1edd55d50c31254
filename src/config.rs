//! Configuration constants and the options record used to build an engine.

use crate::crypto::{AlgorithmParameters, CipherMode};
use crate::encoding::Alphabet;
use crate::error::{Error, MissingParameter, Result};
use zeroize::Zeroizing;

/// Key derivation algorithm used when none is configured.
pub const DEFAULT_PBE_ALGORITHM: &str = "PBEWithHmacSHA1andAES_128";

/// Salt length used when generating a fresh salt.
pub const DEFAULT_SALT_LENGTH: usize = 16;

/// Argon2id parameters for the `Argon2id` key derivation.
pub mod argon2_params {
    /// Memory cost in KiB (64 MB).
    pub const MEMORY_COST: u32 = 65536;

    /// Parallelism factor.
    pub const PARALLELISM: u32 = 4;

    /// Output length in bytes (256 bits).
    pub const OUTPUT_LENGTH: usize = 32;

    /// Shortest salt Argon2 accepts.
    pub const MIN_SALT_LENGTH: usize = 8;
}

/// Options collected before an engine is built.
///
/// Every field is optional; [`PbeConfig::resolve`] validates the record and
/// fills in defaults without touching any cryptographic code.
#[derive(Default, Clone)]
pub struct PbeConfig {
    /// Key derivation algorithm name.
    pub key_algorithm: Option<String>,
    /// Cipher transformation name.
    pub transformation: Option<String>,
    /// Algorithm parameters name.
    pub parameters_algorithm: Option<String>,
    /// Key derivation iteration count.
    pub iteration: Option<u32>,
    /// Key derivation salt.
    pub salt: Option<Vec<u8>>,
    /// Derived key length in bits.
    pub key_length: Option<u32>,
    /// Password the key is derived from.
    pub password: Option<Zeroizing<String>>,
    /// Direction the engine is bound to.
    pub cipher_mode: Option<CipherMode>,
    /// Cipher iteration count, defaults to `iteration`.
    pub cipher_iteration: Option<u32>,
    /// Cipher salt, defaults to `salt`.
    pub cipher_salt: Option<Vec<u8>>,
    /// Alphabet for ciphertext and IV text.
    pub alphabet: Alphabet,
    /// Raw IV for decryption.
    pub iv: Option<Vec<u8>>,
    /// IV encoded with `alphabet`, used when `iv` is unset.
    pub encoded_iv: Option<String>,
    /// Complete parameters for decryption.
    pub algorithm_parameters: Option<AlgorithmParameters>,
}

impl std::fmt::Debug for PbeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PbeConfig")
            .field("key_algorithm", &self.key_algorithm)
            .field("transformation", &self.transformation)
            .field("parameters_algorithm", &self.parameters_algorithm)
            .field("iteration", &self.iteration)
            .field("salt", &self.salt.as_ref().map(hex::encode))
            .field("key_length", &self.key_length)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cipher_mode", &self.cipher_mode)
            .field("cipher_iteration", &self.cipher_iteration)
            .field("cipher_salt", &self.cipher_salt.as_ref().map(hex::encode))
            .field("alphabet", &self.alphabet)
            .field("iv", &self.iv.as_ref().map(hex::encode))
            .field("encoded_iv", &self.encoded_iv)
            .field("algorithm_parameters", &self.algorithm_parameters)
            .finish()
    }
}

/// A validated configuration with every default applied.
pub struct ResolvedConfig {
    pub key_algorithm: String,
    pub transformation: String,
    pub parameters_algorithm: String,
    pub iteration: u32,
    pub salt: Vec<u8>,
    pub key_length: Option<u32>,
    pub password: Zeroizing<String>,
    pub cipher_mode: CipherMode,
    pub cipher_iteration: u32,
    pub cipher_salt: Vec<u8>,
    pub alphabet: Alphabet,
    /// IV prepared for the decrypt path, from `iv` or the decoded `encoded_iv`.
    pub iv: Option<Vec<u8>>,
    pub algorithm_parameters: Option<AlgorithmParameters>,
}

impl PbeConfig {
    /// Validate the record and apply the default cascade.
    pub fn resolve(self) -> Result<ResolvedConfig> {
        let iteration = self
            .iteration
            .ok_or(Error::ConfigurationIncomplete(MissingParameter::IterationCount))?;
        let salt = self
            .salt
            .filter(|s| !s.is_empty())
            .ok_or(Error::ConfigurationIncomplete(MissingParameter::Salt))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or(Error::ConfigurationIncomplete(MissingParameter::Password))?;
        let cipher_mode = self
            .cipher_mode
            .ok_or(Error::ConfigurationIncomplete(MissingParameter::CipherMode))?;

        let key_algorithm = self
            .key_algorithm
            .unwrap_or_else(|| DEFAULT_PBE_ALGORITHM.to_string());
        let transformation = self
            .transformation
            .unwrap_or_else(|| key_algorithm.clone());
        let parameters_algorithm = self
            .parameters_algorithm
            .unwrap_or_else(|| key_algorithm.clone());
        let cipher_salt = self.cipher_salt.unwrap_or_else(|| salt.clone());
        let cipher_iteration = self.cipher_iteration.unwrap_or(iteration);

        let iv = match (self.iv, self.encoded_iv) {
            (Some(iv), _) => Some(iv),
            (None, Some(encoded)) => Some(self.alphabet.decode(&encoded)?),
            (None, None) => None,
        };

        Ok(ResolvedConfig {
            key_algorithm,
            transformation,
            parameters_algorithm,
            iteration,
            salt,
            key_length: self.key_length.filter(|&bits| bits != 0),
            password,
            cipher_mode,
            cipher_iteration,
            cipher_salt,
            alphabet: self.alphabet,
            iv,
            algorithm_parameters: self.algorithm_parameters,
        })
    }
}
