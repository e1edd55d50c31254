//! Cryptographic providers for password based encryption.
//!
//! This module provides:
//! - Provider and registry abstractions resolving algorithms by name
//! - PBKDF2 and Argon2id password based key derivation
//! - PBES2 ciphers (AES-CBC and AES-GCM keyed through PBKDF2)
//! - Algorithm parameters carrying salt, iteration count and IV

mod cipher;
mod kdf;
mod params;
mod provider;
mod scheme;

pub use cipher::{CipherEngine, Pbes2Cipher};
pub use kdf::{Argon2Kdf, KeyDerivation, PbeKeySpec, Pbkdf2Kdf, SecretKey};
pub use params::{AlgorithmParameters, ParameterCodec, PbeParameterSpec, Pbes2ParameterCodec};
pub use provider::{Provider, Registry, RustCryptoProvider};
pub use scheme::{CipherKind, Pbes2Scheme, Prf};

use std::fmt;

/// Direction a cipher engine is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    Encrypt,
    Decrypt,
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherMode::Encrypt => write!(f, "encrypt"),
            CipherMode::Decrypt => write!(f, "decrypt"),
        }
    }
}
