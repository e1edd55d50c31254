//! Error types for password based encryption.

use std::fmt;
use thiserror::Error;

use crate::crypto::CipherMode;

/// Result type alias for PBE operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A parameter that must be set before building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingParameter {
    /// Iteration count was never set.
    IterationCount,
    /// Salt was never set, or is empty.
    Salt,
    /// Password (the initial key) was never set, or is empty.
    Password,
    /// Neither encrypt nor decrypt mode was selected.
    CipherMode,
}

impl fmt::Display for MissingParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingParameter::IterationCount => write!(f, "iteration count"),
            MissingParameter::Salt => write!(f, "salt"),
            MissingParameter::Password => write!(f, "initial key (password)"),
            MissingParameter::CipherMode => write!(f, "cipher mode"),
        }
    }
}

/// Kind of algorithm a registry lookup was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmKind {
    KeyDerivation,
    Cipher,
    Parameters,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmKind::KeyDerivation => write!(f, "key derivation"),
            AlgorithmKind::Cipher => write!(f, "cipher"),
            AlgorithmKind::Parameters => write!(f, "algorithm parameters"),
        }
    }
}

/// Errors that can occur while building or using a PBE engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A required parameter was missing at build time.
    #[error("Configuration incomplete: {0} not specified")]
    ConfigurationIncomplete(MissingParameter),

    /// No provider offers the requested algorithm.
    #[error("No such {kind} algorithm: {name}")]
    AlgorithmUnavailable { kind: AlgorithmKind, name: String },

    /// A provider looked up by name is not registered.
    #[error("Security provider not found: {0}")]
    ProviderNotFound(String),

    /// Key derivation, parameter generation or the cipher transform failed.
    ///
    /// Carries no detail so that padding and tag failures look identical.
    #[error("Cryptographic operation failed")]
    CryptoOperation,

    /// The engine was asked to run in the direction it was not built for.
    #[error("Engine initialized for {actual}, cannot {expected}")]
    DirectionMismatch {
        expected: CipherMode,
        actual: CipherMode,
    },

    /// Text could not be decoded with the configured alphabet.
    #[error("Invalid encoded text: {0}")]
    InvalidEncoding(String),

    /// Unknown alphabet name.
    #[error("Unknown alphabet: {0}")]
    InvalidAlphabet(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error reports a missing build parameter.
    pub fn is_configuration_incomplete(&self) -> bool {
        matches!(self, Error::ConfigurationIncomplete(_))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<data_encoding::DecodeError> for Error {
    fn from(e: data_encoding::DecodeError) -> Self {
        Error::InvalidEncoding(e.to_string())
    }
}

/// Log the hidden cause of a crypto failure and return the opaque error.
pub(crate) fn crypto_failure(cause: impl fmt::Display) -> Error {
    tracing::debug!(%cause, "cryptographic operation failed");
    Error::CryptoOperation
}
