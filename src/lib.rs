//! Password Based Encryption Helper
//!
//! Masks short secrets, such as credential store entries, as printable text.
//! A key is derived from a password, salt and iteration count; the secret is
//! encrypted with it and the ciphertext rendered through a binary-to-text
//! alphabet.
//!
//! # Features
//!
//! - **Builder with default cascades**: transformation, parameters algorithm,
//!   cipher salt and cipher iteration all default from the key settings
//! - **PBES2 ciphers**: AES-CBC and AES-GCM keyed through PBKDF2-HMAC
//! - **Pluggable providers**: algorithms resolve by name from an injected
//!   [`Registry`], optionally pinned to one [`Provider`]
//! - **Alphabets**: base64 and base32 families
//!
//! # Architecture
//!
//! ```text
//! Builder → resolve defaults → derive key → init cipher → PasswordBasedEncryption
//! secret → NFKC → UTF-8 → cipher → alphabet → text
//! ```
//!
//! # Example
//!
//! ```rust
//! use pbe_util::PasswordBasedEncryption;
//!
//! let encryptor = PasswordBasedEncryption::builder()
//!     .password("secret")
//!     .salt("12345678")
//!     .iteration(200)
//!     .encrypt_mode()
//!     .build()
//!     .unwrap();
//! let masked = encryptor.encrypt_and_encode("hello world").unwrap();
//! let iv = encryptor.encoded_iv().unwrap();
//!
//! let decryptor = PasswordBasedEncryption::builder()
//!     .password("secret")
//!     .salt("12345678")
//!     .iteration(200)
//!     .encoded_iv(iv)
//!     .decrypt_mode()
//!     .build()
//!     .unwrap();
//! assert_eq!(decryptor.decode_and_decrypt(&masked).unwrap().as_str(), "hello world");
//! ```

pub mod builder;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod pbe;

pub use builder::Builder;
pub use config::PbeConfig;
pub use crypto::{AlgorithmParameters, CipherMode, Provider, Registry};
pub use encoding::{Alphabet, Base32Alphabet, Base64Alphabet};
pub use error::{Error, Result};
pub use pbe::PasswordBasedEncryption;
