//! The built, immutable encrypt-or-decrypt engine.

use crate::builder::Builder;
use crate::crypto::{AlgorithmParameters, CipherEngine, CipherMode};
use crate::encoding::Alphabet;
use crate::error::{crypto_failure, Error, Result};
use std::fmt;
use tracing::trace;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, Zeroizing};

/// Encrypts secrets to text, or decrypts text back to secrets.
///
/// The direction, key and parameters are fixed when the engine is built.
pub struct PasswordBasedEncryption {
    cipher: Box<dyn CipherEngine>,
    algorithm_parameters: AlgorithmParameters,
    alphabet: Alphabet,
    mode: CipherMode,
}

impl PasswordBasedEncryption {
    /// Start configuring a new engine.
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn new(
        cipher: Box<dyn CipherEngine>,
        algorithm_parameters: AlgorithmParameters,
        alphabet: Alphabet,
        mode: CipherMode,
    ) -> Self {
        Self {
            cipher,
            algorithm_parameters,
            alphabet,
            mode,
        }
    }

    fn ensure_mode(&self, expected: CipherMode) -> Result<()> {
        if self.mode != expected {
            return Err(Error::DirectionMismatch {
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }

    /// Encrypt a secret and encode the ciphertext with the engine's alphabet.
    ///
    /// The secret is NFKC-normalized before encryption, so equivalent input
    /// from different input methods encrypts the same way.
    ///
    /// A `_GCM` engine encrypts once; further calls fail with
    /// [`Error::CryptoOperation`] rather than reuse its nonce.
    pub fn encrypt_and_encode(&self, secret: &str) -> Result<String> {
        self.ensure_mode(CipherMode::Encrypt)?;

        let normalized: Zeroizing<String> = Zeroizing::new(secret.nfkc().collect());
        let ciphertext = self.cipher.do_final(normalized.as_bytes())?;
        trace!(
            plaintext_len = normalized.len(),
            ciphertext_len = ciphertext.len(),
            "encrypted payload"
        );

        Ok(self.alphabet.encode(&ciphertext))
    }

    /// [`encrypt_and_encode`](Self::encrypt_and_encode) for a character buffer.
    pub fn encrypt_chars_and_encode(&self, secret: &[char]) -> Result<String> {
        let secret: Zeroizing<String> = Zeroizing::new(secret.iter().collect());
        self.encrypt_and_encode(&secret)
    }

    /// Decode text with the engine's alphabet and decrypt it.
    ///
    /// Bad padding, a failed tag check and a non UTF-8 result all fail with
    /// the same [`Error::CryptoOperation`].
    pub fn decode_and_decrypt(&self, encoded: &str) -> Result<Zeroizing<String>> {
        self.ensure_mode(CipherMode::Decrypt)?;

        let ciphertext = self.alphabet.decode(encoded)?;
        let plaintext = self.cipher.do_final(&ciphertext)?;
        trace!(
            ciphertext_len = ciphertext.len(),
            plaintext_len = plaintext.len(),
            "decrypted payload"
        );

        String::from_utf8(plaintext).map(Zeroizing::new).map_err(|e| {
            e.into_bytes().zeroize();
            crypto_failure("decrypted payload is not valid UTF-8")
        })
    }

    /// Parameters the cipher runs with.
    ///
    /// After encryption these carry the IV the cipher chose; a decrypting
    /// engine must be built with the same parameters.
    pub fn algorithm_parameters(&self) -> &AlgorithmParameters {
        &self.algorithm_parameters
    }

    /// IV from the parameters, encoded with the engine's alphabet.
    ///
    /// Returns `None` when the parameters carry no IV.
    pub fn encoded_iv(&self) -> Option<String> {
        self.algorithm_parameters
            .iv()
            .map(|iv| self.alphabet.encode(iv))
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }
}

impl fmt::Debug for PasswordBasedEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordBasedEncryption")
            .field("transformation", &self.cipher.transformation())
            .field("algorithm_parameters", &self.algorithm_parameters)
            .field("alphabet", &self.alphabet)
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Base32Alphabet;

    fn builder() -> Builder {
        PasswordBasedEncryption::builder()
            .password("secret")
            .salt([1, 2, 3, 4, 5, 6, 7, 8])
            .iteration(200)
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let encryptor = builder().encrypt_mode().build().unwrap();
        let masked = encryptor.encrypt_and_encode("hello world").unwrap();

        assert!(!masked.is_empty());
        assert_ne!(masked, "hello world");

        let decryptor = builder()
            .algorithm_parameters(encryptor.algorithm_parameters().clone())
            .decrypt_mode()
            .build()
            .unwrap();

        assert_eq!(decryptor.decode_and_decrypt(&masked).unwrap().as_str(), "hello world");
    }

    #[test]
    fn test_direction_is_enforced() {
        let encryptor = builder().encrypt_mode().build().unwrap();
        let result = encryptor.decode_and_decrypt("AAAA");
        assert!(matches!(
            result,
            Err(Error::DirectionMismatch {
                expected: CipherMode::Decrypt,
                actual: CipherMode::Encrypt
            })
        ));

        let decryptor = builder().iv([0u8; 16]).decrypt_mode().build().unwrap();
        assert!(matches!(
            decryptor.encrypt_and_encode("x"),
            Err(Error::DirectionMismatch { .. })
        ));
    }

    #[test]
    fn test_cbc_engine_is_reusable() {
        let encryptor = builder().encrypt_mode().build().unwrap();
        let first = encryptor.encrypt_and_encode("same").unwrap();
        let second = encryptor.encrypt_and_encode("same").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_gcm_engine_encrypts_once() {
        let encryptor = builder()
            .key_algorithm("PBEWithHmacSHA256AndAES_128_GCM")
            .encrypt_mode()
            .build()
            .unwrap();
        let masked = encryptor.encrypt_and_encode("AAAAAAAAAAAAAAAA").unwrap();

        assert!(matches!(
            encryptor.encrypt_and_encode("hunter2-password"),
            Err(Error::CryptoOperation)
        ));

        let decryptor = builder()
            .key_algorithm("PBEWithHmacSHA256AndAES_128_GCM")
            .algorithm_parameters(encryptor.algorithm_parameters().clone())
            .decrypt_mode()
            .build()
            .unwrap();
        assert_eq!(
            decryptor.decode_and_decrypt(&masked).unwrap().as_str(),
            "AAAAAAAAAAAAAAAA"
        );
    }

    #[test]
    fn test_encoded_iv_uses_alphabet() {
        let alphabet = Alphabet::Base32(Base32Alphabet::Lowercase);
        let encryptor = builder().alphabet(alphabet).encrypt_mode().build().unwrap();

        let encoded = encryptor.encoded_iv().unwrap();
        assert_eq!(
            alphabet.decode(&encoded).unwrap(),
            encryptor.algorithm_parameters().iv().unwrap()
        );
    }

    #[test]
    fn test_chars_and_text_encrypt_alike() {
        let encryptor = builder().encrypt_mode().build().unwrap();
        let chars: Vec<char> = "hello".chars().collect();

        assert_eq!(
            encryptor.encrypt_chars_and_encode(&chars).unwrap(),
            encryptor.encrypt_and_encode("hello").unwrap()
        );
    }

    #[test]
    fn test_compatibility_forms_encrypt_alike() {
        let encryptor = builder().encrypt_mode().build().unwrap();

        // U+FB01 LATIN SMALL LIGATURE FI normalizes to "fi"
        assert_eq!(
            encryptor.encrypt_and_encode("\u{FB01}le").unwrap(),
            encryptor.encrypt_and_encode("file").unwrap()
        );
        // decomposed e + combining acute composes to U+00E9
        assert_eq!(
            encryptor.encrypt_and_encode("caf\u{0065}\u{0301}").unwrap(),
            encryptor.encrypt_and_encode("caf\u{00E9}").unwrap()
        );
    }

    #[test]
    fn test_invalid_text_is_an_encoding_error() {
        let decryptor = builder().iv([0u8; 16]).decrypt_mode().build().unwrap();
        assert!(matches!(
            decryptor.decode_and_decrypt("not base64!"),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_debug_shows_transformation() {
        let encryptor = builder().encrypt_mode().build().unwrap();
        let rendered = format!("{encryptor:?}");
        assert!(rendered.contains("PBEWithHmacSHA1AndAES_128"));
        assert!(!rendered.contains("secret"));
    }
}
