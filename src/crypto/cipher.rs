//! PBES2 ciphers: AES-CBC and AES-GCM keyed through PBKDF2.

use crate::crypto::kdf::SecretKey;
use crate::crypto::params::AlgorithmParameters;
use crate::crypto::scheme::{CipherKind, Pbes2Scheme};
use crate::crypto::CipherMode;
use crate::error::{crypto_failure, Error, Result};
use aes::{Aes128, Aes256};
use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use std::sync::atomic::{AtomicBool, Ordering};
use zeroize::Zeroizing;

/// A named cipher transformation.
///
/// An engine is initialized once for a direction and then performs
/// single-shot transforms. Authenticated modes may refuse a second encryption
/// under the same key and IV.
pub trait CipherEngine: Send + Sync {
    /// Transformation name.
    fn transformation(&self) -> &str;

    /// Bind the engine to a direction, key and parameters.
    fn init(
        &mut self,
        mode: CipherMode,
        key: &SecretKey,
        params: &AlgorithmParameters,
    ) -> Result<()>;

    /// Parameters in effect after `init`, including any IV the engine chose.
    fn parameters(&self) -> Option<AlgorithmParameters>;

    /// Encrypt or decrypt `input` in one call.
    fn do_final(&self, input: &[u8]) -> Result<Vec<u8>>;
}

struct Bound {
    mode: CipherMode,
    key: Zeroizing<Vec<u8>>,
    iv: Vec<u8>,
    params: AlgorithmParameters,
    /// Set once a GCM nonce has been used for encryption.
    nonce_used: AtomicBool,
}

/// Cipher for a `PBEWithHmac<digest>AndAES_<bits>[_GCM]` scheme.
///
/// The AES key is PBKDF2 over the supplied key material, using the salt and
/// iteration count from the algorithm parameters.
///
/// A GCM engine bound for encryption encrypts exactly once: a second call would
/// reuse the nonce under the same key and fails instead.
pub struct Pbes2Cipher {
    scheme: Pbes2Scheme,
    transformation: String,
    bound: Option<Bound>,
}

impl Pbes2Cipher {
    pub fn new(scheme: Pbes2Scheme) -> Self {
        Self {
            scheme,
            transformation: scheme.name(),
            bound: None,
        }
    }

    fn random_iv(&self) -> Vec<u8> {
        let mut iv = vec![0u8; self.scheme.kind.iv_len()];
        rand::thread_rng().fill_bytes(&mut iv);
        iv
    }
}

impl CipherEngine for Pbes2Cipher {
    fn transformation(&self) -> &str {
        &self.transformation
    }

    fn init(
        &mut self,
        mode: CipherMode,
        key: &SecretKey,
        params: &AlgorithmParameters,
    ) -> Result<()> {
        if key.material().is_empty() {
            return Err(crypto_failure("empty key material"));
        }

        let iv = match (mode, params.iv()) {
            (_, Some(iv)) if iv.len() != self.scheme.kind.iv_len() => {
                return Err(crypto_failure(format!(
                    "IV must be {} bytes, got {}",
                    self.scheme.kind.iv_len(),
                    iv.len()
                )));
            }
            (_, Some(iv)) => iv.to_vec(),
            (CipherMode::Encrypt, None) => self.random_iv(),
            (CipherMode::Decrypt, None) => {
                return Err(crypto_failure("missing IV for decryption"));
            }
        };

        let mut aes_key = Zeroizing::new(vec![0u8; self.scheme.key_size]);
        self.scheme.prf.pbkdf2(
            key.material(),
            params.salt(),
            params.iteration_count(),
            &mut aes_key,
        )?;

        tracing::trace!(
            transformation = %self.transformation,
            %mode,
            "cipher initialized"
        );

        self.bound = Some(Bound {
            mode,
            key: aes_key,
            params: params.clone().with_iv(iv.clone()),
            iv,
            nonce_used: AtomicBool::new(false),
        });
        Ok(())
    }

    fn parameters(&self) -> Option<AlgorithmParameters> {
        self.bound.as_ref().map(|b| b.params.clone())
    }

    fn do_final(&self, input: &[u8]) -> Result<Vec<u8>> {
        let bound = self
            .bound
            .as_ref()
            .ok_or_else(|| crypto_failure("cipher not initialized"))?;

        match (self.scheme.kind, bound.mode) {
            (CipherKind::Cbc, CipherMode::Encrypt) => cbc_encrypt(&bound.key, &bound.iv, input),
            (CipherKind::Cbc, CipherMode::Decrypt) => cbc_decrypt(&bound.key, &bound.iv, input),
            (CipherKind::Gcm, CipherMode::Encrypt) => {
                if bound.nonce_used.swap(true, Ordering::SeqCst) {
                    return Err(crypto_failure("GCM IV reuse"));
                }
                gcm_encrypt(&bound.key, &bound.iv, input)
            }
            (CipherKind::Gcm, CipherMode::Decrypt) => gcm_decrypt(&bound.key, &bound.iv, input),
        }
    }
}

fn unsupported_key(len: usize) -> Error {
    crypto_failure(format!("unsupported AES key length: {len}"))
}

fn cbc_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(crypto_failure)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(crypto_failure)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        n => return Err(unsupported_key(n)),
    };
    Ok(ciphertext)
}

fn cbc_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let plaintext = match key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(crypto_failure)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(crypto_failure)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        n => return Err(unsupported_key(n)),
    };
    plaintext.map_err(|_| crypto_failure("bad padding"))
}

fn gcm_encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = Nonce::from_slice(nonce);
    let ciphertext = match key.len() {
        16 => Aes128Gcm::new_from_slice(key)
            .map_err(crypto_failure)?
            .encrypt(nonce, plaintext),
        32 => Aes256Gcm::new_from_slice(key)
            .map_err(crypto_failure)?
            .encrypt(nonce, plaintext),
        n => return Err(unsupported_key(n)),
    };
    ciphertext.map_err(|e| crypto_failure(format!("encryption failed: {e}")))
}

fn gcm_decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let nonce = Nonce::from_slice(nonce);
    let plaintext = match key.len() {
        16 => Aes128Gcm::new_from_slice(key)
            .map_err(crypto_failure)?
            .decrypt(nonce, ciphertext),
        32 => Aes256Gcm::new_from_slice(key)
            .map_err(crypto_failure)?
            .decrypt(nonce, ciphertext),
        n => return Err(unsupported_key(n)),
    };
    plaintext.map_err(|_| crypto_failure("authentication tag mismatch"))
}
