//! Builder assembling a [`PasswordBasedEncryption`] engine.

use crate::config::{PbeConfig, ResolvedConfig};
use crate::crypto::{
    AlgorithmParameters, CipherEngine, CipherMode, PbeKeySpec, PbeParameterSpec, Provider,
    Registry, SecretKey,
};
use crate::encoding::Alphabet;
use crate::error::Result;
use crate::pbe::PasswordBasedEncryption;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

/// Collects the parameters of a PBE engine.
///
/// Iteration count, salt, password and a direction are required. Everything
/// else defaults from the key algorithm, which itself defaults to
/// [`DEFAULT_PBE_ALGORITHM`](crate::config::DEFAULT_PBE_ALGORITHM).
///
/// ```rust
/// use pbe_util::PasswordBasedEncryption;
///
/// let encryptor = PasswordBasedEncryption::builder()
///     .password("secret")
///     .salt([1, 2, 3, 4, 5, 6, 7, 8])
///     .iteration(200)
///     .encrypt_mode()
///     .build()
///     .unwrap();
/// let masked = encryptor.encrypt_and_encode("hello world").unwrap();
///
/// let decryptor = PasswordBasedEncryption::builder()
///     .password("secret")
///     .salt([1, 2, 3, 4, 5, 6, 7, 8])
///     .iteration(200)
///     .algorithm_parameters(encryptor.algorithm_parameters().clone())
///     .decrypt_mode()
///     .build()
///     .unwrap();
/// assert_eq!(decryptor.decode_and_decrypt(&masked).unwrap().as_str(), "hello world");
/// ```
pub struct Builder {
    config: PbeConfig,
    registry: Arc<Registry>,
    provider: Option<Arc<dyn Provider>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Builder resolving algorithms from [`Registry::default`].
    pub fn new() -> Self {
        Self::with_registry(Arc::new(Registry::default()))
    }

    /// Builder resolving algorithms from the given registry.
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            config: PbeConfig::default(),
            registry,
            provider: None,
        }
    }

    /// Builder starting from an existing options record.
    pub fn from_config(config: PbeConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Password the key is derived from.
    pub fn password(mut self, password: impl AsRef<str>) -> Self {
        self.config.password = Some(Zeroizing::new(password.as_ref().to_string()));
        self
    }

    /// Password given as a character buffer.
    pub fn password_chars(mut self, password: &[char]) -> Self {
        self.config.password = Some(Zeroizing::new(password.iter().collect()));
        self
    }

    /// Raw IV, used only when decrypting.
    pub fn iv(mut self, iv: impl AsRef<[u8]>) -> Self {
        self.config.iv = Some(iv.as_ref().to_vec());
        self
    }

    /// IV encoded with the builder's alphabet, used only when decrypting.
    ///
    /// Decoded at build time, so the alphabet may be set afterwards.
    pub fn encoded_iv(mut self, encoded_iv: impl Into<String>) -> Self {
        self.config.encoded_iv = Some(encoded_iv.into());
        self
    }

    pub fn transformation(mut self, transformation: impl Into<String>) -> Self {
        self.config.transformation = Some(transformation.into());
        self
    }

    pub fn parameters_algorithm(mut self, parameters_algorithm: impl Into<String>) -> Self {
        self.config.parameters_algorithm = Some(parameters_algorithm.into());
        self
    }

    /// Salt for key derivation; text is taken as its UTF-8 bytes.
    pub fn salt(mut self, salt: impl AsRef<[u8]>) -> Self {
        self.config.salt = Some(salt.as_ref().to_vec());
        self
    }

    /// Iteration count for key derivation.
    pub fn iteration(mut self, iteration: u32) -> Self {
        self.config.iteration = Some(iteration);
        self
    }

    /// Key derivation algorithm.
    pub fn key_algorithm(mut self, key_algorithm: impl Into<String>) -> Self {
        self.config.key_algorithm = Some(key_algorithm.into());
        self
    }

    /// Derived key length in bits; 0 selects the algorithm's natural length.
    pub fn key_length(mut self, key_length: u32) -> Self {
        self.config.key_length = Some(key_length);
        self
    }

    /// Iteration count for the cipher, defaults to [`iteration`](Self::iteration).
    pub fn cipher_iteration(mut self, cipher_iteration: u32) -> Self {
        self.config.cipher_iteration = Some(cipher_iteration);
        self
    }

    /// Salt for the cipher, defaults to [`salt`](Self::salt).
    pub fn cipher_salt(mut self, cipher_salt: impl AsRef<[u8]>) -> Self {
        self.config.cipher_salt = Some(cipher_salt.as_ref().to_vec());
        self
    }

    /// Pin every algorithm lookup to this provider.
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Pin every algorithm lookup to a registered provider.
    ///
    /// Fails immediately if no provider has that name.
    pub fn provider_name(mut self, provider_name: &str) -> Result<Self> {
        self.provider = Some(self.registry.provider(provider_name)?);
        Ok(self)
    }

    /// Alphabet for ciphertext and IV text.
    pub fn alphabet(mut self, alphabet: Alphabet) -> Self {
        self.config.alphabet = alphabet;
        self
    }

    pub fn encrypt_mode(mut self) -> Self {
        self.config.cipher_mode = Some(CipherMode::Encrypt);
        self
    }

    pub fn decrypt_mode(mut self) -> Self {
        self.config.cipher_mode = Some(CipherMode::Decrypt);
        self
    }

    /// Complete parameters for decryption.
    ///
    /// Only the first call has an effect; later calls are ignored.
    pub fn algorithm_parameters(mut self, algorithm_parameters: AlgorithmParameters) -> Self {
        if self.config.algorithm_parameters.is_none() {
            self.config.algorithm_parameters = Some(algorithm_parameters);
        }
        self
    }

    /// Validate, derive the key and initialize the cipher.
    pub fn build(self) -> Result<PasswordBasedEncryption> {
        let Builder {
            config,
            registry,
            provider,
        } = self;
        let config = config.resolve()?;
        let pin = provider.as_ref();

        debug!(
            key_algorithm = %config.key_algorithm,
            transformation = %config.transformation,
            parameters_algorithm = %config.parameters_algorithm,
            provider = pin.map(|p| p.name()).unwrap_or("<any>"),
            mode = %config.cipher_mode,
            "building PBE engine"
        );

        let key = derive_secret_key(&registry, pin, &config)?;
        let (cipher, params) = create_and_init_cipher(&registry, pin, &config, &key)?;

        Ok(PasswordBasedEncryption::new(
            cipher,
            params,
            config.alphabet,
            config.cipher_mode,
        ))
    }
}

fn derive_secret_key(
    registry: &Registry,
    pin: Option<&Arc<dyn Provider>>,
    config: &ResolvedConfig,
) -> Result<SecretKey> {
    let kdf = registry.resolve_key_derivation(&config.key_algorithm, pin)?;
    let spec = PbeKeySpec {
        password: config.password.as_str(),
        salt: &config.salt,
        iteration_count: config.iteration,
        key_length: config.key_length,
    };

    let partial = kdf.derive(&spec)?;
    Ok(partial.rewrap(config.transformation.as_str()))
}

fn generate_parameters(
    registry: &Registry,
    pin: Option<&Arc<dyn Provider>>,
    config: &ResolvedConfig,
    iv: Option<Vec<u8>>,
) -> Result<AlgorithmParameters> {
    let codec = registry.resolve_parameter_codec(&config.parameters_algorithm, pin)?;
    codec.generate(PbeParameterSpec {
        salt: config.cipher_salt.clone(),
        iteration_count: config.cipher_iteration,
        iv,
    })
}

fn create_and_init_cipher(
    registry: &Registry,
    pin: Option<&Arc<dyn Provider>>,
    config: &ResolvedConfig,
    key: &SecretKey,
) -> Result<(Box<dyn CipherEngine>, AlgorithmParameters)> {
    let mut cipher = registry.resolve_cipher(&config.transformation, pin)?;

    match config.cipher_mode {
        CipherMode::Encrypt => {
            if config.iv.is_some() || config.algorithm_parameters.is_some() {
                debug!("IV and supplied parameters are not used for encryption");
            }
            let params = generate_parameters(registry, pin, config, None)?;
            cipher.init(CipherMode::Encrypt, key, &params)?;
            let params = cipher.parameters().unwrap_or(params);
            Ok((cipher, params))
        }
        CipherMode::Decrypt => {
            let params = match &config.algorithm_parameters {
                Some(supplied) => {
                    debug!(
                        ignored_iv = config.iv.is_some(),
                        "using supplied algorithm parameters"
                    );
                    supplied.clone()
                }
                None => {
                    debug!(has_iv = config.iv.is_some(), "generating algorithm parameters");
                    generate_parameters(registry, pin, config, config.iv.clone())?
                }
            };
            cipher.init(CipherMode::Decrypt, key, &params)?;
            Ok((cipher, params))
        }
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .finish()
    }
}
