//! Providers and the registry that resolves algorithms by name.

use crate::crypto::cipher::{CipherEngine, Pbes2Cipher};
use crate::crypto::kdf::{Argon2Kdf, KeyDerivation, Pbkdf2Kdf};
use crate::crypto::params::{ParameterCodec, Pbes2ParameterCodec};
use crate::crypto::scheme::{Pbes2Scheme, Prf};
use crate::error::{AlgorithmKind, Error, Result};
use std::fmt;
use std::sync::Arc;

/// A source of named algorithm implementations.
///
/// Every lookup hands out a fresh instance; `None` means the provider does
/// not know the name.
pub trait Provider: Send + Sync {
    /// Provider name used for by-name lookup.
    fn name(&self) -> &str;

    fn key_derivation(&self, algorithm: &str) -> Option<Box<dyn KeyDerivation>>;

    fn cipher(&self, transformation: &str) -> Option<Box<dyn CipherEngine>>;

    fn parameter_codec(&self, algorithm: &str) -> Option<Box<dyn ParameterCodec>>;

    /// Names of every algorithm this provider offers.
    fn algorithms(&self) -> Vec<String>;
}

/// Built-in provider backed by the RustCrypto crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    pub const NAME: &'static str = "RustCrypto";
}

impl Provider for RustCryptoProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn key_derivation(&self, algorithm: &str) -> Option<Box<dyn KeyDerivation>> {
        if algorithm.eq_ignore_ascii_case(Argon2Kdf::NAME) {
            return Some(Box::new(Argon2Kdf));
        }
        if let Some(scheme) = Pbes2Scheme::from_name(algorithm) {
            return Some(Box::new(Pbkdf2Kdf::for_scheme(scheme)));
        }
        Pbkdf2Kdf::from_name(algorithm).map(|kdf| Box::new(kdf) as Box<dyn KeyDerivation>)
    }

    fn cipher(&self, transformation: &str) -> Option<Box<dyn CipherEngine>> {
        Pbes2Scheme::from_name(transformation)
            .map(|scheme| Box::new(Pbes2Cipher::new(scheme)) as Box<dyn CipherEngine>)
    }

    fn parameter_codec(&self, algorithm: &str) -> Option<Box<dyn ParameterCodec>> {
        Pbes2Scheme::from_name(algorithm)
            .map(|scheme| Box::new(Pbes2ParameterCodec::new(scheme)) as Box<dyn ParameterCodec>)
    }

    fn algorithms(&self) -> Vec<String> {
        let mut names: Vec<String> = Pbes2Scheme::all().iter().map(Pbes2Scheme::name).collect();
        names.extend(Prf::ALL.into_iter().map(|prf| Pbkdf2Kdf::new(prf).algorithm().to_string()));
        names.push(Argon2Kdf::NAME.to_string());
        names
    }
}

/// Ordered set of providers.
///
/// Unpinned lookups take the first provider that knows the name.
#[derive(Clone)]
pub struct Registry {
    providers: Vec<Arc<dyn Provider>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Append a provider; earlier providers keep precedence.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    /// Look up a provider by exact name.
    pub fn provider(&self, name: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .iter()
            .find(|p| p.name() == name)
            .cloned()
            .ok_or_else(|| Error::ProviderNotFound(name.to_string()))
    }

    fn resolve<T>(
        &self,
        kind: AlgorithmKind,
        name: &str,
        pin: Option<&Arc<dyn Provider>>,
        lookup: impl Fn(&dyn Provider) -> Option<T>,
    ) -> Result<T> {
        let found = match pin {
            Some(provider) => lookup(provider.as_ref()),
            None => self.providers.iter().find_map(|p| lookup(p.as_ref())),
        };
        found.ok_or_else(|| Error::AlgorithmUnavailable {
            kind,
            name: name.to_string(),
        })
    }

    pub fn resolve_key_derivation(
        &self,
        name: &str,
        pin: Option<&Arc<dyn Provider>>,
    ) -> Result<Box<dyn KeyDerivation>> {
        self.resolve(AlgorithmKind::KeyDerivation, name, pin, |p| {
            p.key_derivation(name)
        })
    }

    pub fn resolve_cipher(
        &self,
        name: &str,
        pin: Option<&Arc<dyn Provider>>,
    ) -> Result<Box<dyn CipherEngine>> {
        self.resolve(AlgorithmKind::Cipher, name, pin, |p| p.cipher(name))
    }

    pub fn resolve_parameter_codec(
        &self,
        name: &str,
        pin: Option<&Arc<dyn Provider>>,
    ) -> Result<Box<dyn ParameterCodec>> {
        self.resolve(AlgorithmKind::Parameters, name, pin, |p| {
            p.parameter_codec(name)
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new().with_provider(Arc::new(RustCryptoProvider))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl Provider for Empty {
        fn name(&self) -> &str {
            "Empty"
        }
        fn key_derivation(&self, _: &str) -> Option<Box<dyn KeyDerivation>> {
            None
        }
        fn cipher(&self, _: &str) -> Option<Box<dyn CipherEngine>> {
            None
        }
        fn parameter_codec(&self, _: &str) -> Option<Box<dyn ParameterCodec>> {
            None
        }
        fn algorithms(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_default_registry_resolves_default_algorithm() {
        let registry = Registry::default();
        let name = crate::config::DEFAULT_PBE_ALGORITHM;

        assert!(registry.resolve_key_derivation(name, None).is_ok());
        assert!(registry.resolve_cipher(name, None).is_ok());
        assert!(registry.resolve_parameter_codec(name, None).is_ok());
    }

    #[test]
    fn test_unknown_algorithm_reports_kind() {
        let registry = Registry::default();

        match registry.resolve_cipher("DES/ECB/NoPadding", None) {
            Err(Error::AlgorithmUnavailable { kind, name }) => {
                assert_eq!(kind, AlgorithmKind::Cipher);
                assert_eq!(name, "DES/ECB/NoPadding");
            }
            _ => panic!("expected AlgorithmUnavailable"),
        }
        assert!(matches!(
            registry.resolve_parameter_codec("Argon2id", None),
            Err(Error::AlgorithmUnavailable {
                kind: AlgorithmKind::Parameters,
                ..
            })
        ));
    }

    #[test]
    fn test_provider_lookup_by_name() {
        let registry = Registry::default();

        assert_eq!(registry.provider("RustCrypto").unwrap().name(), "RustCrypto");
        assert!(matches!(
            registry.provider("SunJCE"),
            Err(Error::ProviderNotFound(name)) if name == "SunJCE"
        ));
    }

    #[test]
    fn test_pinned_lookup_ignores_other_providers() {
        let empty: Arc<dyn Provider> = Arc::new(Empty);
        let registry = Registry::default().with_provider(empty.clone());

        assert!(registry
            .resolve_key_derivation("PBKDF2WithHmacSHA256", None)
            .is_ok());
        assert!(registry
            .resolve_key_derivation("PBKDF2WithHmacSHA256", Some(&empty))
            .is_err());
    }

    #[test]
    fn test_first_provider_wins() {
        let registry = Registry::new()
            .with_provider(Arc::new(Empty))
            .with_provider(Arc::new(RustCryptoProvider));

        let kdf = registry.resolve_key_derivation("argon2ID", None).unwrap();
        assert_eq!(kdf.algorithm(), "Argon2id");
        assert_eq!(format!("{registry:?}"), r#"["Empty", "RustCrypto"]"#);
        let names: Vec<&str> = registry.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Empty", "RustCrypto"]);
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        assert!(Registry::new()
            .resolve_key_derivation(crate::config::DEFAULT_PBE_ALGORITHM, None)
            .is_err());
    }

    #[test]
    fn test_algorithm_listing_resolves() {
        let provider = RustCryptoProvider;
        for name in provider.algorithms() {
            assert!(provider.key_derivation(&name).is_some(), "{name}");
        }
    }
}
