//! pbe-util - mask secrets with password based encryption.
//!
//! Encrypts a secret into printable text and back, printing the IV and
//! algorithm parameters needed to reverse the operation.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pbe_util::config::DEFAULT_SALT_LENGTH;
use pbe_util::{AlgorithmParameters, Alphabet, Builder, PbeConfig, Provider, Registry};
use rand::RngCore;
use serde::Serialize;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "pbe-util")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Password based encryption of short secrets",
    long_about = "Encrypts secrets such as credential store entries with a password derived key and renders them as printable text."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a secret and print it encoded
    Encrypt {
        #[command(flatten)]
        key: KeyArgs,

        /// Secret to encrypt (default: read from stdin)
        #[arg(long)]
        secret: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decrypt an encoded secret
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,

        /// Encoded ciphertext
        ciphertext: String,

        /// Algorithm parameters printed by `encrypt`, as hex
        #[arg(long, conflicts_with = "iv")]
        params: Option<String>,

        /// IV printed by `encrypt`, encoded with the chosen alphabet
        #[arg(long, conflicts_with = "params")]
        iv: Option<String>,
    },

    /// List available algorithms
    Algorithms,

    /// Print a random salt as hex
    Salt {
        /// Salt length in bytes
        #[arg(long, default_value_t = DEFAULT_SALT_LENGTH)]
        length: usize,
    },
}

#[derive(Args)]
struct KeyArgs {
    /// Salt as text
    #[arg(long, conflicts_with = "salt_hex", required_unless_present = "salt_hex")]
    salt: Option<String>,

    /// Salt as hex
    #[arg(long)]
    salt_hex: Option<String>,

    /// Iteration count
    #[arg(long)]
    iteration: u32,

    /// Key derivation algorithm (default: PBEWithHmacSHA1andAES_128)
    #[arg(long)]
    key_algorithm: Option<String>,

    /// Cipher transformation (default: the key algorithm)
    #[arg(long)]
    transformation: Option<String>,

    /// Alphabet: base64, base64url, base64-nopad, base32, base32-lower, base32hex
    #[arg(long, default_value = "base64")]
    alphabet: Alphabet,

    /// Password (default: prompt)
    #[arg(long)]
    password: Option<String>,
}

impl KeyArgs {
    fn builder(self) -> Result<Builder> {
        let salt = match (self.salt, self.salt_hex) {
            (Some(text), _) => text.into_bytes(),
            (None, Some(hex_salt)) => hex::decode(hex_salt).context("invalid hex salt")?,
            (None, None) => bail!("a salt is required"),
        };
        let password = match self.password {
            Some(password) => password,
            None => prompt_password("Password: ")?,
        };

        let config = PbeConfig {
            key_algorithm: self.key_algorithm,
            parameters_algorithm: self.transformation.clone(),
            transformation: self.transformation,
            iteration: Some(self.iteration),
            salt: Some(salt),
            password: Some(Zeroizing::new(password)),
            alphabet: self.alphabet,
            ..PbeConfig::default()
        };
        Ok(Builder::from_config(config))
    }
}

#[derive(Serialize)]
struct EncryptOutput {
    ciphertext: String,
    iv: Option<String>,
    algorithm: String,
    params: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Encrypt { key, secret, json } => cmd_encrypt(key, secret, json),

        Commands::Decrypt {
            key,
            ciphertext,
            params,
            iv,
        } => cmd_decrypt(key, &ciphertext, params, iv),

        Commands::Algorithms => cmd_algorithms(),

        Commands::Salt { length } => cmd_salt(length),
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Ok(password),
        Err(_) => {
            eprint!("{}", prompt);
            io::stderr().flush()?;
            let mut password = String::new();
            io::stdin().read_line(&mut password)?;
            Ok(password.trim().to_string())
        }
    }
}

fn cmd_encrypt(key: KeyArgs, secret: Option<String>, json: bool) -> Result<()> {
    let secret = match secret {
        Some(secret) => secret,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read secret from stdin")?;
            input.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let engine = key.builder()?.encrypt_mode().build()?;
    let output = EncryptOutput {
        ciphertext: engine.encrypt_and_encode(&secret)?,
        iv: engine.encoded_iv(),
        algorithm: engine.algorithm_parameters().algorithm().to_string(),
        params: hex::encode(engine.algorithm_parameters().to_bytes()?),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Ciphertext: {}", output.ciphertext);
        println!("IV:         {}", output.iv.as_deref().unwrap_or("(none)"));
        println!("Algorithm:  {}", output.algorithm);
        println!("Params:     {}", output.params);
    }

    Ok(())
}

fn cmd_decrypt(
    key: KeyArgs,
    ciphertext: &str,
    params: Option<String>,
    iv: Option<String>,
) -> Result<()> {
    let mut builder = key.builder()?.decrypt_mode();
    if let Some(params) = params {
        let bytes = hex::decode(params).context("invalid hex parameters")?;
        builder = builder.algorithm_parameters(AlgorithmParameters::from_bytes(&bytes)?);
    }
    if let Some(iv) = iv {
        builder = builder.encoded_iv(iv);
    }

    let engine = builder.build()?;
    let secret = engine
        .decode_and_decrypt(ciphertext)
        .context("wrong password or parameters, or corrupted ciphertext")?;
    println!("{}", secret.as_str());

    Ok(())
}

fn cmd_algorithms() -> Result<()> {
    for provider in Registry::default().providers() {
        println!("Provider: {}", provider.name());
        for name in provider.algorithms() {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn cmd_salt(length: usize) -> Result<()> {
    if length == 0 {
        bail!("salt length must be at least 1");
    }
    let mut salt = vec![0u8; length];
    rand::thread_rng().fill_bytes(&mut salt);
    println!("{}", hex::encode(salt));
    Ok(())
}
