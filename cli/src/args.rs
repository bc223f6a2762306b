//! # CLI Argument Definitions
//!
//! - `keystore keystore [create|login]` - Open a keystore session
//! - `keystore aes [generate|load|encrypt|decrypt|list]` - Symmetric keys
//! - `keystore rsa [generate|encrypt|decrypt|key|list]` - RSA key pairs
//! - `keystore dsa [generate|sign|verify|key|list]` - DSA key pairs
//! - `keystore aliases [--filter PREFIX]` - Aliases in the keystore
//! - `keystore public-keys` - Published public keys
//!
//! ## Global Options
//!
//! - `-v, --verbose` - Increase verbosity level
//! - `-c, --config <PATH>` - Path to configuration file
//! - `--base-url`, `--keystore`, `--password` - Connection settings, also read
//!   from `KEYSTORE_BASE_URL`, `KEYSTORE_NAME` and `KEYSTORE_PASSWORD`
//! - `-o, --output <FILE>` - Write the result to a file instead of stdout

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use keystore_core::{KeySize, RandomAlgorithm};

/// Client for the remote keystore service.
#[derive(Debug, Parser)]
#[command(name = "keystore")]
#[command(author, version, about = "Client for the remote keystore service")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: ~/.keystore-cli/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: Connection,

    /// Write the result to this file instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to connect and which keystore to open.
#[derive(Debug, Clone, Default, Args)]
pub struct Connection {
    /// Service origin, overriding the config file
    #[arg(long, global = true, env = "KEYSTORE_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Keystore name, overriding the config file
    #[arg(long, global = true, env = "KEYSTORE_NAME", value_name = "NAME")]
    pub keystore: Option<String>,

    /// Keystore password
    #[arg(
        long,
        global = true,
        env = "KEYSTORE_PASSWORD",
        hide_env_values = true,
        value_name = "PASSWORD"
    )]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create or open a keystore
    Keystore {
        #[command(subcommand)]
        command: KeystoreCommands,
    },

    /// Symmetric AES keys
    Aes {
        #[command(subcommand)]
        command: AesCommands,
    },

    /// RSA key pairs
    Rsa {
        #[command(subcommand)]
        command: RsaCommands,
    },

    /// DSA key pairs
    Dsa {
        #[command(subcommand)]
        command: DsaCommands,
    },

    /// List aliases in the keystore
    Aliases {
        /// Only aliases starting with this prefix
        #[arg(long, value_name = "PREFIX")]
        filter: Option<String>,
    },

    /// List every published public key
    PublicKeys,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum KeystoreCommands {
    /// Create a new keystore protected by the password
    Create,
    /// Check the keystore name and password
    Login,
}

/// Arguments shared by every `generate` subcommand.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Key name; the service prefixes it with the algorithm
    pub name: String,

    /// Key length in bits
    #[arg(short, long, value_name = "BITS")]
    pub size: Option<KeySize>,

    /// Randomness source (DRBG, NONCEANDIV, SHA1PRNG)
    #[arg(short, long, value_name = "ALGORITHM")]
    pub random: Option<RandomAlgorithm>,
}

/// A text operand, given inline or read from a file.
#[derive(Debug, Clone, Default, Args)]
pub struct TextSource {
    /// The text itself
    pub text: Option<String>,

    /// Read the text from this file
    #[arg(short, long, value_name = "FILE", conflicts_with = "text")]
    pub input: Option<PathBuf>,
}

/// An alias and the text to run through it.
#[derive(Debug, Clone, Args)]
pub struct KeyText {
    /// Key alias, e.g. `aes_mykey`
    pub alias: String,

    #[command(flatten)]
    pub source: TextSource,
}

#[derive(Debug, Subcommand)]
pub enum AesCommands {
    /// Generate a key and print its material
    Generate(GenerateArgs),
    /// Print the material of a stored key
    Load {
        alias: String,
    },
    Encrypt(KeyText),
    Decrypt(KeyText),
    /// List AES aliases in the keystore
    List,
}

#[derive(Debug, Subcommand)]
pub enum RsaCommands {
    /// Generate a key pair and print both halves
    Generate(GenerateArgs),
    /// Encrypt with any published public key; no password needed
    Encrypt(KeyText),
    Decrypt(KeyText),
    /// Print one half of a key pair
    Key {
        alias: String,
        /// Print the private half instead of the public one
        #[arg(long)]
        private: bool,
    },
    /// List RSA aliases in the keystore
    List {
        /// List every key usable for encryption, published ones included
        #[arg(long)]
        public: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum DsaCommands {
    /// Generate a key pair and print both halves
    Generate(GenerateArgs),
    /// Sign text with a private key
    Sign(KeyText),
    /// Check a signature against a published key
    Verify {
        #[command(flatten)]
        key: KeyText,
        /// Signature produced by `dsa sign`
        #[arg(long, value_name = "SIGNATURE")]
        signature: String,
    },
    /// Print one half of a key pair
    Key {
        alias: String,
        #[arg(long)]
        private: bool,
    },
    /// List DSA aliases in the keystore
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_counts() {
        let cli = parse(&["keystore", "-vv", "public-keys"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::PublicKeys));
    }

    #[test]
    fn generate_parses_size_and_random() {
        let cli = parse(&[
            "keystore", "aes", "generate", "mykey", "--size", "256", "--random", "DRBG",
        ]);
        let Commands::Aes {
            command: AesCommands::Generate(args),
        } = cli.command
        else {
            panic!("expected aes generate");
        };
        assert_eq!(args.name, "mykey");
        assert_eq!(args.size, Some(KeySize(256)));
        assert_eq!(args.random, Some(RandomAlgorithm::Drbg));
    }

    #[test]
    fn generate_size_is_optional() {
        let cli = parse(&["keystore", "rsa", "generate", "k"]);
        let Commands::Rsa {
            command: RsaCommands::Generate(args),
        } = cli.command
        else {
            panic!("expected rsa generate");
        };
        assert!(args.size.is_none());
    }

    #[test]
    fn non_numeric_size_is_rejected() {
        assert!(Cli::try_parse_from(["keystore", "aes", "generate", "k", "-s", "big"]).is_err());
    }

    #[test]
    fn global_connection_flags_after_subcommand() {
        let cli = parse(&[
            "keystore",
            "aes",
            "load",
            "aes_k",
            "--keystore",
            "main",
            "--password",
            "pw",
            "--base-url",
            "http://127.0.0.1:9",
        ]);
        assert_eq!(cli.connection.keystore.as_deref(), Some("main"));
        assert_eq!(cli.connection.password.as_deref(), Some("pw"));
        assert_eq!(cli.connection.base_url.as_deref(), Some("http://127.0.0.1:9"));
    }

    #[test]
    fn text_and_input_conflict() {
        let result = Cli::try_parse_from([
            "keystore", "aes", "encrypt", "aes_k", "hello", "--input", "file.txt",
        ]);
        assert!(result.is_err());

        let cli = parse(&["keystore", "aes", "encrypt", "aes_k", "--input", "file.txt"]);
        let Commands::Aes {
            command: AesCommands::Encrypt(key),
        } = cli.command
        else {
            panic!("expected aes encrypt");
        };
        assert_eq!(key.alias, "aes_k");
        assert!(key.source.text.is_none());
        assert_eq!(key.source.input, Some(PathBuf::from("file.txt")));
    }

    #[test]
    fn verify_requires_signature() {
        assert!(Cli::try_parse_from(["keystore", "dsa", "verify", "dsa_k", "msg"]).is_err());
        let cli = parse(&["keystore", "dsa", "verify", "dsa_k", "msg", "--signature", "ab12"]);
        let Commands::Dsa {
            command: DsaCommands::Verify { key, signature },
        } = cli.command
        else {
            panic!("expected dsa verify");
        };
        assert_eq!(key.source.text.as_deref(), Some("msg"));
        assert_eq!(signature, "ab12");
    }

    #[test]
    fn output_flag_is_global() {
        let cli = parse(&["keystore", "rsa", "key", "rsa_k", "-o", "out.pem"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.pem")));
    }
}
