//! # CLI Command Handlers
//!
//! Every handler takes a [`Session`] and returns an [`Outcome`]: the text the
//! user asked for (stdout or `--output`) plus a one-line [`Notice`] for
//! stderr. Handlers never print themselves.
//!
//! ## Module Structure
//!
//! - [`keys`] - Keystore session, key generation, key material and listings
//! - [`cipher`] - Encryption, decryption, signing and verification
//! - [`session`] - Connection settings and request execution

pub mod cipher;
pub mod exit_codes;
pub mod keys;
pub mod session;

use std::fs;
use std::io::Write;
use std::path::Path;

use keystore_core::{ApiError, KeyAlgorithm, ValidationError};

use crate::args::{AesCommands, Commands, DsaCommands, RsaCommands, TextSource};
use crate::config::ConfigError;
use crate::notice::Notice;

pub use exit_codes::{EXIT_ERROR, EXIT_INVALID_INPUT, EXIT_INVALID_SIGNATURE, EXIT_SUCCESS};
pub use session::Session;

// ============================================================================
// CommandError
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Caught locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shown when the exchange itself failed; the details go to the log.
pub const NETWORK_ERROR: &str = "Network error. Please try again later";

impl CommandError {
    /// Validation problems are warnings; anything else is an error. A
    /// rejection shows the service's own message.
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(e) => Notice::warning(e.to_string()),
            Self::Api(ApiError::Rejected(rejection)) => Notice::error(rejection.message.clone()),
            Self::Api(e) if e.is_network() => Notice::error(NETWORK_ERROR),
            other => Notice::error(other.to_string()),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => EXIT_INVALID_INPUT,
            _ => EXIT_ERROR,
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The result proper. May be empty.
    pub output: String,
    pub notice: Notice,
    pub exit_code: i32,
}

impl Outcome {
    pub fn success(output: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            notice: Notice::success(text),
            exit_code: EXIT_SUCCESS,
        }
    }

    pub fn warning(output: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            notice: Notice::warning(text),
            exit_code: EXIT_SUCCESS,
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run one parsed command.
///
/// # Errors
///
/// Returns [`CommandError`] for local validation failures, unreadable input
/// files, and failed or rejected requests.
pub fn run(session: &Session, command: Commands) -> Result<Outcome, CommandError> {
    match command {
        Commands::Keystore { command } => keys::keystore(session, command),
        Commands::Aes { command } => match command {
            AesCommands::Generate(args) => keys::generate(session, KeyAlgorithm::Aes, &args),
            AesCommands::Load { alias } => keys::load_aes(session, &alias),
            AesCommands::Encrypt(key) => cipher::encrypt_aes(session, &key),
            AesCommands::Decrypt(key) => cipher::decrypt_aes(session, &key),
            AesCommands::List => keys::list(session, KeyAlgorithm::Aes, false),
        },
        Commands::Rsa { command } => match command {
            RsaCommands::Generate(args) => keys::generate(session, KeyAlgorithm::Rsa, &args),
            RsaCommands::Encrypt(key) => cipher::encrypt_rsa(session, &key),
            RsaCommands::Decrypt(key) => cipher::decrypt_rsa(session, &key),
            RsaCommands::Key { alias, private } => {
                keys::key_half(session, KeyAlgorithm::Rsa, &alias, private)
            }
            RsaCommands::List { public } => keys::list(session, KeyAlgorithm::Rsa, public),
        },
        Commands::Dsa { command } => match command {
            DsaCommands::Generate(args) => keys::generate(session, KeyAlgorithm::Dsa, &args),
            DsaCommands::Sign(key) => cipher::sign(session, &key),
            DsaCommands::Verify { key, signature } => cipher::verify(session, &key, &signature),
            DsaCommands::Key { alias, private } => {
                keys::key_half(session, KeyAlgorithm::Dsa, &alias, private)
            }
            DsaCommands::List => keys::list(session, KeyAlgorithm::Dsa, false),
        },
        Commands::Aliases { filter } => keys::aliases(session, filter.as_deref()),
        Commands::PublicKeys => keys::public_keys(session),
    }
}

// ============================================================================
// Input and output
// ============================================================================

/// The text operand: inline text, the contents of `--input`, or empty.
///
/// # Errors
///
/// Returns [`CommandError::Io`] when the input file cannot be read.
pub fn read_operand(source: &TextSource) -> Result<String, CommandError> {
    match (&source.text, &source.input) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => fs::read_to_string(path).map_err(|source| CommandError::Io {
            context: format!("failed to read {}", path.display()),
            source,
        }),
        (None, None) => Ok(String::new()),
    }
}

/// Write `output` to `path`, or as a line on `stdout` when no path is given.
/// Nothing is printed for an empty result.
///
/// # Errors
///
/// Returns [`CommandError::Io`] when the file or stream cannot be written.
pub fn deliver(output: &str, path: Option<&Path>, stdout: &mut dyn Write) -> Result<(), CommandError> {
    match path {
        Some(path) => fs::write(path, output).map_err(|source| CommandError::Io {
            context: format!("failed to write {}", path.display()),
            source,
        }),
        None if output.is_empty() => Ok(()),
        None => writeln!(stdout, "{output}").map_err(|source| CommandError::Io {
            context: "failed to write to stdout".to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystore_core::Rejection;
    use tempfile::TempDir;

    #[test]
    fn operand_prefers_inline_text() {
        let source = TextSource {
            text: Some("inline".into()),
            input: None,
        };
        assert_eq!(read_operand(&source).unwrap(), "inline");
        assert_eq!(read_operand(&TextSource::default()).unwrap(), "");
    }

    #[test]
    fn operand_reads_file_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.txt");
        fs::write(&path, "line one\nline two\n").unwrap();
        let source = TextSource {
            text: None,
            input: Some(path),
        };
        assert_eq!(read_operand(&source).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn missing_input_file_is_io_error() {
        let source = TextSource {
            text: None,
            input: Some("/nonexistent/keystore/input.txt".into()),
        };
        assert!(matches!(read_operand(&source), Err(CommandError::Io { .. })));
    }

    #[test]
    fn deliver_to_stdout_and_file() {
        let mut stdout = Vec::new();
        deliver("cipher", None, &mut stdout).unwrap();
        deliver("", None, &mut stdout).unwrap();
        assert_eq!(stdout, b"cipher\n");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let mut untouched = Vec::new();
        deliver("cipher", Some(&path), &mut untouched).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "cipher");
        assert!(untouched.is_empty());
    }

    #[test]
    fn notices_by_error_kind() {
        let err = CommandError::from(ValidationError::MissingKeyName);
        assert_eq!(err.notice(), Notice::warning("Please give the key a name."));

        let err = CommandError::from(ApiError::Rejected(Rejection::new(404, "alias not found")));
        assert_eq!(err.notice(), Notice::error("alias not found"));

        let err = CommandError::from(ApiError::Rejected(Rejection::new(500, "")));
        assert_eq!(err.notice().to_string(), "Error: Operation failed");

        let err = CommandError::from(ApiError::Transport("connection refused".into()));
        assert_eq!(err.notice(), Notice::error(NETWORK_ERROR));
        assert_eq!(err.exit_code(), EXIT_ERROR);

        let err = CommandError::from(ApiError::InvalidUrl("x: relative URL".into()));
        assert_eq!(err.notice(), Notice::error("invalid url: x: relative URL"));
    }

    #[test]
    fn validation_has_its_own_exit_code() {
        let err = CommandError::from(ValidationError::DuplicateAlias("aes_k".into()));
        assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
    }
}
