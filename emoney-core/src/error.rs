//! Error types for e-Money Core
//!
//! Error taxonomy for key derivation, message validation, signing and encoding.

use std::fmt;

use crate::signer::SignMode;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// e-Money Core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mnemonic could not be parsed
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Key derivation error (path or curve)
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid coin amount or denomination
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Structural validation failure of a message or envelope
    #[error("Validation error: {0}")]
    Validation(String),

    /// Envelope carries no messages
    #[error("Transaction must contain at least one message")]
    EmptyMessages,

    /// Message type not present in the codec registry
    #[error("Unregistered message type: {0}")]
    UnregisteredMessage(String),

    /// Signing failure, including a missing identity
    #[error("Signing error: {0}")]
    Signing(String),

    /// Encoder asked for a mode other than the one the tx was signed under
    #[error("Transaction was signed in {signed} mode but {requested} encoding was requested")]
    ModeMismatch {
        /// Mode recorded at signing time
        signed: SignMode,
        /// Mode passed to the encoder
        requested: SignMode,
    },

    /// Serialization failure (JSON or protobuf)
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Parameter error
    #[error(transparent)]
    Params(#[from] emoney_params::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Missing-identity signing error, raised before any network call.
    pub fn missing_keys() -> Self {
        Error::Signing("keys are missing, must set key".to_string())
    }

    /// Check if error is a user-facing error (vs internal error)
    pub fn is_user_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }

    /// Get error kind for branching and logging
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidMnemonic(_) | Error::KeyDerivation(_) => ErrorKind::Derivation,
            Error::Params(emoney_params::Error::InvalidDerivationPath(_)) => {
                ErrorKind::Derivation
            }
            Error::InvalidAddress(_)
            | Error::InvalidAmount(_)
            | Error::Validation(_)
            | Error::EmptyMessages
            | Error::UnregisteredMessage(_)
            | Error::ModeMismatch { .. } => ErrorKind::Validation,
            Error::Params(emoney_params::Error::InvalidNetwork(_)) => ErrorKind::Validation,
            Error::Signing(_) => ErrorKind::Signing,
            Error::Encoding(_) | Error::Serialization(_) => ErrorKind::Internal,
        }
    }
}

/// Error kinds shared by every crate in the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad mnemonic or derivation path
    Derivation,
    /// Malformed message, envelope or configuration
    Validation,
    /// Queried entity absent on chain
    NotFound,
    /// Missing identity or signature failure
    Signing,
    /// Network or wire-format failure talking to a node
    Transport,
    /// Height not reached within the bound
    Timeout,
    /// Caller cancelled the operation
    Cancelled,
    /// Internal/system errors
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Derivation => write!(f, "Derivation"),
            ErrorKind::Validation => write!(f, "Validation"),
            ErrorKind::NotFound => write!(f, "NotFound"),
            ErrorKind::Signing => write!(f, "Signing"),
            ErrorKind::Transport => write!(f, "Transport"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::Cancelled => write!(f, "Cancelled"),
            ErrorKind::Internal => write!(f, "Internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::InvalidMnemonic("test".to_string()).kind(),
            ErrorKind::Derivation
        );
        assert_eq!(
            Error::Params(emoney_params::Error::InvalidDerivationPath("m/1".to_string())).kind(),
            ErrorKind::Derivation
        );
        assert_eq!(Error::EmptyMessages.kind(), ErrorKind::Validation);
        assert_eq!(
            Error::UnregisteredMessage("/x.Msg".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::missing_keys().kind(), ErrorKind::Signing);
        assert_eq!(
            Error::Encoding("test".to_string()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_user_error_detection() {
        assert!(Error::InvalidAddress("test".to_string()).is_user_error());
        assert!(Error::missing_keys().is_user_error());
        assert!(!Error::Encoding("test".to_string()).is_user_error());
    }

    #[test]
    fn test_mode_mismatch_message() {
        let err = Error::ModeMismatch {
            signed: SignMode::Direct,
            requested: SignMode::LegacyAminoJson,
        };
        assert_eq!(
            err.to_string(),
            "Transaction was signed in direct mode but legacy-amino-json encoding was requested"
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NotFound");
        assert_eq!(ErrorKind::Transport.to_string(), "Transport");
    }
}
