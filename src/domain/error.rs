//! Gateway error taxonomy.
//!
//! Every failure surfacing from a node call is wrapped into this closed
//! set before it crosses any boundary. Variants carry the raw upstream
//! message as context; nothing is retried or suppressed here — the only
//! retry loop in the system is the confirmation poller.

use crate::domain::network::NetworkId;

/// Result alias used across ports, usecases, and adapters.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Closed failure taxonomy for all gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// RPC transport failure, node unreachable, or unclassifiable node error.
    #[error("network error on {network}: {message}")]
    Network { network: NetworkId, message: String },

    /// The ledger rejected the address encoding.
    #[error("invalid address on {network}: {message}")]
    InvalidAddress { network: NetworkId, message: String },

    /// The ledger or signer rejected the supplied credential.
    #[error("invalid credential on {network}: {message}")]
    InvalidCredential { network: NetworkId, message: String },

    /// The sending account cannot cover amount + fees.
    #[error("insufficient balance on {network}: {message}")]
    InsufficientBalance { network: NetworkId, message: String },

    /// Confirmation polling was cancelled or could not complete.
    #[error("transaction timeout on {network}: {message}")]
    TransactionTimeout { network: NetworkId, message: String },

    /// The ledger has no record of the referenced transaction.
    #[error("not found on {network}: {message}")]
    NotFound { network: NetworkId, message: String },

    /// The operation is not supported by this network.
    #[error("unsupported operation on {network}: {message}")]
    UnsupportedOperation { network: NetworkId, message: String },
}

impl GatewayError {
    /// Stable machine-readable tag, used in HTTP bodies and metric labels.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network_error",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InvalidCredential { .. } => "invalid_credential",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::TransactionTimeout { .. } => "transaction_timeout",
            Self::NotFound { .. } => "not_found",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
        }
    }

    /// The network the failure was observed on.
    pub const fn network(&self) -> NetworkId {
        match self {
            Self::Network { network, .. }
            | Self::InvalidAddress { network, .. }
            | Self::InvalidCredential { network, .. }
            | Self::InsufficientBalance { network, .. }
            | Self::TransactionTimeout { network, .. }
            | Self::NotFound { network, .. }
            | Self::UnsupportedOperation { network, .. } => *network,
        }
    }

    /// The preserved upstream message.
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. }
            | Self::InvalidAddress { message, .. }
            | Self::InvalidCredential { message, .. }
            | Self::InsufficientBalance { message, .. }
            | Self::TransactionTimeout { message, .. }
            | Self::NotFound { message, .. }
            | Self::UnsupportedOperation { message, .. } => message,
        }
    }

    pub fn network_error(network: NetworkId, message: impl Into<String>) -> Self {
        Self::Network { network, message: message.into() }
    }

    pub fn invalid_address(network: NetworkId, message: impl Into<String>) -> Self {
        Self::InvalidAddress { network, message: message.into() }
    }

    pub fn invalid_credential(network: NetworkId, message: impl Into<String>) -> Self {
        Self::InvalidCredential { network, message: message.into() }
    }

    pub fn insufficient_balance(network: NetworkId, message: impl Into<String>) -> Self {
        Self::InsufficientBalance { network, message: message.into() }
    }

    pub fn timeout(network: NetworkId, message: impl Into<String>) -> Self {
        Self::TransactionTimeout { network, message: message.into() }
    }

    pub fn not_found(network: NetworkId, message: impl Into<String>) -> Self {
        Self::NotFound { network, message: message.into() }
    }

    pub fn unsupported(network: NetworkId, message: impl Into<String>) -> Self {
        Self::UnsupportedOperation { network, message: message.into() }
    }
}

/// Classify a raw node error message into the taxonomy.
///
/// Node software disagrees wildly on error shapes, but the vocabulary is
/// consistent enough for keyword classification. Adapters construct exact
/// variants directly where the wire format is explicit (e.g. Tron's
/// `contractRet`); this is the fallback for free-text errors. Anything
/// unrecognized stays `Network` with the message preserved verbatim.
pub fn normalize(network: NetworkId, raw: &str) -> GatewayError {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("insufficient funds")
        || lower.contains("insufficient balance")
        || lower.contains("balance too low")
        || lower.contains("unfunded")
    {
        GatewayError::insufficient_balance(network, raw)
    } else if lower.contains("invalid address")
        || lower.contains("bad address")
        || lower.contains("invalid account")
        || lower.contains("checksum")
        || lower.contains("malformed address")
    {
        GatewayError::invalid_address(network, raw)
    } else if lower.contains("invalid signature")
        || lower.contains("bad signature")
        || lower.contains("invalid key")
        || lower.contains("bad secret")
        || lower.contains("invalid mnemonic")
        || lower.contains("unauthorized")
        || lower.contains("incorrect password")
    {
        GatewayError::invalid_credential(network, raw)
    } else if lower.contains("not found")
        || lower.contains("unknown transaction")
        || lower.contains("txnotfound")
    {
        GatewayError::not_found(network, raw)
    } else {
        GatewayError::network_error(network, raw)
    }
}
