//! Error types for attestation verification.

use thiserror::Error;

/// Errors raised while verifying an attestation.
///
/// Every variant describes a structural or key-material failure. A signature
/// that simply does not verify is not an error: it is reported as `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttestationError {
    /// The `attestationObject` or `clientDataJSON` could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The authenticator data ended before `field` could be read.
    #[error("malformed authenticator data: {field} needs {needed} bytes, {remaining} remain")]
    MalformedAuthenticatorData {
        /// The field being read when the buffer ran out.
        field: &'static str,
        /// Bytes required for the field.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// The credential public key is not an EC2 P-256 COSE key.
    #[error("unsupported key format: {0}")]
    UnsupportedKeyFormat(String),

    /// The user-presence flag is not set in the authenticator data.
    #[error("user not present")]
    UserNotPresent,

    /// The certificate or public key bytes are not valid DER.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Input handed to an encoder was unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The attestation statement format is not accepted by the verifier.
    #[error("unsupported attestation format: {0}")]
    UnsupportedFormat(String),
}

/// Coarse classification of an [`AttestationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input could not be decoded or does not have the expected layout.
    Structural,
    /// The authenticator did not attest to user presence.
    Policy,
    /// The key or certificate used for verification is unusable.
    KeyMaterial,
}

impl AttestationError {
    /// Classify this error for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_)
            | Self::MalformedAuthenticatorData { .. }
            | Self::UnsupportedKeyFormat(_)
            | Self::InvalidInput(_) => ErrorKind::Structural,
            Self::UserNotPresent | Self::UnsupportedFormat(_) => ErrorKind::Policy,
            Self::InvalidKeyMaterial(_) => ErrorKind::KeyMaterial,
        }
    }
}

/// Result alias used throughout this crate.
pub type Result<T, E = AttestationError> = std::result::Result<T, E>;
