//! FIDO U2F attestation verification.
//!
//! Verifies a registration response by:
//! 1. Decoding the CBOR attestation object into `authData`, `fmt` and `attStmt`
//! 2. Parsing `authData` and requiring the user-presence flag
//! 3. Rebuilding the signed data:
//!    `0x00 || rpIdHash || SHA-256(clientDataJSON) || credentialId || 0x04 || x || y`
//! 4. Verifying `attStmt.sig` with the leaf certificate `attStmt.x5c[0]`
//!
//! The certificate chain is not validated; only the leaf key is used.

use crate::authenticator_data::{AAGUID_LEN, AuthenticatorData, AuthenticatorFlags};
use crate::cose::{self, UNCOMPRESSED_POINT_LEN};
use crate::error::{AttestationError, Result};
use crate::pem;
use crate::response::RegistrationCredential;
use crate::verifier::{self, sha256};
use serde::Deserialize;
use serde_bytes::ByteBuf;

/// Attestation statement format for FIDO U2F authenticators.
pub const FIDO_U2F_FORMAT: &str = "fido-u2f";

/// Reserved byte that opens the U2F signed data.
const RESERVED_BYTE: u8 = 0x00;

/// The decoded CBOR attestation object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttestationObject {
    /// Attestation statement format identifier.
    pub fmt: String,
    /// The attestation statement.
    #[serde(rename = "attStmt")]
    pub att_stmt: AttestationStatement,
    /// Raw authenticator data.
    #[serde(rename = "authData", with = "serde_bytes")]
    pub auth_data: Vec<u8>,
}

/// A U2F attestation statement: a signature and the attestation certificate chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttestationStatement {
    /// DER-encoded ECDSA signature.
    #[serde(with = "serde_bytes")]
    pub sig: Vec<u8>,
    /// DER-encoded certificates, leaf first.
    pub x5c: Vec<ByteBuf>,
}

impl AttestationObject {
    /// Decode a CBOR attestation object.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::MalformedInput`] if the bytes are not a
    /// single CBOR map with `fmt`, `attStmt.sig`, `attStmt.x5c` and `authData`.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let mut rest = bytes;
        let object: Self = ciborium::from_reader(&mut rest)
            .map_err(|e| AttestationError::MalformedInput(format!("attestationObject: {e}")))?;
        if !rest.is_empty() {
            return Err(AttestationError::MalformedInput(format!(
                "attestationObject: {} trailing bytes",
                rest.len()
            )));
        }
        Ok(object)
    }
}

impl AttestationStatement {
    /// The leaf attestation certificate.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::MalformedInput`] if `x5c` is empty.
    pub fn leaf_certificate(&self) -> Result<&[u8]> {
        self.x5c
            .first()
            .map(|certificate| certificate.as_slice())
            .ok_or_else(|| AttestationError::MalformedInput("attStmt.x5c is empty".into()))
    }
}

/// Assemble the byte string a U2F authenticator signs at registration.
#[must_use]
pub fn signature_base(
    auth_data: &AuthenticatorData,
    client_data_hash: &[u8; 32],
    public_key: &[u8; UNCOMPRESSED_POINT_LEN],
) -> Vec<u8> {
    let mut base = Vec::with_capacity(
        1 + auth_data.rp_id_hash.len()
            + client_data_hash.len()
            + auth_data.credential_id.len()
            + public_key.len(),
    );
    base.push(RESERVED_BYTE);
    base.extend_from_slice(&auth_data.rp_id_hash);
    base.extend_from_slice(client_data_hash);
    base.extend_from_slice(&auth_data.credential_id);
    base.extend_from_slice(public_key);
    base
}

/// The credential attested by a registration response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredential {
    /// Attestation statement format (`fido-u2f` for U2F devices).
    pub format: String,
    /// The credential ID to store for later assertions.
    pub credential_id: Vec<u8>,
    /// The credential public key as an uncompressed P-256 point.
    pub public_key: [u8; UNCOMPRESSED_POINT_LEN],
    /// Initial signature counter.
    pub counter: u32,
    /// Authenticator attestation GUID.
    pub aaguid: [u8; AAGUID_LEN],
    /// Authenticator flags.
    pub flags: AuthenticatorFlags,
}

/// Outcome of verifying a structurally valid attestation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Whether the attestation signature verified against the leaf certificate.
    pub verified: bool,
    /// The credential the response attests to.
    pub credential: AttestedCredential,
}

/// Verifies registration attestations.
///
/// The default verifier accepts any statement format carrying `sig` and `x5c`.
///
/// ```ignore
/// let verifier = AttestationVerifier::new().with_format(FIDO_U2F_FORMAT);
/// let verification = verifier.verify(&credential)?;
/// if verification.verified {
///     store(verification.credential);
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttestationVerifier {
    formats: Vec<String>,
}

impl AttestationVerifier {
    /// A verifier that accepts any attestation format.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict accepted formats. May be called repeatedly to allow several.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.formats.push(format.into());
        self
    }

    /// Verify an encoded registration credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be decoded, the authenticator
    /// data is malformed, the user was not present, the credential key is not
    /// P-256, or the certificate cannot be parsed. A signature that does not
    /// verify yields `Ok` with `verified == false`.
    pub fn verify(&self, credential: &RegistrationCredential) -> Result<Verification> {
        let attestation_object = credential.response.attestation_object_bytes()?;
        let client_data_json = credential.response.client_data_json_bytes()?;
        self.verify_bytes(&attestation_object, &client_data_json)
    }

    /// Verify already-decoded attestation object and client data bytes.
    ///
    /// # Errors
    ///
    /// See [`AttestationVerifier::verify`].
    pub fn verify_bytes(
        &self,
        attestation_object: &[u8],
        client_data_json: &[u8],
    ) -> Result<Verification> {
        self.run(attestation_object, client_data_json)
            .inspect_err(|error| tracing::warn!(%error, "attestation rejected"))
    }

    fn run(&self, attestation_object: &[u8], client_data_json: &[u8]) -> Result<Verification> {
        let object = AttestationObject::from_cbor(attestation_object)?;
        if !self.formats.is_empty() && !self.formats.iter().any(|f| *f == object.fmt) {
            return Err(AttestationError::UnsupportedFormat(object.fmt));
        }

        let auth_data = AuthenticatorData::from_bytes(&object.auth_data)?;
        tracing::debug!(
            fmt = %object.fmt,
            flags = auth_data.flags.bits(),
            counter = auth_data.counter,
            credential_id_len = auth_data.credential_id.len(),
            "decoded attestation object"
        );
        if !auth_data.flags.user_present() {
            return Err(AttestationError::UserNotPresent);
        }

        let client_data_hash = sha256(client_data_json);
        let public_key = cose::to_uncompressed_point(&auth_data.credential_public_key)?;
        let signed_data = signature_base(&auth_data, &client_data_hash, &public_key);

        let certificate = pem::encode(object.att_stmt.leaf_certificate()?)?;
        let verified =
            verifier::verify_signature(&object.att_stmt.sig, &signed_data, &certificate)?;
        if verified {
            tracing::debug!("attestation signature verified");
        } else {
            tracing::warn!("attestation signature did not verify");
        }

        Ok(Verification {
            verified,
            credential: AttestedCredential {
                format: object.fmt,
                credential_id: auth_data.credential_id,
                public_key,
                counter: auth_data.counter,
                aaguid: auth_data.aaguid,
                flags: auth_data.flags,
            },
        })
    }
}

/// Verify a registration credential's attestation with the default verifier.
///
/// Returns `Ok(true)` iff the attestation signature verifies over the
/// reconstructed data using the leaf certificate.
///
/// # Errors
///
/// See [`AttestationVerifier::verify`].
pub fn verify_attestation(credential: &RegistrationCredential) -> Result<bool> {
    AttestationVerifier::new()
        .verify(credential)
        .map(|verification| verification.verified)
}
