//! SHA-256 hashing and ECDSA verification against PEM keys and certificates.
//!
//! The verifier accepts either a `PUBLIC KEY` block (a SubjectPublicKeyInfo)
//! or a `CERTIFICATE` block, in which case the leaf certificate's subject
//! public key is used. The curve is taken from the key itself; the message
//! digest is always SHA-256.

use crate::error::{AttestationError, Result};
use crate::pem::{self, PemLabel};
use p256::ecdsa::signature::hazmat::PrehashVerifier as _;
use sha2::{Digest, Sha256};
use x509_cert::Certificate;
use x509_cert::der::{Decode, referenced::OwnedToRef};
use x509_cert::spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};

/// OID 1.2.840.10045.2.1 (id-ecPublicKey).
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
/// OID 1.2.840.10045.3.1.7 (prime256v1).
const P256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
/// OID 1.3.132.0.34 (secp384r1).
#[cfg(feature = "p384")]
const P384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

/// Compute the SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// An ECDSA public key extracted from a PEM key or certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationKey {
    /// NIST P-256.
    P256(p256::ecdsa::VerifyingKey),
    /// NIST P-384.
    #[cfg(feature = "p384")]
    P384(p384::ecdsa::VerifyingKey),
}

impl AttestationKey {
    /// Load a key from a `PUBLIC KEY` or `CERTIFICATE` PEM block.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::InvalidKeyMaterial`] if the PEM framing,
    /// the DER structure, or the embedded EC key cannot be parsed.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (label, der) = pem::decode(pem)?;
        match label {
            PemLabel::PublicKey => {
                let spki = SubjectPublicKeyInfoRef::from_der(&der)
                    .map_err(|e| AttestationError::InvalidKeyMaterial(e.to_string()))?;
                Self::from_spki(spki)
            }
            PemLabel::Certificate => {
                let certificate = Certificate::from_der(&der)
                    .map_err(|e| AttestationError::InvalidKeyMaterial(e.to_string()))?;
                Self::from_spki(
                    certificate
                        .tbs_certificate
                        .subject_public_key_info
                        .owned_to_ref(),
                )
            }
        }
    }

    /// Load a key from a parsed SubjectPublicKeyInfo.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::InvalidKeyMaterial`] if the key is not an
    /// EC key on a supported curve.
    pub fn from_spki(spki: SubjectPublicKeyInfoRef<'_>) -> Result<Self> {
        if spki.algorithm.oid != EC_PUBLIC_KEY_OID {
            return Err(AttestationError::InvalidKeyMaterial(format!(
                "unsupported key algorithm {}",
                spki.algorithm.oid
            )));
        }
        let curve = spki
            .algorithm
            .parameters_oid()
            .map_err(|e| AttestationError::InvalidKeyMaterial(e.to_string()))?;

        if curve == P256_OID {
            return p256::ecdsa::VerifyingKey::try_from(spki)
                .map(Self::P256)
                .map_err(|e| AttestationError::InvalidKeyMaterial(e.to_string()));
        }
        #[cfg(feature = "p384")]
        if curve == P384_OID {
            return p384::ecdsa::VerifyingKey::try_from(spki)
                .map(Self::P384)
                .map_err(|e| AttestationError::InvalidKeyMaterial(e.to_string()));
        }
        Err(AttestationError::InvalidKeyMaterial(format!(
            "unsupported curve {curve}"
        )))
    }

    /// Check a DER-encoded ECDSA signature over `signed_data`.
    ///
    /// Returns `false` for a signature that is not valid DER or does not verify.
    #[must_use]
    pub fn verify(&self, signed_data: &[u8], signature: &[u8]) -> bool {
        let digest = sha256(signed_data);
        match self {
            Self::P256(key) => p256::ecdsa::Signature::from_der(signature)
                .and_then(|signature| key.verify_prehash(&digest, &signature))
                .is_ok(),
            #[cfg(feature = "p384")]
            Self::P384(key) => p384::ecdsa::Signature::from_der(signature)
                .and_then(|signature| key.verify_prehash(&digest, &signature))
                .is_ok(),
        }
    }
}

/// Verify an ECDSA/SHA-256 `signature` over `signed_data` with a PEM key or certificate.
///
/// # Errors
///
/// Returns [`AttestationError::InvalidKeyMaterial`] only when the PEM text
/// cannot be turned into a key. A signature that does not verify is `Ok(false)`.
pub fn verify_signature(signature: &[u8], signed_data: &[u8], pem: &str) -> Result<bool> {
    let key = AttestationKey::from_pem(pem)?;
    Ok(key.verify(signed_data, signature))
}
