//! PEM framing for attestation certificates and raw P-256 points.

use crate::cose::{UNCOMPRESSED_POINT_LEN, UNCOMPRESSED_TAG};
use crate::error::{AttestationError, Result};
use x509_cert::der::pem::{self as rfc7468, LineEnding};

/// DER prefix turning an uncompressed P-256 point into a SubjectPublicKeyInfo.
///
/// ```text
/// 30 59                                   SEQUENCE (89 bytes)
///    30 13                                SEQUENCE (19 bytes)
///       06 07 2a 86 48 ce 3d 02 01        OID 1.2.840.10045.2.1 (ecPublicKey)
///       06 08 2a 86 48 ce 3d 03 01 07     OID 1.2.840.10045.3.1.7 (prime256v1)
///    03 42 00                             BIT STRING (66 bytes, 0 unused bits)
/// ```
pub const P256_SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, // SEQUENCE, 89 bytes
    0x30, 0x13, // SEQUENCE, 19 bytes
    0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, // OID ecPublicKey
    0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, // OID prime256v1
    0x03, 0x42, // BIT STRING, 66 bytes
    0x00, // 0 unused bits
];

/// The label of a PEM block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PemLabel {
    /// `PUBLIC KEY`: a DER SubjectPublicKeyInfo.
    PublicKey,
    /// `CERTIFICATE`: a DER X.509 certificate.
    Certificate,
}

impl PemLabel {
    /// The label text used in the BEGIN/END lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PublicKey => "PUBLIC KEY",
            Self::Certificate => "CERTIFICATE",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "PUBLIC KEY" => Some(Self::PublicKey),
            "CERTIFICATE" => Some(Self::Certificate),
            _ => None,
        }
    }
}

impl std::fmt::Display for PemLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `bytes` look like a raw uncompressed P-256 point.
#[must_use]
pub fn is_uncompressed_point(bytes: &[u8]) -> bool {
    bytes.len() == UNCOMPRESSED_POINT_LEN && bytes[0] == UNCOMPRESSED_TAG
}

/// Wrap an uncompressed P-256 point in a DER SubjectPublicKeyInfo.
#[must_use]
pub fn p256_spki(point: &[u8; UNCOMPRESSED_POINT_LEN]) -> Vec<u8> {
    let mut der = Vec::with_capacity(P256_SPKI_PREFIX.len() + point.len());
    der.extend_from_slice(&P256_SPKI_PREFIX);
    der.extend_from_slice(point);
    der
}

/// PEM-encode a raw uncompressed point or a DER certificate.
///
/// A 65-byte buffer starting with `0x04` is treated as a P-256 point and
/// emitted as a `PUBLIC KEY` block; anything else is emitted unchanged as
/// a `CERTIFICATE` block.
///
/// # Errors
///
/// Returns [`AttestationError::InvalidInput`] for an empty buffer.
pub fn encode(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(AttestationError::InvalidInput(
            "cannot PEM-encode an empty buffer".into(),
        ));
    }

    match <&[u8; UNCOMPRESSED_POINT_LEN]>::try_from(bytes) {
        Ok(point) if is_uncompressed_point(point) => {
            encode_block(PemLabel::PublicKey, &p256_spki(point))
        }
        _ => encode_block(PemLabel::Certificate, bytes),
    }
}

/// Frame DER bytes as a PEM block with the given label.
///
/// # Errors
///
/// Returns [`AttestationError::InvalidInput`] if the encoded block would not
/// fit in memory.
pub fn encode_block(label: PemLabel, der: &[u8]) -> Result<String> {
    rfc7468::encode_string(label.as_str(), LineEnding::LF, der)
        .map_err(|e| AttestationError::InvalidInput(e.to_string()))
}

/// Decode a single PEM block into its label and DER body.
///
/// Framing follows RFC 7468 strictly, so no text may precede the header.
///
/// # Errors
///
/// Returns [`AttestationError::InvalidKeyMaterial`] if the framing is broken,
/// the label is not `PUBLIC KEY` or `CERTIFICATE`, or the body is not base64.
pub fn decode(pem: &str) -> Result<(PemLabel, Vec<u8>)> {
    let (label, der) = rfc7468::decode_vec(pem.as_bytes())
        .map_err(|e| AttestationError::InvalidKeyMaterial(e.to_string()))?;
    let kind = PemLabel::from_label(label).ok_or_else(|| {
        AttestationError::InvalidKeyMaterial(format!("unsupported PEM label {label:?}"))
    })?;
    Ok((kind, der))
}
