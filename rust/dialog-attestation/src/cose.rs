//! COSE_Key decoding for EC2 P-256 credential public keys.

use crate::error::{AttestationError, Result};
use ciborium::Value;

/// COSE key common parameter: key type.
pub const LABEL_KTY: i128 = 1;
/// COSE key common parameter: algorithm.
pub const LABEL_ALG: i128 = 3;
/// EC2 key parameter: curve.
pub const LABEL_CRV: i128 = -1;
/// EC2 key parameter: x-coordinate.
pub const LABEL_X: i128 = -2;
/// EC2 key parameter: y-coordinate.
pub const LABEL_Y: i128 = -3;

/// `kty` value for elliptic curve keys with x and y coordinates.
pub const KTY_EC2: i128 = 2;
/// `alg` value for ECDSA with SHA-256.
pub const ALG_ES256: i128 = -7;
/// `crv` value for NIST P-256.
pub const CRV_P256: i128 = 1;

/// Size of a P-256 coordinate.
pub const COORDINATE_LEN: usize = 32;

/// Size of an uncompressed SEC1 P-256 point: `0x04 || x || y`.
pub const UNCOMPRESSED_POINT_LEN: usize = 1 + 2 * COORDINATE_LEN;

/// SEC1 tag for an uncompressed point.
pub const UNCOMPRESSED_TAG: u8 = 0x04;

/// The coordinates of an EC2 P-256 COSE key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoseEc2Key {
    /// Affine x-coordinate.
    pub x: [u8; COORDINATE_LEN],
    /// Affine y-coordinate.
    pub y: [u8; COORDINATE_LEN],
}

impl CoseEc2Key {
    /// Decode a CBOR-encoded COSE_Key.
    ///
    /// The buffer must hold exactly one CBOR map. `kty`, `alg` and `crv` are
    /// optional, but when present they must name EC2, ES256 and P-256.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::UnsupportedKeyFormat`] if the bytes are not
    /// a single CBOR map describing an EC2 P-256 key.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let mut rest = bytes;
        let value: Value = ciborium::from_reader(&mut rest)
            .map_err(|e| AttestationError::UnsupportedKeyFormat(e.to_string()))?;
        if !rest.is_empty() {
            return Err(AttestationError::UnsupportedKeyFormat(format!(
                "{} trailing bytes after COSE key",
                rest.len()
            )));
        }

        let Value::Map(entries) = value else {
            return Err(AttestationError::UnsupportedKeyFormat(
                "COSE key is not a map".into(),
            ));
        };

        expect_integer(&entries, LABEL_KTY, KTY_EC2, "kty")?;
        expect_integer(&entries, LABEL_ALG, ALG_ES256, "alg")?;
        expect_integer(&entries, LABEL_CRV, CRV_P256, "crv")?;

        Ok(Self {
            x: coordinate(&entries, LABEL_X, "x")?,
            y: coordinate(&entries, LABEL_Y, "y")?,
        })
    }

    /// Encode as an uncompressed SEC1 point.
    #[must_use]
    pub fn to_uncompressed_point(&self) -> [u8; UNCOMPRESSED_POINT_LEN] {
        let mut point = [0u8; UNCOMPRESSED_POINT_LEN];
        point[0] = UNCOMPRESSED_TAG;
        point[1..=COORDINATE_LEN].copy_from_slice(&self.x);
        point[1 + COORDINATE_LEN..].copy_from_slice(&self.y);
        point
    }
}

/// Convert a CBOR COSE_Key into a 65-byte uncompressed EC point.
///
/// # Errors
///
/// See [`CoseEc2Key::from_cbor`].
pub fn to_uncompressed_point(cose_key: &[u8]) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
    CoseEc2Key::from_cbor(cose_key).map(|key| key.to_uncompressed_point())
}

fn lookup(entries: &[(Value, Value)], label: i128) -> Option<&Value> {
    entries.iter().find_map(|(key, value)| match key {
        Value::Integer(key) if i128::from(*key) == label => Some(value),
        _ => None,
    })
}

fn expect_integer(
    entries: &[(Value, Value)],
    label: i128,
    expected: i128,
    name: &str,
) -> Result<()> {
    match lookup(entries, label) {
        None => Ok(()),
        Some(Value::Integer(actual)) if i128::from(*actual) == expected => Ok(()),
        Some(Value::Integer(actual)) => Err(AttestationError::UnsupportedKeyFormat(format!(
            "{name} is {}, expected {expected}",
            i128::from(*actual)
        ))),
        Some(_) => Err(AttestationError::UnsupportedKeyFormat(format!(
            "{name} is not an integer"
        ))),
    }
}

fn coordinate(
    entries: &[(Value, Value)],
    label: i128,
    name: &str,
) -> Result<[u8; COORDINATE_LEN]> {
    match lookup(entries, label) {
        Some(Value::Bytes(bytes)) => bytes.as_slice().try_into().map_err(|_| {
            AttestationError::UnsupportedKeyFormat(format!(
                "{name} is {} bytes, expected {COORDINATE_LEN}",
                bytes.len()
            ))
        }),
        Some(_) => Err(AttestationError::UnsupportedKeyFormat(format!(
            "{name} is not a byte string"
        ))),
        None => Err(AttestationError::UnsupportedKeyFormat(format!(
            "{name} coordinate missing"
        ))),
    }
}
