//! The client-side registration response handed to the verifier.

use crate::error::{AttestationError, Result};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine, alphabet};
use serde::{Deserialize, Serialize};

/// A `PublicKeyCredential` returned by `navigator.credentials.create()`,
/// serialized to JSON by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationCredential {
    /// The base64url credential ID, if the client sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The authenticator's attestation response.
    pub response: AttestationResponse,
}

/// The `response` member of a registration credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    /// Base64(url)-encoded CBOR attestation object.
    pub attestation_object: String,
    /// Base64(url)-encoded client data JSON.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
}

impl RegistrationCredential {
    /// Build a credential from already-encoded response fields.
    #[must_use]
    pub fn new(attestation_object: impl Into<String>, client_data_json: impl Into<String>) -> Self {
        Self {
            id: None,
            response: AttestationResponse {
                attestation_object: attestation_object.into(),
                client_data_json: client_data_json.into(),
            },
        }
    }

    /// Parse a credential from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::MalformedInput`] if the JSON does not have
    /// the expected shape.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AttestationError::MalformedInput(e.to_string()))
    }
}

impl AttestationResponse {
    /// Decode the attestation object bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::MalformedInput`] if the field is not base64.
    pub fn attestation_object_bytes(&self) -> Result<Vec<u8>> {
        decode_base64("attestationObject", &self.attestation_object)
    }

    /// Decode the client data JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::MalformedInput`] if the field is not base64.
    pub fn client_data_json_bytes(&self) -> Result<Vec<u8>> {
        decode_base64("clientDataJSON", &self.client_data_json)
    }
}

const PADDING_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Standard alphabet, canonical padding optional.
const STANDARD_ANY_PAD: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PADDING_INDIFFERENT);

/// URL-safe alphabet, canonical padding optional.
const URL_SAFE_ANY_PAD: GeneralPurpose =
    GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_INDIFFERENT);

/// Decode base64url or standard base64, with or without canonical padding.
fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim();
    let engine = if trimmed.contains(['+', '/']) {
        &STANDARD_ANY_PAD
    } else {
        &URL_SAFE_ANY_PAD
    };
    engine
        .decode(trimmed)
        .map_err(|e| AttestationError::MalformedInput(format!("{field}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
    use pretty_assertions::assert_eq;

    #[test]
    fn it_accepts_every_base64_alphabet() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        for encoded in [
            URL_SAFE_NO_PAD.encode(&bytes),
            URL_SAFE.encode(&bytes),
            STANDARD.encode(&bytes),
            STANDARD_NO_PAD.encode(&bytes),
        ] {
            assert_eq!(decode_base64("field", &encoded).unwrap(), bytes);
        }
    }

    #[test]
    fn it_rejects_invalid_base64() {
        let result = decode_base64("attestationObject", "not base64!");
        assert!(matches!(
            result,
            Err(AttestationError::MalformedInput(message))
                if message.starts_with("attestationObject:")
        ));
    }

    #[test]
    fn it_rejects_excess_padding() {
        for encoded in ["AAAA=====", "AA===", "e30=="] {
            assert!(
                matches!(
                    decode_base64("clientDataJSON", encoded),
                    Err(AttestationError::MalformedInput(_))
                ),
                "{encoded}"
            );
        }
        assert_eq!(decode_base64("clientDataJSON", "e30=").unwrap(), b"{}");
    }

    #[test]
    fn it_parses_the_json_shape() {
        let credential = RegistrationCredential::from_json(
            r#"{
                "id": "abc",
                "type": "public-key",
                "response": { "attestationObject": "o2NmbXQ", "clientDataJSON": "e30" }
            }"#,
        )
        .unwrap();

        assert_eq!(credential.id.as_deref(), Some("abc"));
        assert_eq!(credential.response.client_data_json_bytes().unwrap(), b"{}");
    }

    #[test]
    fn it_rejects_a_response_without_client_data() {
        let result =
            RegistrationCredential::from_json(r#"{ "response": { "attestationObject": "" } }"#);
        assert!(matches!(result, Err(AttestationError::MalformedInput(_))));
    }
}
