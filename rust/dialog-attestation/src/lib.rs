//! FIDO U2F attestation verification for WebAuthn registration.
//!
//! Confirms that a newly created credential was produced by genuine
//! authenticator hardware: the signed data of the `fido-u2f` attestation
//! format is rebuilt from the response and checked against the leaf
//! attestation certificate.
//!
//! The pipeline is split into small pieces that are usable on their own:
//! - [`authenticator_data`]: the `authenticatorData` byte layout
//! - [`cose`]: EC2 COSE keys to uncompressed SEC1 points
//! - [`pem`]: PEM framing, including SubjectPublicKeyInfo synthesis for raw points
//! - [`verifier`]: SHA-256 and ECDSA verification against a PEM key or certificate
//! - [`attestation`]: the attestation object and the end-to-end check
//!
//! ```ignore
//! let credential = RegistrationCredential::from_json(&body)?;
//! if !verify_attestation(&credential)? {
//!     return Err(Rejected);
//! }
//! ```
//!
//! Challenge, origin and relying party checks, as well as certificate chain
//! validation, are left to the caller.

pub mod attestation;
pub mod authenticator_data;
pub mod cose;
mod error;
pub mod pem;
mod response;
pub mod verifier;

pub use attestation::{
    AttestationObject, AttestationStatement, AttestationVerifier, AttestedCredential,
    FIDO_U2F_FORMAT, Verification, verify_attestation,
};
pub use authenticator_data::{AuthenticatorData, AuthenticatorFlags};
pub use error::{AttestationError, ErrorKind, Result};
pub use response::{AttestationResponse, RegistrationCredential};
