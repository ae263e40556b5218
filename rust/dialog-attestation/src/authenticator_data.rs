//! Decoding of the `authenticatorData` byte layout produced at registration.
//!
//! ```text
//! rpIdHash (32) | flags (1) | signCount (4, BE) | aaguid (16)
//! | credentialIdLength (2, BE) | credentialId (L) | credentialPublicKey (rest)
//! ```

use crate::error::{AttestationError, Result};

/// Length of the relying party ID hash.
pub const RP_ID_HASH_LEN: usize = 32;

/// Length of the authenticator attestation GUID.
pub const AAGUID_LEN: usize = 16;

/// The flags byte of an authenticator data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticatorFlags(u8);

impl AuthenticatorFlags {
    /// UP: the user was present.
    pub const USER_PRESENT: u8 = 0x01;
    /// UV: the user was verified.
    pub const USER_VERIFIED: u8 = 0x04;
    /// AT: attested credential data follows the counter.
    pub const ATTESTED_CREDENTIAL_DATA: u8 = 0x40;
    /// ED: extension data follows the credential data.
    pub const EXTENSION_DATA: u8 = 0x80;

    /// Wrap a raw flags byte.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// The raw flags byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the user-presence bit is set.
    #[must_use]
    pub const fn user_present(self) -> bool {
        self.0 & Self::USER_PRESENT != 0
    }

    /// Whether the user-verified bit is set.
    #[must_use]
    pub const fn user_verified(self) -> bool {
        self.0 & Self::USER_VERIFIED != 0
    }

    /// Whether attested credential data is flagged as present.
    #[must_use]
    pub const fn has_attested_credential_data(self) -> bool {
        self.0 & Self::ATTESTED_CREDENTIAL_DATA != 0
    }

    /// Whether extension data is flagged as present.
    #[must_use]
    pub const fn has_extension_data(self) -> bool {
        self.0 & Self::EXTENSION_DATA != 0
    }
}

/// Typed view over a registration `authenticatorData` buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    /// SHA-256 of the relying party ID.
    pub rp_id_hash: [u8; RP_ID_HASH_LEN],
    /// Authenticator flags.
    pub flags: AuthenticatorFlags,
    /// Signature counter.
    pub counter: u32,
    /// Authenticator attestation GUID (all zero for U2F devices).
    pub aaguid: [u8; AAGUID_LEN],
    /// The newly created credential ID.
    pub credential_id: Vec<u8>,
    /// The CBOR-encoded COSE public key of the credential.
    pub credential_public_key: Vec<u8>,
}

impl AuthenticatorData {
    /// Parse an `authenticatorData` buffer.
    ///
    /// Fields are read strictly in order. Everything after the credential ID
    /// is taken as the COSE public key.
    ///
    /// # Errors
    ///
    /// Returns [`AttestationError::MalformedAuthenticatorData`] if the buffer
    /// ends before any fixed field or before the announced credential ID length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let rp_id_hash = reader.array::<RP_ID_HASH_LEN>("rpIdHash")?;
        let [flags] = reader.array::<1>("flags")?;
        let counter = u32::from_be_bytes(reader.array::<4>("signCount")?);
        let aaguid = reader.array::<AAGUID_LEN>("aaguid")?;
        let credential_id_len = u16::from_be_bytes(reader.array::<2>("credentialIdLength")?);
        let credential_id = reader.take(usize::from(credential_id_len), "credentialId")?;
        let credential_public_key = reader.rest();

        Ok(Self {
            rp_id_hash,
            flags: AuthenticatorFlags::new(flags),
            counter,
            aaguid,
            credential_id: credential_id.to_vec(),
            credential_public_key: credential_public_key.to_vec(),
        })
    }
}

/// Forward-only cursor over an immutable buffer with per-field bounds checks.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(AttestationError::MalformedAuthenticatorData {
                field,
                needed: len,
                remaining,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.offset..];
        self.offset = self.bytes.len();
        slice
    }
}
