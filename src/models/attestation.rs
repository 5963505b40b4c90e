//! Attestation record shapes
//!
//! One base struct holds everything shared between the two delivery
//! mechanisms; the signed off-chain and registered on-chain records extend
//! it and are carried together in the [`Attestation`] sum type, so call
//! sites discriminate with a match instead of probing for fields.

use serde::{Deserialize, Serialize};

/// An assembled, not-yet-signed location attestation record
///
/// Produced by the attestation builder and consumed by the off-chain signer
/// or on-chain registrar; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedAttestation {
    /// Event time in seconds since the Unix epoch
    pub event_timestamp: u64,

    /// Spatial reference system identifier
    pub srs: String,

    /// Location format tag (e.g. "geojson", "wkt")
    pub location_type: String,

    /// String-encoded location payload
    pub location: String,

    /// Recipe type tags; reserved, always empty in the current protocol
    pub recipe_type: Vec<String>,

    /// Recipe payloads; reserved, always empty in the current protocol
    pub recipe_payload: Vec<String>,

    /// MIME types of attached media, parallel to `media_data`
    pub media_type: Vec<String>,

    /// Processed media payloads, parallel to `media_type`
    pub media_data: Vec<String>,

    /// Optional free-text memo
    pub memo: Option<String>,

    /// Optional recipient address
    pub recipient: Option<String>,

    /// Optional revocability flag for on-chain registration
    pub revocable: Option<bool>,

    /// Optional expiration time in seconds since the Unix epoch
    pub expiration_time: Option<u64>,
}

/// An attestation signed off-chain with an EIP-712 signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffchainAttestation {
    /// The signed record
    #[serde(flatten)]
    pub attestation: UnsignedAttestation,

    /// Deterministic identifier of the signed payload
    pub uid: String,

    /// Hex-encoded 65-byte signature
    pub signature: String,

    /// Address of the signing key
    pub signer: String,

    /// Off-chain payload version
    pub version: String,
}

/// An attestation registered on-chain through an attestation registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnchainAttestation {
    /// The registered record
    #[serde(flatten)]
    pub attestation: UnsignedAttestation,

    /// UID assigned by the registry contract
    pub uid: String,

    /// Address that submitted the attestation
    pub attester: String,

    /// Chain name the attestation lives on
    pub chain: String,

    /// Chain identifier
    pub chain_id: u64,

    /// Registration transaction hash
    pub tx_hash: String,

    /// Block number the transaction was included in
    pub block_number: u64,

    /// Whether the attestation has been revoked
    pub revoked: bool,
}

impl OnchainAttestation {
    /// Whether the registry accepts a revocation for this record
    ///
    /// The registrar pins the flag on the embedded record at registration
    /// time; records built by hand without it default to revocable, matching
    /// the registration default.
    pub fn revocable(&self) -> bool {
        self.attestation.revocable.unwrap_or(true)
    }
}

/// Either delivery mechanism's record
///
/// Untagged on the wire: an on-chain record is recognized by its `tx_hash`,
/// an off-chain record by its `signature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attestation {
    /// Registered on-chain
    Onchain(OnchainAttestation),

    /// Signed off-chain
    Offchain(OffchainAttestation),
}

impl Attestation {
    /// UID of the record, whichever shape it has
    pub fn uid(&self) -> &str {
        match self {
            Attestation::Onchain(a) => &a.uid,
            Attestation::Offchain(a) => &a.uid,
        }
    }

    /// The shared unsigned record
    pub fn unsigned(&self) -> &UnsignedAttestation {
        match self {
            Attestation::Onchain(a) => &a.attestation,
            Attestation::Offchain(a) => &a.attestation,
        }
    }

    /// The off-chain record, if this is one
    pub fn as_offchain(&self) -> Option<&OffchainAttestation> {
        match self {
            Attestation::Offchain(a) => Some(a),
            Attestation::Onchain(_) => None,
        }
    }

    /// The on-chain record, if this is one
    pub fn as_onchain(&self) -> Option<&OnchainAttestation> {
        match self {
            Attestation::Onchain(a) => Some(a),
            Attestation::Offchain(_) => None,
        }
    }
}

impl From<OffchainAttestation> for Attestation {
    fn from(a: OffchainAttestation) -> Self {
        Attestation::Offchain(a)
    }
}

impl From<OnchainAttestation> for Attestation {
    fn from(a: OnchainAttestation) -> Self {
        Attestation::Onchain(a)
    }
}

/// Outcome of verifying an off-chain attestation; never an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffchainVerificationResult {
    /// Whether the signature matches the declared signer and payload
    pub is_valid: bool,

    /// Recovered signer address (when valid)
    pub signer_address: Option<String>,

    /// Why verification failed (when invalid)
    pub reason: Option<String>,
}

impl OffchainVerificationResult {
    /// A successful verification
    pub fn valid(signer_address: String) -> Self {
        OffchainVerificationResult {
            is_valid: true,
            signer_address: Some(signer_address),
            reason: None,
        }
    }

    /// A failed verification with a reason
    pub fn invalid(reason: impl Into<String>) -> Self {
        OffchainVerificationResult {
            is_valid: false,
            signer_address: None,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome of verifying an on-chain attestation; never an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnchainVerificationResult {
    /// Whether the attestation exists and is not revoked
    pub is_valid: bool,

    /// Whether the attestation has been revoked (when found)
    pub revoked: Option<bool>,

    /// Attester recorded by the registry (when found)
    pub attester: Option<String>,

    /// Why verification failed (when invalid)
    pub reason: Option<String>,
}

impl OnchainVerificationResult {
    /// A successful verification
    pub fn valid(attester: String) -> Self {
        OnchainVerificationResult {
            is_valid: true,
            revoked: Some(false),
            attester: Some(attester),
            reason: None,
        }
    }

    /// A failed verification with a reason
    pub fn invalid(reason: impl Into<String>) -> Self {
        OnchainVerificationResult {
            is_valid: false,
            revoked: None,
            attester: None,
            reason: Some(reason.into()),
        }
    }
}
