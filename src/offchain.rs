//! Off-chain EIP-712 signing and verification
//!
//! Signs attestation records as EIP-712 typed data with a local wallet and
//! verifies signed records by recovering the signer address. Everything
//! here is local; no network access is involved.

use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip712::{Eip712, TypedData};
use ethers::types::{Address, RecoveryMessage, Signature, H256};
use ethers::utils::to_checksum;
use log::info;

use crate::error::{Result, SdkError};
use crate::models::{OffchainAttestation, OffchainVerificationResult, UnsignedAttestation};

/// EIP-712 domain name for location attestations
pub const EIP712_DOMAIN_NAME: &str = "Location Attestation";

/// EIP-712 domain version
pub const EIP712_DOMAIN_VERSION: &str = "1";

/// Version tag carried by signed off-chain records
pub const OFFCHAIN_PAYLOAD_VERSION: &str = "1.0.0";

/// Build the typed-data payload for an attestation under a chain's domain
fn typed_data(attestation: &UnsignedAttestation, chain_id: u64) -> Result<TypedData> {
    let json = serde_json::json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
            ],
            "LocationAttestation": [
                { "name": "eventTimestamp", "type": "uint256" },
                { "name": "srs", "type": "string" },
                { "name": "locationType", "type": "string" },
                { "name": "location", "type": "string" },
                { "name": "recipeType", "type": "string[]" },
                { "name": "recipePayload", "type": "string[]" },
                { "name": "mediaType", "type": "string[]" },
                { "name": "mediaData", "type": "string[]" },
                { "name": "memo", "type": "string" },
            ],
        },
        "primaryType": "LocationAttestation",
        "domain": {
            "name": EIP712_DOMAIN_NAME,
            "version": EIP712_DOMAIN_VERSION,
            "chainId": chain_id,
        },
        "message": {
            "eventTimestamp": attestation.event_timestamp,
            "srs": &attestation.srs,
            "locationType": &attestation.location_type,
            "location": &attestation.location,
            "recipeType": &attestation.recipe_type,
            "recipePayload": &attestation.recipe_payload,
            "mediaType": &attestation.media_type,
            "mediaData": &attestation.media_data,
            "memo": attestation.memo.clone().unwrap_or_default(),
        },
    });
    let typed = serde_json::from_value(json)?;
    Ok(typed)
}

/// Off-chain signer bound to one wallet and chain
pub struct OffchainSigner {
    wallet: LocalWallet,
    chain_id: u64,
}

impl OffchainSigner {
    /// Create a signer from a hex private key and chain id
    pub fn new(private_key: &str, chain_id: u64) -> Result<Self> {
        let wallet = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| SdkError::Signing(format!("invalid private key: {}", e)))?
            .with_chain_id(chain_id);
        Ok(OffchainSigner { wallet, chain_id })
    }

    /// Address of the signing key
    pub fn address(&self) -> String {
        to_checksum(&self.wallet.address(), None)
    }

    /// Sign an attestation, producing the signed off-chain record
    ///
    /// The record UID is the EIP-712 digest of the signed payload, so
    /// identical records produce identical UIDs.
    pub async fn sign(&self, attestation: UnsignedAttestation) -> Result<OffchainAttestation> {
        let typed = typed_data(&attestation, self.chain_id)?;
        let digest = typed
            .encode_eip712()
            .map_err(|e| SdkError::Signing(e.to_string()))?;
        let signature = self
            .wallet
            .sign_typed_data(&typed)
            .await
            .map_err(|e| SdkError::Signing(e.to_string()))?;

        let uid = format!("0x{}", hex::encode(digest));
        info!("Signed off-chain attestation {}", uid);

        Ok(OffchainAttestation {
            attestation,
            uid,
            signature: format!("0x{}", signature),
            signer: self.address(),
            version: OFFCHAIN_PAYLOAD_VERSION.to_string(),
        })
    }

    /// Verify a signed off-chain record; never errors
    pub fn verify(record: &OffchainAttestation, chain_id: u64) -> OffchainVerificationResult {
        match Self::check(record, chain_id) {
            Ok(signer) => OffchainVerificationResult::valid(signer),
            Err(reason) => OffchainVerificationResult::invalid(reason),
        }
    }

    /// Inner verification; any failure becomes a reason string
    fn check(record: &OffchainAttestation, chain_id: u64) -> std::result::Result<String, String> {
        let typed = typed_data(&record.attestation, chain_id)
            .map_err(|e| format!("could not rebuild typed data: {}", e))?;
        let digest = typed
            .encode_eip712()
            .map_err(|e| format!("could not hash typed data: {}", e))?;

        let expected_uid = format!("0x{}", hex::encode(digest));
        if record.uid != expected_uid {
            return Err("uid does not match the signed payload".to_string());
        }

        let signature = record
            .signature
            .parse::<Signature>()
            .map_err(|e| format!("malformed signature: {}", e))?;
        let declared = record
            .signer
            .parse::<Address>()
            .map_err(|e| format!("malformed signer address: {}", e))?;

        let recovered = signature
            .recover(RecoveryMessage::Hash(H256::from(digest)))
            .map_err(|e| format!("signature recovery failed: {}", e))?;

        if recovered != declared {
            return Err(format!(
                "recovered signer {} does not match declared signer {}",
                to_checksum(&recovered, None),
                record.signer
            ));
        }

        Ok(to_checksum(&recovered, None))
    }
}
