//! On-chain attestation registration
//!
//! Thin wrapper around an EAS-compatible attestation registry contract:
//! submits attest/revoke transactions through a signing middleware and
//! reads attestation state back for verification. Gas strategy and nonce
//! management stay with the provider.

use std::sync::Arc;

use ethers::abi::{self, Token};
use ethers::contract::{abigen, parse_log};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::to_checksum;
use log::info;

use crate::config::chain_deployment;
use crate::error::{Result, SdkError};
use crate::models::{OnchainAttestation, OnchainVerificationResult, UnsignedAttestation};

abigen!(
    AttestationRegistry,
    r#"[
        struct AttestationRequestData { address recipient; uint64 expirationTime; bool revocable; bytes32 refUID; bytes data; uint256 value; }
        struct AttestationRequest { bytes32 schema; AttestationRequestData data; }
        struct RevocationRequestData { bytes32 uid; uint256 value; }
        struct RevocationRequest { bytes32 schema; RevocationRequestData data; }
        struct RegistryAttestation { bytes32 uid; bytes32 schema; uint64 time; uint64 expirationTime; uint64 revocationTime; bytes32 refUID; address recipient; address attester; bool revocable; bytes data; }
        function attest(AttestationRequest request) external payable returns (bytes32)
        function revoke(RevocationRequest request) external payable
        function getAttestation(bytes32 uid) external view returns (RegistryAttestation)
        function isAttestationValid(bytes32 uid) external view returns (bool)
        event Attested(address indexed recipient, address indexed attester, bytes32 uid, bytes32 indexed schemaUID)
        event Revoked(address indexed recipient, address indexed attester, bytes32 uid, bytes32 indexed schemaUID)
    ]"#
);

type RegistryClient = AttestationRegistry<SignerMiddleware<Provider<Http>, LocalWallet>>;

/// Raw `getAttestation` return value, in declaration order: uid, schema,
/// time, expirationTime, revocationTime, refUID, recipient, attester,
/// revocable, data
type RegistryRecord = (
    [u8; 32],
    [u8; 32],
    u64,
    u64,
    u64,
    [u8; 32],
    Address,
    Address,
    bool,
    Bytes,
);

/// Decode a 0x-prefixed hex UID into registry bytes
fn parse_bytes32(uid: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(uid.trim_start_matches("0x"))
        .map_err(|e| SdkError::InvalidInput(format!("invalid uid {:?}: {}", uid, e)))?;
    bytes
        .try_into()
        .map_err(|_| SdkError::InvalidInput(format!("uid {:?} is not 32 bytes", uid)))
}

/// ABI-encode the attestation fields into the registry's `data` payload
///
/// Layout matches the registered schema string: timestamp, srs, location
/// type and payload, the reserved recipe arrays, the media arrays, and the
/// memo.
fn encode_attestation_data(attestation: &UnsignedAttestation) -> Vec<u8> {
    let strings = |values: &[String]| {
        Token::Array(values.iter().map(|v| Token::String(v.clone())).collect())
    };
    abi::encode(&[
        Token::Uint(U256::from(attestation.event_timestamp)),
        Token::String(attestation.srs.clone()),
        Token::String(attestation.location_type.clone()),
        Token::String(attestation.location.clone()),
        strings(&attestation.recipe_type),
        strings(&attestation.recipe_payload),
        strings(&attestation.media_type),
        strings(&attestation.media_data),
        Token::String(attestation.memo.clone().unwrap_or_default()),
    ])
}

/// Turn the registry's raw attestation record into a verification result
///
/// An all-zero uid means the registry has no such attestation; a non-zero
/// revocation time means it was revoked.
fn interpret_registry_record(record: RegistryRecord) -> OnchainVerificationResult {
    let (uid, _, _, _, revocation_time, _, _, attester, _, _) = record;
    if uid == [0u8; 32] {
        return OnchainVerificationResult::invalid("attestation not found");
    }

    let attester = to_checksum(&attester, None);
    if revocation_time != 0 {
        return OnchainVerificationResult {
            is_valid: false,
            revoked: Some(true),
            attester: Some(attester),
            reason: Some("attestation has been revoked".to_string()),
        };
    }
    OnchainVerificationResult::valid(attester)
}

/// Registrar bound to one registry deployment and signing account
pub struct OnchainRegistrar {
    contract: RegistryClient,
    chain: String,
    chain_id: u64,
    attester: Address,
}

impl OnchainRegistrar {
    /// Create a registrar for a supported chain
    pub fn new(rpc_url: &str, private_key: &str, chain: &str) -> Result<Self> {
        let deployment = chain_deployment(chain)
            .ok_or_else(|| SdkError::Chain(format!("unsupported chain: {}", chain)))?;
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| SdkError::Chain(format!("invalid RPC endpoint: {}", e)))?;
        let wallet = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| SdkError::Signing(format!("invalid private key: {}", e)))?
            .with_chain_id(deployment.chain_id);
        let attester = wallet.address();
        let registry_address = deployment
            .registry_address
            .parse::<Address>()
            .map_err(|e| SdkError::Chain(format!("invalid registry address: {}", e)))?;

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        info!(
            "Registrar ready for {} (registry {})",
            deployment.name, deployment.registry_address
        );

        Ok(OnchainRegistrar {
            contract: AttestationRegistry::new(registry_address, client),
            chain: deployment.name,
            chain_id: deployment.chain_id,
            attester,
        })
    }

    /// Chain name this registrar targets
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Chain id this registrar targets
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Submit an attestation to the registry under a schema UID
    pub async fn register(
        &self,
        mut attestation: UnsignedAttestation,
        schema_uid: &str,
    ) -> Result<OnchainAttestation> {
        let schema = parse_bytes32(schema_uid)?;
        let recipient = match &attestation.recipient {
            Some(address) => address
                .parse::<Address>()
                .map_err(|e| SdkError::InvalidInput(format!("invalid recipient: {}", e)))?,
            None => Address::zero(),
        };
        // Pin down the flag the registry will actually record
        let revocable = attestation.revocable.unwrap_or(true);
        attestation.revocable = Some(revocable);

        let request = AttestationRequest {
            schema,
            data: AttestationRequestData {
                recipient,
                expiration_time: attestation.expiration_time.unwrap_or(0),
                revocable,
                ref_uid: [0u8; 32],
                data: encode_attestation_data(&attestation).into(),
                value: U256::zero(),
            },
        };

        // The call must outlive the pending transaction borrowing it
        let call = self.contract.attest(request);
        let pending = call
            .send()
            .await
            .map_err(|e| SdkError::Chain(format!("attest transaction failed: {}", e)))?;
        let receipt = pending
            .await
            .map_err(|e| SdkError::Chain(format!("attest confirmation failed: {}", e)))?
            .ok_or_else(|| SdkError::Chain("attest transaction dropped".to_string()))?;

        let uid = receipt
            .logs
            .iter()
            .find_map(|log| {
                parse_log::<AttestedFilter>(log.clone())
                    .ok()
                    .map(|event| format!("0x{}", hex::encode(event.uid)))
            })
            .ok_or_else(|| SdkError::Chain("no Attested event in receipt".to_string()))?;

        let tx_hash = format!("{:?}", receipt.transaction_hash);
        let block_number = receipt.block_number.map(|n| n.as_u64()).unwrap_or_default();
        info!("Registered attestation {} in tx {}", uid, tx_hash);

        Ok(OnchainAttestation {
            attestation,
            uid,
            attester: to_checksum(&self.attester, None),
            chain: self.chain.clone(),
            chain_id: self.chain_id,
            tx_hash,
            block_number,
            revoked: false,
        })
    }

    /// Check the registry's view of a registered attestation; never errors
    pub async fn verify(&self, record: &OnchainAttestation) -> OnchainVerificationResult {
        let uid = match parse_bytes32(&record.uid) {
            Ok(uid) => uid,
            Err(e) => return OnchainVerificationResult::invalid(e.to_string()),
        };
        match self.contract.get_attestation(uid).call().await {
            Ok(raw) => interpret_registry_record(raw),
            Err(e) => OnchainVerificationResult::invalid(format!("registry query failed: {}", e)),
        }
    }

    /// Revoke a registered attestation, returning the updated record
    pub async fn revoke(
        &self,
        record: &OnchainAttestation,
        schema_uid: &str,
    ) -> Result<OnchainAttestation> {
        let request = RevocationRequest {
            schema: parse_bytes32(schema_uid)?,
            data: RevocationRequestData {
                uid: parse_bytes32(&record.uid)?,
                value: U256::zero(),
            },
        };

        let call = self.contract.revoke(request);
        let pending = call
            .send()
            .await
            .map_err(|e| SdkError::Chain(format!("revoke transaction failed: {}", e)))?;
        pending
            .await
            .map_err(|e| SdkError::Chain(format!("revoke confirmation failed: {}", e)))?
            .ok_or_else(|| SdkError::Chain("revoke transaction dropped".to_string()))?;

        info!("Revoked attestation {}", record.uid);
        let mut revoked = record.clone();
        revoked.revoked = true;
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn unsigned() -> UnsignedAttestation {
        UnsignedAttestation {
            event_timestamp: 1_700_000_000,
            srs: "EPSG:4326".to_string(),
            location_type: "geojson".to_string(),
            location: r#"{"type":"Point","coordinates":[12.0,34.0]}"#.to_string(),
            recipe_type: Vec::new(),
            recipe_payload: Vec::new(),
            media_type: Vec::new(),
            media_data: Vec::new(),
            memo: None,
            recipient: None,
            revocable: Some(true),
            expiration_time: None,
        }
    }

    #[test]
    fn test_parse_bytes32() {
        let uid = format!("0x{}", "ab".repeat(32));
        assert_eq!(parse_bytes32(&uid).unwrap(), [0xab; 32]);
        // Without prefix
        assert_eq!(parse_bytes32(&"ab".repeat(32)).unwrap(), [0xab; 32]);

        assert!(parse_bytes32("0x1234").is_err());
        assert!(parse_bytes32("0xzz").is_err());
    }

    #[test]
    fn test_encode_attestation_data_is_deterministic() {
        let a = encode_attestation_data(&unsigned());
        let b = encode_attestation_data(&unsigned());
        assert_eq!(a, b);
        assert!(!a.is_empty());

        let mut other = unsigned();
        other.memo = Some("changed".to_string());
        assert_ne!(a, encode_attestation_data(&other));
    }

    #[test]
    fn test_registrar_construction() {
        let registrar = OnchainRegistrar::new("http://localhost:8545", TEST_KEY, "sepolia").unwrap();
        assert_eq!(registrar.chain(), "sepolia");
        assert_eq!(registrar.chain_id(), 11155111);
    }

    fn registry_record(uid: [u8; 32], revocation_time: u64) -> RegistryRecord {
        let attester = "0x1111111111111111111111111111111111111111"
            .parse::<Address>()
            .unwrap();
        (
            uid,
            [0u8; 32],
            1_700_000_000,
            0,
            revocation_time,
            [0u8; 32],
            Address::zero(),
            attester,
            true,
            Bytes::new(),
        )
    }

    #[test]
    fn test_interpret_missing_attestation() {
        let result = interpret_registry_record(registry_record([0u8; 32], 0));
        assert!(!result.is_valid);
        assert!(result.reason.unwrap().contains("not found"));
        assert!(result.attester.is_none());
    }

    #[test]
    fn test_interpret_revoked_attestation() {
        let result = interpret_registry_record(registry_record([0xab; 32], 1_700_000_100));
        assert!(!result.is_valid);
        assert_eq!(result.revoked, Some(true));
        assert!(result.attester.is_some());
        assert!(result.reason.unwrap().contains("revoked"));
    }

    #[test]
    fn test_interpret_live_attestation() {
        let result = interpret_registry_record(registry_record([0xab; 32], 0));
        assert!(result.is_valid);
        assert_eq!(result.revoked, Some(false));
        assert_eq!(
            result.attester.as_deref(),
            Some("0x1111111111111111111111111111111111111111")
        );
    }

    #[test]
    fn test_registrar_rejects_unsupported_chain() {
        match OnchainRegistrar::new("http://localhost:8545", TEST_KEY, "mainnet") {
            Err(SdkError::Chain(message)) => assert!(message.contains("mainnet")),
            Err(other) => panic!("Expected Chain error, got {:?}", other),
            Ok(_) => panic!("Expected Chain error, got a registrar"),
        }
    }

    #[test]
    fn test_registrar_rejects_bad_key() {
        assert!(OnchainRegistrar::new("http://localhost:8545", "0xzz", "sepolia").is_err());
    }
}
