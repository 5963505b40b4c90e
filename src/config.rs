//! SDK configuration
//!
//! Runtime configuration for the workflow facade: credentials, default
//! chain and schema, strict-mode policy, and the list of schemas validated
//! at startup. Also hosts the static table of supported registry
//! deployments.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::SchemaConfig;

/// Default schema string for location attestations (protocol version 2)
pub const DEFAULT_SCHEMA_STRING: &str = "uint8 specVersion,uint256 eventTimestamp,string srs,\
string locationType,string location,string[] recipeType,string[] recipePayload,\
string[] mediaType,string[] mediaData,string memo";

/// UID under which the default schema is registered
pub const DEFAULT_SCHEMA_UID: &str =
    "0xdc2fc89ec29074bf9a5fa29b7a4c0c9a6dd4c4b4f8eb6b9e5a2f5c0e65a9b1d3";

/// A supported attestation registry deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDeployment {
    /// Chain name used throughout the SDK
    pub name: String,

    /// EVM chain identifier
    pub chain_id: u64,

    /// Address of the attestation registry contract
    pub registry_address: String,
}

/// Registry deployments the SDK knows about
const DEPLOYMENTS: [(&str, u64, &str); 4] = [
    ("sepolia", 11155111, "0xC2679fBD37d54388Ce493F1DB75320D236e1815e"),
    ("base", 8453, "0x4200000000000000000000000000000000000021"),
    ("arbitrum", 42161, "0xbD75f629A22Dc1ceD33dDA0b68c546A1c035c458"),
    ("celo", 42220, "0x72E1d8ccf5299fb36fEfD8CC4394B8ef7e98Af92"),
];

/// Look up a supported registry deployment by chain name
pub fn chain_deployment(name: &str) -> Option<ChainDeployment> {
    DEPLOYMENTS
        .iter()
        .find(|(chain, _, _)| *chain == name)
        .map(|(chain, chain_id, address)| ChainDeployment {
            name: chain.to_string(),
            chain_id: *chain_id,
            registry_address: address.to_string(),
        })
}

/// SDK configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// RPC endpoint for on-chain operations
    pub rpc_url: Option<String>,

    /// Hex-encoded private key for signing and registering
    pub private_key: Option<String>,

    /// Default chain for on-chain operations
    pub default_chain: String,

    /// UID of the schema used when an operation does not name one
    pub default_schema_uid: String,

    /// Whether schema defects raise errors instead of being reported
    pub strict_schema_validation: bool,

    /// Schemas validated when the facade is constructed
    pub schemas: Vec<SchemaConfig>,

    /// Whether to enable debug mode
    pub debug_mode: bool,
}

impl Default for SdkConfig {
    fn default() -> Self {
        SdkConfig {
            rpc_url: None,
            private_key: None,
            default_chain: "sepolia".to_string(),
            default_schema_uid: DEFAULT_SCHEMA_UID.to_string(),
            strict_schema_validation: false,
            schemas: vec![SchemaConfig::new(DEFAULT_SCHEMA_UID, DEFAULT_SCHEMA_STRING)],
            debug_mode: false,
        }
    }
}

impl SdkConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strict-mode configuration
    pub fn strict() -> Self {
        let mut config = Self::default();
        config.strict_schema_validation = true;
        config
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
