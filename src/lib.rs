//! Location attestation SDK
//!
//! Builds, signs, registers and verifies location attestations against
//! EAS-compatible registries. The crate is organized around a workflow
//! facade ([`AttestationSdk`]) backed by a schema validation engine, a
//! location/media extension registry, an EIP-712 off-chain signer and an
//! on-chain registrar.
//!
//! Typical use:
//!
//! ```no_run
//! use location_attestation::{AttestationInput, AttestationSdk, LocationInput, SdkConfig};
//!
//! # async fn run() -> location_attestation::Result<()> {
//! let mut sdk = AttestationSdk::new(SdkConfig::default())?;
//! let record = sdk.build_attestation(AttestationInput {
//!     location: Some(LocationInput::Coordinates { lon: 12.0, lat: 34.0 }),
//!     ..Default::default()
//! })?;
//! let signed = sdk.sign_offchain(record, None).await?;
//! assert!(sdk.verify_offchain(&signed).is_valid);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod extensions;
pub mod models;
pub mod offchain;
pub mod onchain;
pub mod schema;
pub mod sdk;

pub use builder::{AttestationBuilder, AttestationInput, MediaInput};
pub use config::{chain_deployment, ChainDeployment, SdkConfig};
pub use error::{Result, SdkError};
pub use extensions::{ExtensionRegistry, LocationExtension, LocationInput, MediaExtension};
pub use models::{
    Attestation, OffchainAttestation, OffchainVerificationResult, OnchainAttestation,
    OnchainVerificationResult, UnsignedAttestation,
};
pub use offchain::OffchainSigner;
pub use onchain::OnchainRegistrar;
pub use schema::{
    evaluate_schema, SchemaConfig, SchemaField, SchemaValidationCache, SchemaValidationResult,
};
pub use sdk::{AttestationSdk, RegisterOptions, SignOptions};

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
