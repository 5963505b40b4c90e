//! Workflow facade
//!
//! The public entry point of the SDK. Owns the configuration, the schema
//! validation cache and the extension registry, lazily constructs the
//! off-chain signer and on-chain registrar once credentials are available,
//! and applies the cache's strict/warn policy at every operation.

use log::{debug, info};

use crate::builder::{AttestationBuilder, AttestationInput};
use crate::config::{chain_deployment, SdkConfig};
use crate::error::{Result, SdkError};
use crate::extensions::{ExtensionRegistry, LocationExtension, MediaExtension};
use crate::models::{
    OffchainAttestation, OffchainVerificationResult, OnchainAttestation,
    OnchainVerificationResult, UnsignedAttestation,
};
use crate::offchain::OffchainSigner;
use crate::onchain::OnchainRegistrar;
use crate::schema::{SchemaConfig, SchemaValidationCache, SchemaValidationResult};

/// Per-call overrides for off-chain signing
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Private key to sign with when the facade has none configured
    pub private_key: Option<String>,
}

/// Per-call overrides for on-chain operations
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Schema UID to register under; facade default when absent
    pub schema_uid: Option<String>,

    /// Target chain; facade default when absent
    pub chain: Option<String>,

    /// RPC endpoint when the facade has none configured
    pub rpc_url: Option<String>,

    /// Private key when the facade has none configured
    pub private_key: Option<String>,
}

/// The SDK facade
///
/// Construction validates every pre-registered schema through the cache
/// under the configured policy, so a strict facade with a defective schema
/// fails immediately instead of at first use.
pub struct AttestationSdk {
    config: SdkConfig,
    cache: SchemaValidationCache,
    registry: ExtensionRegistry,
    offchain: Option<OffchainSigner>,
    onchain: Option<OnchainRegistrar>,
}

impl AttestationSdk {
    /// Create a facade from configuration
    pub fn new(config: SdkConfig) -> Result<Self> {
        let mut cache = SchemaValidationCache::new(config.strict_schema_validation);
        for schema in &config.schemas {
            cache.validate(schema)?;
        }
        info!(
            "SDK initialized with {} schema(s), strict={}",
            config.schemas.len(),
            config.strict_schema_validation
        );

        Ok(AttestationSdk {
            config,
            cache,
            registry: ExtensionRegistry::with_defaults(),
            offchain: None,
            onchain: None,
        })
    }

    /// UID of the schema used when operations do not name one
    pub fn default_schema_uid(&self) -> &str {
        &self.config.default_schema_uid
    }

    /// Configuration of the default schema, when pre-registered
    pub fn default_schema(&self) -> Option<&SchemaConfig> {
        self.config
            .schemas
            .iter()
            .find(|s| s.uid == self.config.default_schema_uid)
    }

    /// The validation cache, for introspection
    pub fn schema_cache(&self) -> &SchemaValidationCache {
        &self.cache
    }

    /// Validate a schema through the facade's cache and policy
    pub fn validate_schema(&mut self, config: &SchemaConfig) -> Result<SchemaValidationResult> {
        self.cache.validate(config)
    }

    /// Register an additional location extension
    pub fn register_location_extension(&mut self, extension: Box<dyn LocationExtension>) {
        self.registry.register_location(extension);
    }

    /// Register an additional media extension
    pub fn register_media_extension(&mut self, extension: Box<dyn MediaExtension>) {
        self.registry.register_media(extension);
    }

    /// Run the configured schema for `uid` through the cache's policy
    ///
    /// Schemas the facade has no definition for are skipped; there is
    /// nothing to validate against.
    fn apply_schema_policy(&mut self, uid: &str) -> Result<Option<SchemaValidationResult>> {
        let config = self.config.schemas.iter().find(|s| s.uid == uid).cloned();
        match config {
            Some(config) => self.cache.validate(&config).map(Some),
            None => {
                debug!("No schema definition configured for {}", uid);
                Ok(None)
            }
        }
    }

    /// Build an unsigned attestation from caller input
    ///
    /// When the default schema is configured and parseable, the assembled
    /// record's field set is checked against it.
    pub fn build_attestation(&mut self, input: AttestationInput) -> Result<UnsignedAttestation> {
        let uid = self.config.default_schema_uid.clone();
        let schema = self.apply_schema_policy(&uid)?;
        let builder = AttestationBuilder::new(&self.registry);
        match &schema {
            Some(result) if result.valid => builder.with_schema(&result.fields).build(input),
            _ => builder.build(input),
        }
    }

    /// Resolve the chain id of the facade's default chain
    fn default_chain_id(&self) -> Result<u64> {
        chain_deployment(&self.config.default_chain)
            .map(|d| d.chain_id)
            .ok_or_else(|| {
                SdkError::Chain(format!(
                    "unsupported chain: {}",
                    self.config.default_chain
                ))
            })
    }

    /// Get or lazily construct the off-chain signer
    fn ensure_offchain(&mut self, options: Option<&SignOptions>) -> Result<&OffchainSigner> {
        if self.offchain.is_none() {
            let key = options
                .and_then(|o| o.private_key.clone())
                .or_else(|| self.config.private_key.clone())
                .ok_or_else(|| {
                    SdkError::MissingCredentials(
                        "no private key configured for off-chain signing".to_string(),
                    )
                })?;
            let chain_id = self.default_chain_id()?;
            self.offchain = Some(OffchainSigner::new(&key, chain_id)?);
        }
        match &self.offchain {
            Some(signer) => Ok(signer),
            None => Err(SdkError::MissingCredentials(
                "off-chain signer unavailable".to_string(),
            )),
        }
    }

    /// Get or lazily construct the on-chain registrar
    fn ensure_onchain(&mut self, options: Option<&RegisterOptions>) -> Result<&OnchainRegistrar> {
        if self.onchain.is_none() {
            let rpc_url = options
                .and_then(|o| o.rpc_url.clone())
                .or_else(|| self.config.rpc_url.clone())
                .ok_or_else(|| {
                    SdkError::MissingCredentials(
                        "no RPC endpoint configured for on-chain operations".to_string(),
                    )
                })?;
            let key = options
                .and_then(|o| o.private_key.clone())
                .or_else(|| self.config.private_key.clone())
                .ok_or_else(|| {
                    SdkError::MissingCredentials(
                        "no private key configured for on-chain operations".to_string(),
                    )
                })?;
            let chain = options
                .and_then(|o| o.chain.clone())
                .unwrap_or_else(|| self.config.default_chain.clone());
            self.onchain = Some(OnchainRegistrar::new(&rpc_url, &key, &chain)?);
        }
        match &self.onchain {
            Some(registrar) => Ok(registrar),
            None => Err(SdkError::MissingCredentials(
                "on-chain registrar unavailable".to_string(),
            )),
        }
    }

    /// Sign an attestation off-chain
    pub async fn sign_offchain(
        &mut self,
        attestation: UnsignedAttestation,
        options: Option<SignOptions>,
    ) -> Result<OffchainAttestation> {
        let uid = self.config.default_schema_uid.clone();
        self.apply_schema_policy(&uid)?;
        let signer = self.ensure_offchain(options.as_ref())?;
        signer.sign(attestation).await
    }

    /// Verify a signed off-chain record; never errors
    pub fn verify_offchain(&self, record: &OffchainAttestation) -> OffchainVerificationResult {
        match self.default_chain_id() {
            Ok(chain_id) => OffchainSigner::verify(record, chain_id),
            Err(e) => OffchainVerificationResult::invalid(e.to_string()),
        }
    }

    /// Register an attestation on-chain
    pub async fn register_onchain(
        &mut self,
        attestation: UnsignedAttestation,
        options: Option<RegisterOptions>,
    ) -> Result<OnchainAttestation> {
        let schema_uid = options
            .as_ref()
            .and_then(|o| o.schema_uid.clone())
            .unwrap_or_else(|| self.config.default_schema_uid.clone());
        self.apply_schema_policy(&schema_uid)?;
        let registrar = self.ensure_onchain(options.as_ref())?;
        registrar.register(attestation, &schema_uid).await
    }

    /// Verify a registered on-chain record; never errors
    pub async fn verify_onchain(&mut self, record: &OnchainAttestation) -> OnchainVerificationResult {
        match self.ensure_onchain(None) {
            Ok(registrar) => registrar.verify(record).await,
            Err(e) => OnchainVerificationResult::invalid(e.to_string()),
        }
    }

    /// Revoke a registered on-chain attestation
    ///
    /// The record's flags are checked locally before any collaborator is
    /// constructed, so an operation guaranteed to fail never reaches the
    /// network.
    pub async fn revoke_onchain(
        &mut self,
        record: &OnchainAttestation,
        options: Option<RegisterOptions>,
    ) -> Result<OnchainAttestation> {
        if !record.revocable() {
            return Err(SdkError::Revocation(format!(
                "attestation {} is not revocable",
                record.uid
            )));
        }
        if record.revoked {
            return Err(SdkError::Revocation(format!(
                "attestation {} is already revoked",
                record.uid
            )));
        }

        let schema_uid = options
            .as_ref()
            .and_then(|o| o.schema_uid.clone())
            .unwrap_or_else(|| self.config.default_schema_uid.clone());
        let registrar = self.ensure_onchain(options.as_ref())?;
        registrar.revoke(record, &schema_uid).await
    }
}
