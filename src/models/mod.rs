//! Data models for location attestations
//!
//! This module provides the attestation record shapes: the unsigned base
//! record, the signed off-chain and registered on-chain variants, and the
//! verification result structures returned by the collaborators.

mod attestation;

pub use attestation::{
    Attestation, OffchainAttestation, OffchainVerificationResult, OnchainAttestation,
    OnchainVerificationResult, UnsignedAttestation,
};

/// Default spatial reference system for attestations (WGS84)
pub const DEFAULT_SRS: &str = "EPSG:4326";
