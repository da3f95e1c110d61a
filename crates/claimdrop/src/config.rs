//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use claimdrop_core::{Address, CampaignId, DigestScheme, MessageSchema};

use crate::error::ConfigError;

/// Hard ceiling on recipients per batch.
pub const MAX_BATCH_SIZE: usize = 200;

/// Configuration for a [`ClaimEngine`](crate::ClaimEngine).
///
/// All fields are fixed for the engine's lifetime. In particular the trusted
/// signer cannot be rotated; deploy a new campaign instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimConfig {
    /// Scopes ledger keys so several engines can share one ledger.
    #[serde(default)]
    pub campaign: CampaignId,
    /// The only identity whose signatures are honored.
    pub trusted_signer: Address,
    /// The engine's own address: spender on the token rail.
    pub engine_address: Address,
    #[serde(default)]
    pub schema: MessageSchema,
    #[serde(default)]
    pub digest_scheme: DigestScheme,
}

impl ClaimConfig {
    pub fn new(trusted_signer: Address, engine_address: Address) -> Self {
        Self {
            campaign: CampaignId::default(),
            trusted_signer,
            engine_address,
            schema: MessageSchema::default(),
            digest_scheme: DigestScheme::default(),
        }
    }

    pub fn with_campaign(mut self, campaign: CampaignId) -> Self {
        self.campaign = campaign;
        self
    }

    pub fn with_schema(mut self, schema: MessageSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_digest_scheme(mut self, digest_scheme: DigestScheme) -> Self {
        self.digest_scheme = digest_scheme;
        self
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Configuration for a [`BatchDistributor`](crate::BatchDistributor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// The distributor's own address: token spender and native escrow.
    pub address: Address,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_max_batch_size() -> usize {
    MAX_BATCH_SIZE
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            address: Address::ZERO,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl DistributorConfig {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// The limit may be lowered, never raised past [`MAX_BATCH_SIZE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::BatchSizeTooLarge {
                requested: self.max_batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(())
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_claim_config_defaults() {
        let json = r#"{
            "trusted_signer": "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
            "engine_address": "0x0101010101010101010101010101010101010101"
        }"#;
        let config = ClaimConfig::from_json(json).unwrap();
        assert_eq!(config.campaign, CampaignId::ZERO);
        assert_eq!(config.schema, MessageSchema::Nonced);
        assert_eq!(config.digest_scheme, DigestScheme::Raw);
        assert_eq!(
            config.trusted_signer.to_checksum(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_claim_config_full() {
        let json = r#"{
            "campaign": "0000000000000000000000000000000000000000000000000000000000000001",
            "trusted_signer": "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
            "engine_address": "0x0101010101010101010101010101010101010101",
            "schema": "legacy",
            "digest_scheme": "eth_signed_message"
        }"#;
        let config = ClaimConfig::from_json(json).unwrap();
        assert_eq!(config.campaign.as_bytes()[31], 1);
        assert_eq!(config.schema, MessageSchema::Legacy);
        assert_eq!(config.digest_scheme, DigestScheme::EthSignedMessage);
    }

    #[test]
    fn test_claim_config_rejects_bad_address() {
        let json = r#"{"trusted_signer": "0x1234", "engine_address": "0x00"}"#;
        assert!(matches!(ClaimConfig::from_json(json), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_claim_config_from_file() {
        let config = ClaimConfig::new(Address::from_bytes([1; 20]), Address::from_bytes([2; 20]))
            .with_schema(MessageSchema::Legacy);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&config).unwrap().as_bytes())
            .unwrap();
        assert_eq!(ClaimConfig::from_file(file.path()).unwrap(), config);
    }

    #[test]
    fn test_distributor_config_limits() {
        let ok = DistributorConfig::from_json(
            r#"{"address": "0x0101010101010101010101010101010101010101", "max_batch_size": 50}"#,
        )
        .unwrap();
        assert_eq!(ok.max_batch_size, 50);

        let default = DistributorConfig::from_json(
            r#"{"address": "0x0101010101010101010101010101010101010101"}"#,
        )
        .unwrap();
        assert_eq!(default.max_batch_size, MAX_BATCH_SIZE);

        assert!(matches!(
            DistributorConfig::from_json(
                r#"{"address": "0x0101010101010101010101010101010101010101", "max_batch_size": 201}"#,
            ),
            Err(ConfigError::BatchSizeTooLarge { requested: 201, max: 200 })
        ));
    }
}
