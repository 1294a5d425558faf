//! Configuration loading from stablecore.toml.

use runtime::adapter::{Network, WalletKind};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Target ledger.
    pub network: Network,

    /// Base URL of the mirror serving capability and balance reads.
    pub mirror: String,

    /// Seconds to wait for a submission before giving up.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    pub wallet: WalletConfig,

    /// Required when `wallet.kind` is `multisig`.
    pub multisig: Option<MultisigConfig>,
}

/// Which backend to run operations through, and its credentials.
#[derive(Debug, Deserialize)]
pub struct WalletConfig {
    pub kind: WalletKind,

    /// Operator account, `shard.realm.num`.
    pub account: String,

    /// Hex-encoded private key. Required for the native backend; optional
    /// for multisig (an instance without a key only records).
    pub key: Option<String>,

    /// Consensus node URL (native) or JSON-RPC relay URL (contract).
    pub endpoint: Option<String>,
}

/// Threshold-signing settings.
#[derive(Debug, Deserialize)]
pub struct MultisigConfig {
    /// Where pending transactions are parked.
    #[serde(default = "default_pending_db")]
    pub db: String,

    /// Hex public keys of every signer.
    pub keys: Vec<String>,

    pub threshold: u32,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_pending_db() -> String {
    "pending.db".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        match self.wallet.kind {
            WalletKind::Native => {
                if self.wallet.key.is_none() {
                    return Err(ConfigError::Missing("wallet.key"));
                }
                if self.wallet.endpoint.is_none() {
                    return Err(ConfigError::Missing("wallet.endpoint"));
                }
            }
            WalletKind::Contract => {
                if self.wallet.endpoint.is_none() {
                    return Err(ConfigError::Missing("wallet.endpoint"));
                }
            }
            WalletKind::Multisig => {
                if self.multisig.is_none() {
                    return Err(ConfigError::Missing("multisig"));
                }
            }
            WalletKind::Relay => {}
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("missing required config field: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_config_parses() {
        let config = Config::parse(
            r#"
            network = "testnet"
            mirror = "https://mirror.example"

            [wallet]
            kind = "native"
            account = "0.0.500"
            key = "aa"
            endpoint = "https://node.example"
            "#,
        )
        .unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.wallet.kind, WalletKind::Native);
    }

    #[test]
    fn native_without_key_is_rejected() {
        let err = Config::parse(
            r#"
            network = "testnet"
            mirror = "https://mirror.example"

            [wallet]
            kind = "native"
            account = "0.0.500"
            endpoint = "https://node.example"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("wallet.key")));
    }

    #[test]
    fn multisig_requires_its_section() {
        let err = Config::parse(
            r#"
            network = "testnet"
            mirror = "https://mirror.example"

            [wallet]
            kind = "multisig"
            account = "0.0.500"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("multisig")));
    }

    #[test]
    fn multisig_config_parses() {
        let config = Config::parse(
            r#"
            network = "mainnet"
            mirror = "https://mirror.example"
            timeout_secs = 30

            [wallet]
            kind = "multisig"
            account = "0.0.500"

            [multisig]
            keys = ["aa", "bb", "cc"]
            threshold = 2
            "#,
        )
        .unwrap();
        let multisig = config.multisig.unwrap();
        assert_eq!(multisig.db, "pending.db");
        assert_eq!(multisig.threshold, 2);
        assert_eq!(config.timeout_secs, 30);
    }
}
