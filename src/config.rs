//! Configuration management
//!
//! Settings come from a TOML file; `.env` / process env can override the
//! endpoints (`RPC_URL`, `THORNODE_URL`) so secrets stay out of the file.
//! Raw string fields are validated once into a resolved `LongtailConfig`.
//!
//! Created: 2026-10-16

use crate::assets::ChainId;
use crate::types::FeeAmount;
use alloy::primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Top-level TOML configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    pub chain: ChainConfig,
    pub uniswap_v3: UniswapV3Config,
    pub thorchain: ThorchainConfig,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_max_concurrent_requests() -> usize { 8 }
fn default_request_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// CAIP-2 id of the only chain longtail sells are accepted from
    pub chain_id: String,
    #[serde(default)]
    pub rpc_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniswapV3Config {
    pub factory: String,
    pub quoter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThorchainConfig {
    #[serde(default)]
    pub thornode_url: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// THORName credited with the affiliate fee
    #[serde(default)]
    pub affiliate: Option<String>,
    /// Token transfer proxy the user approves the sell token to
    pub allowance_contract: String,
    #[serde(default, rename = "aggregator")]
    pub aggregators: Vec<AggregatorConfig>,
}

/// Router executing the V3 leg for one fee tier
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    pub fee_tier: u32,
    pub address: String,
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct LongtailConfig {
    pub log_level: String,
    pub max_concurrent_requests: usize,
    pub chain_id: ChainId,
    pub rpc_url: String,
    pub pool_factory: Address,
    pub quoter: Address,
    pub thornode_url: String,
    pub request_timeout: Duration,
    pub affiliate: Option<String>,
    pub allowance_contract: Address,
    pub aggregators: HashMap<FeeAmount, Address>,
}

fn parse_address(value: &str, field: &str) -> Result<Address> {
    value
        .parse()
        .with_context(|| format!("Invalid address for {}: {}", field, value))
}

impl TomlConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Validate into a `LongtailConfig`, taking endpoint overrides from `env`
    pub fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> Result<LongtailConfig> {
        let rpc_url = env("RPC_URL")
            .or_else(|| self.chain.rpc_url.clone())
            .ok_or_else(|| anyhow!("RPC_URL not set (env or [chain].rpc_url)"))?;
        let thornode_url = env("THORNODE_URL")
            .or_else(|| self.thorchain.thornode_url.clone())
            .ok_or_else(|| anyhow!("THORNODE_URL not set (env or [thorchain].thornode_url)"))?;

        let mut aggregators = HashMap::new();
        for aggregator in &self.thorchain.aggregators {
            let fee = FeeAmount::from_u32(aggregator.fee_tier)
                .ok_or_else(|| anyhow!("Unknown V3 fee tier {}", aggregator.fee_tier))?;
            let address = parse_address(&aggregator.address, "thorchain.aggregator")?;
            if aggregators.insert(fee, address).is_some() {
                bail!("Duplicate aggregator for fee tier {}", aggregator.fee_tier);
            }
        }

        if self.general.max_concurrent_requests == 0 {
            bail!("general.max_concurrent_requests must be at least 1");
        }

        Ok(LongtailConfig {
            log_level: self.general.log_level.clone(),
            max_concurrent_requests: self.general.max_concurrent_requests,
            chain_id: self.chain.chain_id.parse().context("Invalid chain.chain_id")?,
            rpc_url,
            pool_factory: parse_address(&self.uniswap_v3.factory, "uniswap_v3.factory")?,
            quoter: parse_address(&self.uniswap_v3.quoter, "uniswap_v3.quoter")?,
            thornode_url: thornode_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(self.thorchain.request_timeout_secs),
            affiliate: self.thorchain.affiliate.clone(),
            allowance_contract: parse_address(
                &self.thorchain.allowance_contract,
                "thorchain.allowance_contract",
            )?,
            aggregators,
        })
    }
}

/// Load `.env`, then the TOML file, resolving overrides from the process env
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LongtailConfig> {
    dotenv::dotenv().ok();
    TomlConfig::load(path)?.resolve(|key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
[general]
log_level = "debug"

[chain]
chain_id = "eip155:1"
rpc_url = "https://eth.example.org"

[uniswap_v3]
factory = "0x1F98431c8aD98523631AE4a59f267346ea31F984"
quoter = "0xb27308f9F90D607463bb33eA1BeBb41C27CE5AB6"

[thorchain]
thornode_url = "https://thornode.example.org/"
allowance_contract = "0xF892Fef9dA200d9E84c9b0647ecFF0F34633aBe8"

[[thorchain.aggregator]]
fee_tier = 500
address = "0xbd68cbe6c247e2c3a0e36b8f0e24964914f26ee8"

[[thorchain.aggregator]]
fee_tier = 3000
address = "0xe4ddca21881bac219af7f217703db0475d2a9f02"
"#;

    #[test]
    fn test_parse_and_resolve() {
        let config: TomlConfig = toml::from_str(TOML).unwrap();
        let resolved = config.resolve(|_| None).unwrap();

        assert_eq!(resolved.log_level, "debug");
        assert_eq!(resolved.max_concurrent_requests, 8);
        assert_eq!(resolved.chain_id.as_str(), "eip155:1");
        assert_eq!(resolved.rpc_url, "https://eth.example.org");
        assert_eq!(resolved.thornode_url, "https://thornode.example.org");
        assert_eq!(resolved.request_timeout, Duration::from_secs(10));
        assert_eq!(resolved.affiliate, None);
        assert_eq!(resolved.aggregators.len(), 2);
        assert!(resolved.aggregators.contains_key(&FeeAmount::Low));
        assert!(!resolved.aggregators.contains_key(&FeeAmount::Lowest));
    }

    #[test]
    fn test_env_overrides_endpoints() {
        let config: TomlConfig = toml::from_str(TOML).unwrap();
        let resolved = config
            .resolve(|key| match key {
                "RPC_URL" => Some("wss://eth.private.example".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(resolved.rpc_url, "wss://eth.private.example");
        assert_eq!(resolved.thornode_url, "https://thornode.example.org");
    }

    #[test]
    fn test_rejects_unknown_fee_tier() {
        let bad = TOML.replace("fee_tier = 3000", "fee_tier = 2500");
        let config: TomlConfig = toml::from_str(&bad).unwrap();
        let err = config.resolve(|_| None).unwrap_err();
        assert!(err.to_string().contains("2500"));
    }

    #[test]
    fn test_rejects_duplicate_fee_tier() {
        let bad = TOML.replace("fee_tier = 3000", "fee_tier = 500");
        let config: TomlConfig = toml::from_str(&bad).unwrap();
        assert!(config.resolve(|_| None).is_err());
    }

    #[test]
    fn test_missing_rpc_url() {
        let bad = TOML.replace("rpc_url = \"https://eth.example.org\"", "");
        let config: TomlConfig = toml::from_str(&bad).unwrap();
        let err = config.resolve(|_| None).unwrap_err();
        assert!(err.to_string().contains("RPC_URL"));
    }
}
