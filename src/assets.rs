//! Asset registry
//!
//! CAIP-2 chain ids, CAIP-19 asset ids and the asset metadata produced by the
//! asset-data generator. Also resolves the token addresses the Uniswap V3 leg
//! trades through (ERC-20 address, or the wrapped token for a native coin).
//!
//! Created: 2026-10-16

use alloy::primitives::{address, Address};
use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

// ── Well-known chains ────────────────────────────────────────────────

pub const ETH_CHAIN_ID: &str = "eip155:1";
pub const OPTIMISM_CHAIN_ID: &str = "eip155:10";
pub const BSC_CHAIN_ID: &str = "eip155:56";
pub const GNOSIS_CHAIN_ID: &str = "eip155:100";
pub const POLYGON_CHAIN_ID: &str = "eip155:137";
pub const ARBITRUM_CHAIN_ID: &str = "eip155:42161";
pub const AVALANCHE_CHAIN_ID: &str = "eip155:43114";
pub const BTC_CHAIN_ID: &str = "bip122:000000000019d6689c085ae165831e93";
pub const BCH_CHAIN_ID: &str = "bip122:000000000000000000651ef99cb9fcbe";
pub const DOGE_CHAIN_ID: &str = "bip122:00000000001a91e3dace36e2be3bf030";
pub const LTC_CHAIN_ID: &str = "bip122:12a765e31ffd4059bada1e25190f6e98";
pub const COSMOS_CHAIN_ID: &str = "cosmos:cosmoshub-4";
pub const THORCHAIN_CHAIN_ID: &str = "cosmos:thorchain-mainnet-v1";

pub const ETH_ASSET_ID: &str = "eip155:1/slip44:60";

/// Wrapped native token per EVM chain (what a native coin trades as in a V3 pool)
static WRAPPED_NATIVE: Lazy<HashMap<&'static str, Address>> = Lazy::new(|| {
    HashMap::from([
        (ETH_CHAIN_ID, address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")), // WETH
        (OPTIMISM_CHAIN_ID, address!("4200000000000000000000000000000000000006")), // WETH
        (BSC_CHAIN_ID, address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c")), // WBNB
        (GNOSIS_CHAIN_ID, address!("e91d153e0b41518a2ce8dd3d7944fa863463a97d")), // WXDAI
        (POLYGON_CHAIN_ID, address!("0d500b1d8e8ef31e21c99d1db9a6444d3adf1270")), // WMATIC
        (ARBITRUM_CHAIN_ID, address!("82af49447d8a07e3bd95bd0d56f35241523fbab1")), // WETH
        (AVALANCHE_CHAIN_ID, address!("b31f66aa3c1e785363f0875a1b74e27b85fd66c7")), // WAVAX
    ])
});

// ── CAIP identifiers ─────────────────────────────────────────────────

fn valid_segment(s: &str, min: usize, max: usize, extra: &[char]) -> bool {
    (min..=max).contains(&s.len())
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || extra.contains(&c))
}

/// CAIP-2 chain id, e.g. `eip155:1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(String);

impl ChainId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or_default()
    }

    pub fn reference(&self) -> &str {
        self.0.split_once(':').map(|(_, r)| r).unwrap_or_default()
    }

    pub fn is_evm(&self) -> bool {
        self.namespace() == "eip155"
    }
}

impl FromStr for ChainId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, reference) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("invalid chain id '{}': missing ':'", s))?;
        if !valid_segment(namespace, 3, 8, &[]) || !valid_segment(reference, 1, 32, &['_']) {
            bail!("invalid chain id '{}'", s);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ChainId {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ChainId> for String {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// CAIP-19 asset id, e.g. `eip155:1/erc20:0xa0b8...` or `eip155:1/slip44:60`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into (chain id, asset namespace, asset reference)
    pub fn parts(&self) -> (ChainId, &str, &str) {
        // Validated at construction, so both separators are present.
        let (chain, asset) = self.0.split_once('/').unwrap_or((&self.0, ""));
        let (namespace, reference) = asset.split_once(':').unwrap_or((asset, ""));
        (ChainId(chain.to_string()), namespace, reference)
    }

    pub fn chain_id(&self) -> ChainId {
        self.parts().0
    }

    pub fn asset_namespace(&self) -> &str {
        self.parts().1
    }

    pub fn asset_reference(&self) -> &str {
        self.parts().2
    }

    /// Native coin of its chain (slip44 namespace)
    pub fn is_native(&self) -> bool {
        self.asset_namespace() == "slip44"
    }
}

impl FromStr for AssetId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (chain, asset) = s
            .split_once('/')
            .ok_or_else(|| anyhow!("invalid asset id '{}': missing '/'", s))?;
        chain
            .parse::<ChainId>()
            .with_context(|| format!("invalid asset id '{}'", s))?;
        let (namespace, reference) = asset
            .split_once(':')
            .ok_or_else(|| anyhow!("invalid asset id '{}': missing asset namespace", s))?;
        if !valid_segment(namespace, 3, 8, &[]) || !valid_segment(reference, 1, 128, &['.', '%', '_']) {
            bail!("invalid asset id '{}'", s);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for AssetId {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Asset metadata ───────────────────────────────────────────────────

/// Asset metadata as emitted by the asset-data generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset_id: AssetId,
    pub chain_id: ChainId,
    pub symbol: String,
    pub name: String,
    /// Decimals of the base unit
    pub precision: u8,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

pub type AssetsById = HashMap<AssetId, Asset>;

/// Load generated asset data: a JSON object keyed by asset id
pub fn load_assets<P: AsRef<Path>>(path: P) -> Result<AssetsById> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read asset data: {}", path.as_ref().display()))?;

    let raw: HashMap<String, Asset> =
        serde_json::from_str(&content).context("Failed to parse asset data JSON")?;

    let mut assets = AssetsById::with_capacity(raw.len());
    for (key, asset) in raw {
        if key != asset.asset_id.as_str() {
            bail!("asset data key '{}' does not match assetId '{}'", key, asset.asset_id);
        }
        if asset.asset_id.chain_id() != asset.chain_id {
            bail!("asset '{}' has mismatched chainId '{}'", asset.asset_id, asset.chain_id);
        }
        assets.insert(asset.asset_id.clone(), asset);
    }

    info!("Asset data loaded: {} assets from {}", assets.len(), path.as_ref().display());
    Ok(assets)
}

// ── Token resolution ─────────────────────────────────────────────────

/// ERC-20 contract address of an asset, if it is one
pub fn token_from_asset(asset: &Asset) -> Option<Address> {
    let id = &asset.asset_id;
    if !id.chain_id().is_evm() || id.asset_namespace() != "erc20" {
        return None;
    }
    id.asset_reference().parse().ok()
}

/// Token an asset trades as inside a V3 pool: the wrapped token for a native
/// coin, the ERC-20 itself otherwise.
pub fn wrapped_native_token(asset: &Asset) -> Option<Address> {
    if asset.asset_id.is_native() {
        return WRAPPED_NATIVE.get(asset.chain_id.as_str()).copied();
    }
    token_from_asset(asset)
}

// ── Fee assets ───────────────────────────────────────────────────────

/// Resolves a chain to the asset its fees are paid in
pub trait FeeAssetRegistry: Send + Sync {
    fn fee_asset_id(&self, chain_id: &ChainId) -> Option<AssetId>;
}

/// Fee assets of the chains THORChain and the longtail leg touch
#[derive(Debug, Clone)]
pub struct KnownFeeAssets {
    by_chain: HashMap<ChainId, AssetId>,
}

impl KnownFeeAssets {
    pub fn new() -> Self {
        let entries = [
            (ETH_CHAIN_ID, "slip44:60"),
            (OPTIMISM_CHAIN_ID, "slip44:60"),
            (BSC_CHAIN_ID, "slip44:60"),
            (GNOSIS_CHAIN_ID, "slip44:60"),
            (POLYGON_CHAIN_ID, "slip44:60"),
            (ARBITRUM_CHAIN_ID, "slip44:60"),
            (AVALANCHE_CHAIN_ID, "slip44:60"),
            (BTC_CHAIN_ID, "slip44:0"),
            (BCH_CHAIN_ID, "slip44:145"),
            (DOGE_CHAIN_ID, "slip44:3"),
            (LTC_CHAIN_ID, "slip44:2"),
            (COSMOS_CHAIN_ID, "slip44:118"),
            (THORCHAIN_CHAIN_ID, "slip44:931"),
        ];

        let by_chain = entries
            .into_iter()
            .map(|(chain, asset)| {
                (
                    ChainId(chain.to_string()),
                    AssetId(format!("{}/{}", chain, asset)),
                )
            })
            .collect();

        Self { by_chain }
    }
}

impl Default for KnownFeeAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl FeeAssetRegistry for KnownFeeAssets {
    fn fee_asset_id(&self, chain_id: &ChainId) -> Option<AssetId> {
        self.by_chain.get(chain_id).cloned()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn asset(asset_id: &str, symbol: &str, precision: u8) -> Asset {
        let asset_id: AssetId = asset_id.parse().unwrap();
        Asset {
            chain_id: asset_id.chain_id(),
            asset_id,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            precision,
            color: None,
            icon: None,
        }
    }

    pub fn eth() -> Asset {
        asset(ETH_ASSET_ID, "ETH", 18)
    }

    pub fn btc() -> Asset {
        asset("bip122:000000000019d6689c085ae165831e93/slip44:0", "BTC", 8)
    }

    /// FOX, an Ethereum longtail token
    pub fn fox() -> Asset {
        asset(
            "eip155:1/erc20:0xc770eefad204b5180df6a14ee197d99d808ee52d",
            "FOX",
            18,
        )
    }

    pub fn usdc() -> Asset {
        asset(
            "eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "USDC",
            6,
        )
    }
}
