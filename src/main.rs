//! Longtail quote CLI
//!
//! One-shot quote of a long-tail ERC-20 -> L1 swap: loads config + asset
//! registry, wires the RPC/THORNode collaborators into a `LongtailQuoter`
//! and prints the resulting quotes (or the typed error) as JSON.
//!
//! Usage:
//!   longtail-quoter --sell-asset eip155:1/erc20:0x... --buy-asset bip122:.../slip44:0 \
//!       --amount 1000000000000000000 --receive-address bc1q...
//!
//! Created: 2026-10-16

use alloy::primitives::U256;
use alloy::providers::ProviderBuilder;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use longtail_quoter::assets::{load_assets, AssetId, KnownFeeAssets};
use longtail_quoter::config::load_config;
use longtail_quoter::pool::RpcPoolReader;
use longtail_quoter::quote::{LongtailQuoter, RpcQuoter};
use longtail_quoter::thorchain::ThornodeQuoteSource;
use longtail_quoter::types::TradeQuoteInput;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Quote a long-tail token -> L1 swap via Uniswap V3 + THORChain
#[derive(Parser)]
#[command(name = "longtail-quoter")]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "LONGTAIL_CONFIG", default_value = "config/longtail.toml")]
    config: PathBuf,

    /// Asset registry JSON (asset id -> asset)
    #[arg(long, env = "ASSET_DATA", default_value = "config/assets.json")]
    assets: PathBuf,

    /// CAIP-19 id of the long-tail token to sell
    #[arg(long)]
    sell_asset: String,

    /// CAIP-19 id of the L1 asset to buy
    #[arg(long)]
    buy_asset: String,

    /// Sell amount in the token's base units
    #[arg(long)]
    amount: String,

    /// Destination address on the buy chain
    #[arg(long)]
    receive_address: String,

    /// THORChain streaming interval in blocks (0 = rapid swap only)
    #[arg(long, default_value = "1")]
    streaming_interval: u32,

    #[arg(long, default_value = "0")]
    affiliate_bps: u16,

    /// Max slippage passed to THORNode as tolerance_bps
    #[arg(long)]
    slippage_bps: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    // RUST_LOG wins over the configured level
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Configuration loaded from {}", args.config.display());
    info!("RPC URL: {}", &config.rpc_url[..40.min(config.rpc_url.len())]);
    info!("THORNode: {}", config.thornode_url);

    let assets_by_id = load_assets(&args.assets)?;

    let lookup = |id: &str| {
        let asset_id: AssetId = id.parse()?;
        assets_by_id
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown asset {}", asset_id))
    };
    let sell_asset = lookup(&args.sell_asset)?;
    let buy_asset = lookup(&args.buy_asset)?;
    let sell_amount = U256::from_str_radix(&args.amount, 10)
        .with_context(|| format!("Invalid --amount: {}", args.amount))?;

    let provider = ProviderBuilder::new()
        .connect(&config.rpc_url)
        .await
        .context("Failed to connect to RPC")?;
    let provider = Arc::new(provider);

    let mut thornode = ThornodeQuoteSource::new(&config.thornode_url, config.request_timeout)?;
    if let Some(affiliate) = &config.affiliate {
        thornode = thornode.with_affiliate(affiliate.clone());
    }

    let quoter = LongtailQuoter::new(
        config.clone(),
        Arc::new(RpcPoolReader::new(Arc::clone(&provider))),
        Arc::new(RpcQuoter::new(Arc::clone(&provider), config.quoter)),
        Arc::new(KnownFeeAssets::new()),
        Arc::new(thornode),
    );

    let input = TradeQuoteInput {
        sell_asset,
        buy_asset,
        sell_amount_including_protocol_fees_crypto_base_unit: sell_amount,
        receive_address: args.receive_address,
        affiliate_bps: args.affiliate_bps,
        slippage_tolerance_bps: args.slippage_bps,
    };

    match quoter
        .get_longtail_to_l1_quote(&input, args.streaming_interval, &assets_by_id)
        .await
    {
        Ok(quotes) => {
            info!("{} quote(s) returned", quotes.len());
            println!("{}", serde_json::to_string_pretty(&quotes)?);
            Ok(())
        }
        Err(e) => {
            error!("Quote failed: {}", e);
            println!("{}", serde_json::to_string_pretty(&e)?);
            Err(e.into())
        }
    }
}
