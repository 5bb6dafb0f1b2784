//! Longtail -> L1 quote aggregation
//!
//! Sells a longtail ERC-20 into the chain's wrapped native token through the
//! best Uniswap V3 pool, then quotes native -> L1 on THORChain with the V3
//! output as the new sell amount.
//!
//! Pipeline per request: derive candidate pools -> confirm they exist ->
//! quote every survivor -> pick the best -> fetch L1 quote -> compose.
//! Nothing is cached between requests.

use crate::assets::{token_from_asset, wrapped_native_token, AssetsById, FeeAssetRegistry};
use crate::config::LongtailConfig;
use crate::error::SwapError;
use crate::pool::{fetch_contract_data_by_pool, generate_pool_addresses_across_fee_range, PoolReader};
use crate::quote::composer::compose_longtail_quotes;
use crate::quote::quoter::{fetch_quoted_amount_out_by_pool, QuoteSimulator};
use crate::quote::selector::select_best_rate;
use crate::types::{TradeQuote, TradeQuoteInput, TradeType};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Upstream L1 -> L1 quote provider (THORChain)
#[async_trait]
pub trait L1QuoteSource: Send + Sync {
    async fn get_l1_quote(
        &self,
        input: &TradeQuoteInput,
        streaming_interval: u32,
        trade_type: TradeType,
    ) -> Result<Vec<TradeQuote>, SwapError>;
}

/// Longtail quote aggregator.
///
/// Holds collaborators only; every call builds its own pool and quote maps.
pub struct LongtailQuoter {
    config: LongtailConfig,
    pool_reader: Arc<dyn PoolReader>,
    quote_simulator: Arc<dyn QuoteSimulator>,
    fee_assets: Arc<dyn FeeAssetRegistry>,
    l1_quotes: Arc<dyn L1QuoteSource>,
}

impl LongtailQuoter {
    pub fn new(
        config: LongtailConfig,
        pool_reader: Arc<dyn PoolReader>,
        quote_simulator: Arc<dyn QuoteSimulator>,
        fee_assets: Arc<dyn FeeAssetRegistry>,
        l1_quotes: Arc<dyn L1QuoteSource>,
    ) -> Self {
        info!(
            "LongtailQuoter initialized: chain={} factory={:?} aggregators={}",
            config.chain_id,
            config.pool_factory,
            config.aggregators.len()
        );

        Self {
            config,
            pool_reader,
            quote_simulator,
            fee_assets,
            l1_quotes,
        }
    }

    /// Quote selling a longtail token for an L1 asset.
    ///
    /// Every failure is a `SwapError` the caller has to branch on:
    /// - `UnsupportedChain`: sell asset is not on the configured chain
    /// - `InternalError`: the chain's native asset can't be resolved
    /// - `UnsupportedTradePair`: no pool quoted, or no aggregator for the winner
    /// - anything the L1 quote source returns, unchanged
    pub async fn get_longtail_to_l1_quote(
        &self,
        input: &TradeQuoteInput,
        streaming_interval: u32,
        assets_by_id: &AssetsById,
    ) -> Result<Vec<TradeQuote>, SwapError> {
        let sell_asset = &input.sell_asset;
        let sell_amount = input.sell_amount_including_protocol_fees_crypto_base_unit;

        // Only one chain for now; BSC/Avalanche would need their own factories.
        if sell_asset.chain_id != self.config.chain_id {
            return Err(SwapError::unsupported_chain(format!(
                "Unsupported chainId {}.",
                sell_asset.chain_id
            ))
            .with_details(json!({ "sellAssetChainId": sell_asset.chain_id })));
        }

        let sell_chain_id = &sell_asset.chain_id;
        let native_buy_asset = self
            .fee_assets
            .fee_asset_id(sell_chain_id)
            .and_then(|id| assets_by_id.get(&id))
            .ok_or_else(|| {
                SwapError::internal(format!(
                    "No native buy asset found for {}.",
                    sell_chain_id
                ))
                .with_details(json!({ "sellAssetChainId": sell_chain_id }))
            })?;

        let token_a = token_from_asset(sell_asset).ok_or_else(|| {
            SwapError::unsupported_trade_pair(format!(
                "Sell asset {} is not an ERC-20 token.",
                sell_asset.asset_id
            ))
        })?;
        let token_b = wrapped_native_token(native_buy_asset).ok_or_else(|| {
            SwapError::internal(format!(
                "No wrapped token for {}.",
                native_buy_asset.asset_id
            ))
        })?;
        if token_a == token_b {
            return Err(SwapError::unsupported_trade_pair(
                "Sell asset is the wrapped native token.",
            ));
        }

        let candidates =
            generate_pool_addresses_across_fee_range(self.config.pool_factory, token_a, token_b);

        let pool_contract_data = fetch_contract_data_by_pool(
            &candidates,
            self.pool_reader.as_ref(),
            token_a,
            token_b,
            self.config.max_concurrent_requests,
        )
        .await;

        let quoted_amount_out_by_pool = fetch_quoted_amount_out_by_pool(
            &pool_contract_data,
            sell_amount,
            token_a,
            self.quote_simulator.as_ref(),
            self.config.max_concurrent_requests,
        )
        .await;

        let best = select_best_rate(&quoted_amount_out_by_pool).and_then(|(pool, amount_out)| {
            let fee = pool_contract_data.get(&pool)?.fee;
            let aggregator = self.config.aggregators.get(&fee).copied();
            debug!(
                "Best pool {:?} @ {} quoted {} (aggregator: {:?})",
                pool, fee, amount_out, aggregator
            );
            Some((aggregator?, amount_out))
        });

        let Some((best_aggregator, quoted_amount_out)) = best else {
            return Err(SwapError::unsupported_trade_pair(
                "No best aggregator contract found.",
            ));
        };

        info!(
            "Longtail leg: {} {} -> {} {} base units across {} quoted pools",
            sell_amount,
            sell_asset.symbol,
            quoted_amount_out,
            native_buy_asset.symbol,
            quoted_amount_out_by_pool.len()
        );

        let l1_to_l1_quote_input = TradeQuoteInput {
            sell_asset: native_buy_asset.clone(),
            sell_amount_including_protocol_fees_crypto_base_unit: quoted_amount_out,
            ..input.clone()
        };

        let l1_quotes = self
            .l1_quotes
            .get_l1_quote(&l1_to_l1_quote_input, streaming_interval, TradeType::LongTailToL1)
            .await?;

        Ok(compose_longtail_quotes(
            l1_quotes,
            input,
            best_aggregator,
            self.config.allowance_contract,
            quoted_amount_out,
        ))
    }
}
