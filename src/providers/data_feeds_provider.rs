use alloy_primitives::{hex, Address, Bytes, I256, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::FeedError;
use crate::models::market::{TokenBalances, TokenPrices};
use crate::traits::data_provider::BalanceService;
use crate::traits::price_provider::PriceService;

sol! {
    /// On-chain aggregator returning every supported price and balance in one read
    interface IDataFeeds {
        struct Balances {
            uint256 eth;
            uint256 wbtc;
            uint256 dai;
            uint256 usdc;
            uint256 link;
            uint256 wsteth;
        }

        struct Prices {
            int256 ethUsd;
            int256 wbtcUsd;
            int256 daiUsd;
            int256 usdcUsd;
            int256 linkUsd;
            int256 wstethUsd;
        }

        function getBalances(address _account) external view returns (Balances memory);
        function getPrices() external view returns (Prices memory);
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Reads prices and balances from the DataFeeds contract over JSON-RPC
pub struct DataFeedsProvider {
    client: Client,
    rpc_url: String,
    contract: Address,
}

impl DataFeedsProvider {
    /// Create a new provider for the DataFeeds contract at `contract`
    pub fn new(rpc_url: String, contract: Address) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
            contract,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// `eth_call` against the latest block
    async fn eth_call(&self, data: Vec<u8>) -> Result<Bytes, FeedError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": self.contract,
                    "data": hex::encode_prefixed(data),
                },
                "latest"
            ]
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FeedError::Rpc(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Rpc(format!("HTTP status {}", status)));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(FeedError::Rpc(format!("{} (code {})", error.message, error.code)));
        }

        let result = body
            .result
            .ok_or_else(|| FeedError::Decode("missing result".to_string()))?;
        result
            .parse::<Bytes>()
            .map_err(|e| FeedError::Decode(e.to_string()))
    }

    async fn read_prices(&self) -> Result<TokenPrices, FeedError> {
        let data = IDataFeeds::getPricesCall {}.abi_encode();
        let raw = self.eth_call(data).await?;
        let decoded = IDataFeeds::getPricesCall::abi_decode_returns(&raw, true)
            .map_err(|e| FeedError::Decode(e.to_string()))?;
        Ok(prices_from_feed(&decoded._0))
    }

    async fn read_balances(&self, account: Address) -> Result<TokenBalances, FeedError> {
        let data = IDataFeeds::getBalancesCall { _account: account }.abi_encode();
        let raw = self.eth_call(data).await?;
        let decoded = IDataFeeds::getBalancesCall::abi_decode_returns(&raw, true)
            .map_err(|e| FeedError::Decode(e.to_string()))?;
        Ok(balances_from_feed(&decoded._0))
    }
}

/// Map the contract's price tuple onto asset symbols.
///
/// Negative answers are dropped so the asset reads as unpriced.
fn prices_from_feed(prices: &IDataFeeds::Prices) -> TokenPrices {
    let answers: [(&str, I256); 6] = [
        ("ETH", prices.ethUsd),
        ("WBTC", prices.wbtcUsd),
        ("DAI", prices.daiUsd),
        ("USDC", prices.usdcUsd),
        ("LINK", prices.linkUsd),
        ("WSTETH", prices.wstethUsd),
    ];

    answers
        .into_iter()
        .filter(|(symbol, answer)| {
            if answer.is_negative() {
                debug!("Dropping negative price for {}: {}", symbol, answer);
                return false;
            }
            true
        })
        .map(|(symbol, answer)| (symbol, answer.into_raw()))
        .collect()
}

fn balances_from_feed(balances: &IDataFeeds::Balances) -> TokenBalances {
    let amounts: [(&str, U256); 6] = [
        ("ETH", balances.eth),
        ("WBTC", balances.wbtc),
        ("DAI", balances.dai),
        ("USDC", balances.usdc),
        ("LINK", balances.link),
        ("WSTETH", balances.wsteth),
    ];
    amounts.into_iter().collect()
}

#[async_trait]
impl PriceService for DataFeedsProvider {
    async fn get_prices(&self) -> Result<TokenPrices, FeedError> {
        match self.read_prices().await {
            Ok(prices) => {
                debug!("Fetched {} prices from {}", prices.len(), self.contract);
                Ok(prices)
            }
            Err(e) => {
                warn!("Failed to fetch prices: {}", e);
                Err(FeedError::prices(e))
            }
        }
    }
}

#[async_trait]
impl BalanceService for DataFeedsProvider {
    async fn get_balances(&self, account: Address) -> Result<TokenBalances, FeedError> {
        match self.read_balances(account).await {
            Ok(balances) => {
                debug!("Fetched {} balances for {}", balances.len(), account);
                Ok(balances)
            }
            Err(e) => {
                warn!("Failed to fetch balances: {}", e);
                Err(FeedError::balances(e))
            }
        }
    }
}
