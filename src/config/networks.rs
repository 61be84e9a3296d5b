use std::str::FromStr;

use alloy_primitives::{address, Address};

use crate::models::asset::{AssetConfig, AssetKind, NATIVE_SENTINEL};

/// DataFeeds aggregator deployed on Sepolia
pub const SEPOLIA_DATA_FEEDS: Address = address!("0x195a3D95e94aA38D5549bdD50b30428ADfF97991");

pub const SEPOLIA_CHAIN_ID: u64 = 11155111;
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Sepolia,
    Mainnet,
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sepolia" => Ok(Self::Sepolia),
            "mainnet" | "ethereum" => Ok(Self::Mainnet),
            other => Err(anyhow::anyhow!("Unknown network: {}", other)),
        }
    }
}

/// Chain-specific deployment and asset list
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub network: Network,
    pub chain_id: u64,
    pub data_feeds: Option<Address>,
    pub assets: Vec<AssetConfig>,
}

impl NetworkConfig {
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Sepolia => Self::sepolia(),
            Network::Mainnet => Self::mainnet(),
        }
    }

    pub fn sepolia() -> Self {
        Self {
            network: Network::Sepolia,
            chain_id: SEPOLIA_CHAIN_ID,
            data_feeds: Some(SEPOLIA_DATA_FEEDS),
            assets: sepolia_assets(),
        }
    }

    /// No deployment yet; usable only with explicit overrides
    pub fn mainnet() -> Self {
        Self {
            network: Network::Mainnet,
            chain_id: MAINNET_CHAIN_ID,
            data_feeds: None,
            assets: Vec::new(),
        }
    }
}

/// Assets offered on Sepolia
pub fn sepolia_assets() -> Vec<AssetConfig> {
    vec![
        AssetConfig::new("ETH", Some(NATIVE_SENTINEL), 8, 18, AssetKind::Native)
            .with_price_feed(address!("0x694AA1769357215DE4FAC081bf1f309aDC325306"))
            .with_description("Native ETH for gas - no contract address needed")
            .with_logo("https://token-icons.s3.amazonaws.com/eth.png"),
        AssetConfig::new(
            "WBTC",
            Some(address!("0xDD2f20DB368a8Dba08718d8801f08B3E38FEcd08")),
            8,
            8,
            AssetKind::Wrapped,
        )
        .with_price_feed(address!("0x1b44F3514812d835EB1BDB0acB33d3fA3351Ee43"))
        .with_description("Wrapped Bitcoin (WBTC) on Sepolia")
        .with_logo("https://coin-images.coingecko.com/coins/images/7598/large/wrapped_bitcoin_wbtc.png"),
        AssetConfig::new(
            "LINK",
            Some(address!("0x12D50F27df72c759B950a125FdeACe37e3ef21d1")),
            8,
            18,
            AssetKind::Utility,
        )
        .with_price_feed(address!("0xc59E3633BAAC79493d908e63626716e204A45EdF"))
        .with_description("Chainlink oracle token")
        .with_logo("https://coin-images.coingecko.com/coins/images/877/large/chainlink-new-logo.png"),
    ]
}
