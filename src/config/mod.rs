//! Environment configuration

pub mod networks;

use alloy_primitives::Address;
use anyhow::Context;
use tracing::level_filters::LevelFilter;

use crate::builder::contracts::SwapPayContract;
use crate::engine::allocation::{EngineConfig, LockPolicy};
use crate::utils::helper::parse_address;

pub use networks::{Network, NetworkConfig};

/// Settings for the binary, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub network: NetworkConfig,
    /// `None` selects the in-memory demo feed
    pub rpc_url: Option<String>,
    pub wallet_address: Address,
    pub data_feeds_address: Option<Address>,
    /// Router on the selected chain; `buy` needs it
    pub swap_pay: Option<SwapPayContract>,
    pub payment_token_decimals: u8,
    pub target_usd: f64,
    pub tick_interval_ms: u64,
    pub lock_policy: LockPolicy,
    pub log_level: LevelFilter,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network: Network = lookup("NETWORK")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default();
        let network = NetworkConfig::for_network(network);

        let wallet_address = match lookup("WALLET_ADDRESS") {
            Some(s) => parse_address(&s).context("WALLET_ADDRESS")?,
            None => Address::ZERO,
        };
        let data_feeds_address = match lookup("DATA_FEEDS_ADDRESS") {
            Some(s) => Some(parse_address(&s).context("DATA_FEEDS_ADDRESS")?),
            None => network.data_feeds,
        };
        let swap_pay = lookup("SWAP_PAY_ADDRESS")
            .map(|s| parse_address(&s).context("SWAP_PAY_ADDRESS"))
            .transpose()?
            .map(|address| SwapPayContract::new(network.chain_id, address));

        let rpc_url = lookup("RPC_URL").filter(|s| !s.trim().is_empty());
        if rpc_url.is_some() && data_feeds_address.is_none() {
            anyhow::bail!("{:?} has no DataFeeds deployment; set DATA_FEEDS_ADDRESS", network.network);
        }
        if network.assets.is_empty() {
            anyhow::bail!("{:?} has no configured assets", network.network);
        }

        let payment_token_decimals = lookup("PAYMENT_TOKEN_DECIMALS")
            .map(|s| s.parse::<u8>())
            .transpose()
            .context("PAYMENT_TOKEN_DECIMALS")?
            .unwrap_or(6);
        let target_usd = lookup("TARGET_USD")
            .map(|s| s.parse::<f64>())
            .transpose()
            .context("TARGET_USD")?
            .unwrap_or(100.0);
        if !target_usd.is_finite() || target_usd < 0.0 {
            anyhow::bail!("TARGET_USD must be a non-negative number");
        }
        let tick_interval_ms = lookup("TICK_INTERVAL_MS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(15_000);
        let lock_policy = lookup("LOCK_POLICY")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default();
        let log_level = lookup("LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(LevelFilter::INFO);

        Ok(Self {
            network,
            rpc_url,
            wallet_address,
            data_feeds_address,
            swap_pay,
            payment_token_decimals,
            target_usd,
            tick_interval_ms,
            lock_policy,
            log_level,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.target_usd).with_lock_policy(self.lock_policy)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::asset::NATIVE_SENTINEL;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_to_sepolia_demo() {
        let config = load(&[]).unwrap();

        assert_eq!(config.network.chain_id, 11155111);
        assert_eq!(config.data_feeds_address, Some(networks::SEPOLIA_DATA_FEEDS));
        assert_eq!(config.rpc_url, None);
        assert_eq!(config.swap_pay, None);
        assert_eq!(config.payment_token_decimals, 6);
        assert_eq!(config.lock_policy, LockPolicy::ActiveSlider);
        assert_eq!(config.network.assets[0].contract_address, Some(NATIVE_SENTINEL));
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("TARGET_USD", "250.5"),
            ("LOCK_POLICY", "all"),
            ("SWAP_PAY_ADDRESS", "0x5555555555555555555555555555555555555555"),
            ("TICK_INTERVAL_MS", "500"),
        ])
        .unwrap();

        assert_eq!(config.target_usd, 250.5);
        assert_eq!(config.lock_policy, LockPolicy::AllSliders);
        assert_eq!(
            config.swap_pay,
            Some(SwapPayContract::new(11155111, Address::repeat_byte(0x55)))
        );
        assert_eq!(config.tick_interval_ms, 500);
    }

    #[test]
    fn mainnet_without_deployment_is_rejected() {
        assert!(load(&[("NETWORK", "mainnet")]).is_err());
        assert!(load(&[("TARGET_USD", "-1")]).is_err());
        assert!(load(&[("WALLET_ADDRESS", "not-an-address")]).is_err());
    }
}
