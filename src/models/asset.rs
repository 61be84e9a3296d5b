use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Reserved address meaning "pay with the chain's native currency".
///
/// `0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE` is twenty `0xee` bytes; the
/// mixed case of the usual spelling is only its checksum.
pub const NATIVE_SENTINEL: Address = Address::new([0xee; 20]);

/// Broad classification of an asset, used for display and for native handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Native,
    Wrapped,
    Stablecoin,
    Utility,
}

/// Immutable descriptor of a priced asset the user can allocate from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub name: String,
    pub symbol: String,
    /// Token contract. `None` or [`NATIVE_SENTINEL`] both mean native currency.
    pub contract_address: Option<Address>,
    pub price_feed_address: Option<Address>,
    pub price_feed_decimals: u8,
    pub token_decimals: u8,
    pub kind: AssetKind,
    pub description: String,
    pub logo: String,
}

impl AssetConfig {
    /// Create a new asset descriptor with empty display metadata
    pub fn new(
        symbol: impl Into<String>,
        contract_address: Option<Address>,
        price_feed_decimals: u8,
        token_decimals: u8,
        kind: AssetKind,
    ) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            contract_address,
            price_feed_address: None,
            price_feed_decimals,
            token_decimals,
            kind,
            description: String::new(),
            logo: String::new(),
        }
    }

    pub fn with_price_feed(mut self, feed: Address) -> Self {
        self.price_feed_address = Some(feed);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = logo.into();
        self
    }

    /// ERC-20 contract to approve and pull from, if this asset has one.
    ///
    /// Returns `None` for native assets, whether they were configured without
    /// an address or with the native sentinel.
    pub fn token_contract(&self) -> Option<Address> {
        self.contract_address
            .filter(|address| *address != NATIVE_SENTINEL)
    }

    /// Check if this asset is paid in native currency
    pub fn is_native(&self) -> bool {
        self.token_contract().is_none()
    }
}
