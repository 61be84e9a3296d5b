use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A single call submitted as part of an atomic batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCall {
    pub to: Address,
    pub data: Bytes,
}

impl BatchCall {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
        }
    }

    /// First four bytes of the call data
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// Arguments of the swap/pay contract's `execute` entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapExecuteParams {
    pub in_tokens: Vec<Address>,
    pub in_amounts: Vec<U256>,
    pub target: Address,
    pub call_data: Bytes,
    pub payment_token_amount: U256,
    /// Defaults to zero when `None`
    pub min_out: Option<U256>,
}

/// Aggregated swap inputs in first-appearance order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenArrays {
    pub in_tokens: Vec<Address>,
    pub in_amounts: Vec<U256>,
}

impl TokenArrays {
    pub fn len(&self) -> usize {
        self.in_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_tokens.is_empty()
    }
}
