use alloy_primitives::Address;
use thiserror::Error;

/// Price or balance feed failures
#[derive(Error, Debug, Clone)]
pub enum FeedError {
    /// The whole query failed; callers treat this as "no data"
    #[error("{what} unavailable: {reason}")]
    DataUnavailable { what: &'static str, reason: String },
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FeedError {
    pub fn prices(reason: impl ToString) -> Self {
        Self::DataUnavailable {
            what: "prices",
            reason: reason.to_string(),
        }
    }

    pub fn balances(reason: impl ToString) -> Self {
        Self::DataUnavailable {
            what: "balances",
            reason: reason.to_string(),
        }
    }
}

/// Failure of the contract-call encoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to encode {function}: {reason}")]
pub struct EncodeError {
    pub function: &'static str,
    pub reason: String,
}

/// Batch construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("TOKEN_AMOUNT_MISMATCH: {tokens} tokens but {amounts} amounts")]
    TokenAmountMismatch { tokens: usize, amounts: usize },
    #[error("EMPTY_ARRAYS: no tokens selected")]
    EmptySelection,
    #[error("INVALID_PAYMENT_AMOUNT: payment token amount must be > 0")]
    InvalidPaymentAmount,
    #[error("aggregated amount for {token} overflows uint256")]
    AmountOverflow { token: Address },
    #[error("allocation has not reached its target")]
    IncompleteAllocation,
    #[error(transparent)]
    Encoding(#[from] EncodeError),
}
