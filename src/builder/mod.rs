//! Approval + execute batch construction

pub mod contracts;
pub mod encoder;
pub mod transaction_builder;

pub use contracts::{SwapPayContract, IERC20, ISwapPay};
pub use encoder::{CallEncoder, SolEncoder};
pub use transaction_builder::TransactionBatchBuilder;
