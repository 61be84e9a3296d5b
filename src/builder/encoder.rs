use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

use crate::builder::contracts::{IERC20, ISwapPay};
use crate::errors::EncodeError;
use crate::models::batch::SwapExecuteParams;

/// Binary call-data encoder for the two calls a batch contains
pub trait CallEncoder: Send + Sync {
    /// `approve(spender, amount)`
    fn encode_approve(&self, spender: Address, amount: U256) -> Result<Bytes, EncodeError>;

    /// `execute(inTokens, inAmounts, target, callData, paymentTokenAmount, minOut)`
    fn encode_execute(&self, params: &SwapExecuteParams) -> Result<Bytes, EncodeError>;
}

/// ABI encoder backed by the `sol!` generated call types
#[derive(Debug, Default, Clone, Copy)]
pub struct SolEncoder;

impl CallEncoder for SolEncoder {
    fn encode_approve(&self, spender: Address, amount: U256) -> Result<Bytes, EncodeError> {
        let call = IERC20::approveCall { spender, amount };
        Ok(call.abi_encode().into())
    }

    fn encode_execute(&self, params: &SwapExecuteParams) -> Result<Bytes, EncodeError> {
        let call = ISwapPay::executeCall {
            inTokens: params.in_tokens.clone(),
            inAmounts: params.in_amounts.clone(),
            target: params.target,
            callData: params.call_data.clone(),
            paymentTokenAmount: params.payment_token_amount,
            minOut: params.min_out.unwrap_or(U256::ZERO),
        };
        Ok(call.abi_encode().into())
    }
}
