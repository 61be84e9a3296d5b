use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};

use crate::builder::encoder::{CallEncoder, SolEncoder};
use crate::errors::BatchError;
use crate::models::allocation::PurchaseItem;
use crate::models::asset::NATIVE_SENTINEL;
use crate::models::batch::{BatchCall, SwapExecuteParams, TokenArrays};
use crate::traits::telemetry::{AllocationTelemetry, NoopTelemetry, SkipReason};

/// Turns purchase items into an ordered approve + execute batch
#[derive(Clone)]
pub struct TransactionBatchBuilder {
    swap_pay: Address,
    encoder: Arc<dyn CallEncoder>,
    telemetry: Arc<dyn AllocationTelemetry>,
}

impl TransactionBatchBuilder {
    /// Create a builder for the swap/pay router at `swap_pay`
    pub fn new(swap_pay: Address) -> Self {
        Self {
            swap_pay,
            encoder: Arc::new(SolEncoder),
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn CallEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn AllocationTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn swap_pay(&self) -> Address {
        self.swap_pay
    }

    /// Sum amounts per token contract, keeping first-appearance order.
    ///
    /// Native assets (no contract or the sentinel) and zero amounts are left out.
    fn aggregate(&self, items: &[PurchaseItem]) -> Result<TokenArrays, BatchError> {
        let mut arrays = TokenArrays::default();
        let mut positions: HashMap<Address, usize> = HashMap::new();

        for item in items {
            let symbol = item.asset.symbol.as_str();
            let token = match item.asset.contract_address {
                None => {
                    self.telemetry.item_skipped(symbol, SkipReason::NoContract);
                    continue;
                }
                Some(address) if address == NATIVE_SENTINEL => {
                    self.telemetry.item_skipped(symbol, SkipReason::NativeSentinel);
                    continue;
                }
                Some(address) => address,
            };
            let amount = item.allocation.token_amount_raw;
            if amount.is_zero() {
                self.telemetry.item_skipped(symbol, SkipReason::ZeroAmount);
                continue;
            }

            match positions.get(&token) {
                Some(&position) => {
                    let merged = arrays.in_amounts[position]
                        .checked_add(amount)
                        .ok_or(BatchError::AmountOverflow { token })?;
                    arrays.in_amounts[position] = merged;
                    self.telemetry.token_aggregated(symbol, token, merged, true);
                }
                None => {
                    positions.insert(token, arrays.in_tokens.len());
                    arrays.in_tokens.push(token);
                    arrays.in_amounts.push(amount);
                    self.telemetry.token_aggregated(symbol, token, amount, false);
                }
            }
        }

        Ok(arrays)
    }

    /// One `approve(spender, amount)` per distinct token contract
    pub fn build_approval_transactions(
        &self,
        items: &[PurchaseItem],
        spender: Address,
    ) -> Result<Vec<BatchCall>, BatchError> {
        let arrays = self.aggregate(items)?;

        arrays
            .in_tokens
            .iter()
            .zip(arrays.in_amounts.iter())
            .map(|(token, amount)| -> Result<BatchCall, BatchError> {
                let data = self.encoder.encode_approve(spender, *amount)?;
                Ok(BatchCall::new(*token, data))
            })
            .collect()
    }

    /// Parallel token/amount arrays for the `execute` call
    pub fn build_token_arrays(&self, items: &[PurchaseItem]) -> Result<TokenArrays, BatchError> {
        self.aggregate(items)
    }

    /// Validate and encode the router's `execute` call
    pub fn build_swap_execute_calldata(
        &self,
        params: &SwapExecuteParams,
    ) -> Result<Bytes, BatchError> {
        if params.in_tokens.len() != params.in_amounts.len() {
            return Err(BatchError::TokenAmountMismatch {
                tokens: params.in_tokens.len(),
                amounts: params.in_amounts.len(),
            });
        }
        if params.in_tokens.is_empty() {
            return Err(BatchError::EmptySelection);
        }
        if params.payment_token_amount.is_zero() {
            return Err(BatchError::InvalidPaymentAmount);
        }

        Ok(self.encoder.encode_execute(params)?)
    }

    /// Approvals first, then the single `execute` call that pulls them
    pub fn build_swap_batch_transaction(
        &self,
        items: &[PurchaseItem],
        target: Address,
        target_call_data: Bytes,
        payment_token_amount: U256,
    ) -> Result<Vec<BatchCall>, BatchError> {
        let approvals = self.build_approval_transactions(items, self.swap_pay)?;
        let arrays = self.build_token_arrays(items)?;

        let execute_data = self.build_swap_execute_calldata(&SwapExecuteParams {
            in_tokens: arrays.in_tokens,
            in_amounts: arrays.in_amounts,
            target,
            call_data: target_call_data,
            payment_token_amount,
            min_out: None,
        })?;

        let mut calls = approvals;
        calls.push(BatchCall::new(self.swap_pay, execute_data));

        self.telemetry.batch_built(&calls);
        Ok(calls)
    }
}
