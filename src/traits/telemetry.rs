use alloy_primitives::{Address, U256};

use crate::models::allocation::AllocationState;
use crate::models::batch::BatchCall;

/// Why a slider move was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Target reached and the move was an increase
    TargetLocked,
    /// Target reached and the slider is frozen by the lock policy
    SliderFrozen,
    /// Index outside the asset list
    UnknownAsset,
}

/// Why a purchase item was left out of approvals and swap inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoContract,
    NativeSentinel,
    ZeroAmount,
}

/// Observer for the pure engines.
///
/// Every hook has an empty default so implementors pick what they care about.
/// Hooks must not panic and must not block.
pub trait AllocationTelemetry: Send + Sync {
    fn update_applied(&self, _index: usize, _state: &AllocationState) {}

    fn update_rejected(&self, _index: usize, _requested: f64, _reason: RejectReason) {}

    fn state_reset(&self, _asset_count: usize) {}

    fn item_skipped(&self, _symbol: &str, _reason: SkipReason) {}

    fn token_aggregated(&self, _symbol: &str, _token: Address, _amount: U256, _merged: bool) {}

    fn batch_built(&self, _calls: &[BatchCall]) {}
}

/// Telemetry sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl AllocationTelemetry for NoopTelemetry {}
