//! Contract interfaces the batch talks to

use alloy_primitives::Address;
use alloy_sol_types::sol;

sol! {
    /// Minimal ERC-20 surface needed for approvals
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Swap-and-pay router: pulls approved inputs, swaps them into the
    /// payment token and forwards `callData` to `target`.
    interface ISwapPay {
        function execute(
            address[] inTokens,
            uint256[] inAmounts,
            address target,
            bytes callData,
            uint256 paymentTokenAmount,
            uint256 minOut
        ) external;
    }
}

/// Deployment of the swap/pay router on one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPayContract {
    pub chain_id: u64,
    pub address: Address,
}

impl SwapPayContract {
    pub fn new(chain_id: u64, address: Address) -> Self {
        Self { chain_id, address }
    }
}
