// crates/tan-core/src/traits.rs

use crate::address::Address;
use crate::error::FarmError;

/// Balance bookkeeping for a fungible asset.
///
/// Implemented by the in-memory ledgers in tan-economics (deposit assets,
/// the reward token).
pub trait FungibleLedger {
    /// Balance held by `holder`.
    fn balance_of(&self, holder: &Address) -> u128;

    /// Sum of all balances.
    fn total_supply(&self) -> u128;

    /// Amount `spender` may still move out of `owner`'s balance.
    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    /// Set the allowance of `spender` over `owner`'s balance.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128);

    /// Move `amount` from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), FarmError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), FarmError>;

    /// Transfer `min(amount, balance_of(from))` and return what was moved.
    ///
    /// Outgoing reward payments use this so rounding dust in the accumulator
    /// never makes a harvest fail.
    fn safe_transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<u128, FarmError> {
        let paid = amount.min(self.balance_of(from));
        if paid > 0 {
            self.transfer(from, to, paid)?;
        }
        Ok(paid)
    }
}

/// Supply-capped issuance of the reward token.
///
/// Implemented by `RewardToken` in tan-economics.
pub trait RewardMinter {
    /// Mint up to `amount` to `to`, clamped to the remaining headroom.
    /// Returns the amount actually minted. Only the minter role may call.
    fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<u128, FarmError>;

    /// Remaining mintable budget.
    fn headroom(&self) -> u128;
}

/// 1:1 receipt for principal held in the self-staking pool.
///
/// Implemented by `Workbench` in tan-economics.
pub trait StakingReceipt {
    fn mint_receipt(&mut self, caller: &Address, to: &Address, amount: u128)
        -> Result<(), FarmError>;

    fn burn_receipt(
        &mut self,
        caller: &Address,
        from: &Address,
        amount: u128,
    ) -> Result<(), FarmError>;

    fn receipt_balance(&self, holder: &Address) -> u128;
}
