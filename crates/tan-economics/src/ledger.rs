// crates/tan-economics/src/ledger.rs
//
// In-memory fungible ledgers: one per asset. The reward token, the Workbench
// receipt, and every pool's deposit asset keep their balances in a `Ledger`.

use std::collections::BTreeMap;

use tan_core::address::Address;
use tan_core::error::FarmError;
use tan_core::traits::FungibleLedger;

use crate::math;

/// Balances and allowances of a single fungible asset.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Address identifying the asset itself.
    address: Address,
    symbol: String,
    balances: BTreeMap<Address, u128>,
    allowances: BTreeMap<(Address, Address), u128>,
    total_supply: u128,
}

impl Ledger {
    /// Create an empty ledger for the asset at `address`.
    pub fn new(address: Address, symbol: impl Into<String>) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            total_supply: 0,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Create `amount` new units in `to`'s balance.
    ///
    /// Raw supply adjustment with no role check: wrappers that own a ledger
    /// (the reward token, the Workbench) gate this behind their own roles.
    pub fn issue(&mut self, to: &Address, amount: u128) -> Result<(), FarmError> {
        let total = math::add(self.total_supply, amount, "total supply")?;
        let balance = math::add(self.balance_of(to), amount, "balance")?;
        self.total_supply = total;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Destroy `amount` units from `from`'s balance.
    pub fn retire(&mut self, from: &Address, amount: u128) -> Result<(), FarmError> {
        let balance = self.balance_of(from);
        if amount > balance {
            return Err(FarmError::InsufficientBalance {
                requested: amount,
                available: balance,
            });
        }
        self.set_balance(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Accounts with a non-zero balance, in address order.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.balances.iter()
    }

    fn set_balance(&mut self, holder: &Address, balance: u128) {
        if balance == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(*holder, balance);
        }
    }
}

impl FungibleLedger for Ledger {
    fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), FarmError> {
        let available = self.balance_of(from);
        if amount > available {
            return Err(FarmError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        // Cannot overflow: the sum of all balances is total_supply.
        let credited = self.balance_of(to) + amount;
        self.set_balance(from, available - amount);
        self.set_balance(to, credited);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), FarmError> {
        let approved = self.allowance(from, spender);
        if amount > approved {
            return Err(FarmError::InsufficientAllowance {
                requested: amount,
                approved,
            });
        }
        self.transfer(from, to, amount)?;
        self.approve(from, spender, approved - amount);
        Ok(())
    }
}

/// Registry of the external deposit assets pools can accept, keyed by the
/// asset's address.
#[derive(Debug, Clone, Default)]
pub struct AssetBook {
    ledgers: BTreeMap<Address, Ledger>,
}

impl AssetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ledger.
    ///
    /// # Errors
    /// Returns `FarmError::InvalidParameter` if an asset with the same address
    /// is already registered.
    pub fn register(&mut self, ledger: Ledger) -> Result<Address, FarmError> {
        let address = ledger.address();
        if self.ledgers.contains_key(&address) {
            return Err(FarmError::InvalidParameter(format!(
                "Asset {} ({}) is already registered",
                ledger.symbol(),
                address
            )));
        }
        self.ledgers.insert(address, ledger);
        Ok(address)
    }

    pub fn contains(&self, asset: &Address) -> bool {
        self.ledgers.contains_key(asset)
    }

    pub fn get(&self, asset: &Address) -> Result<&Ledger, FarmError> {
        self.ledgers
            .get(asset)
            .ok_or_else(|| FarmError::NotFound(format!("No ledger registered for asset {}", asset)))
    }

    pub fn get_mut(&mut self, asset: &Address) -> Result<&mut Ledger, FarmError> {
        self.ledgers
            .get_mut(asset)
            .ok_or_else(|| FarmError::NotFound(format!("No ledger registered for asset {}", asset)))
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lp() -> Ledger {
        Ledger::new(Address::derive("lp1"), "LP1")
    }

    #[test]
    fn test_issue_and_transfer() {
        let alice = Address::derive("alice");
        let bob = Address::derive("bob");
        let mut ledger = lp();
        ledger.issue(&alice, 2000).unwrap();
        ledger.transfer(&alice, &bob, 500).unwrap();
        assert_eq!(ledger.balance_of(&alice), 1500);
        assert_eq!(ledger.balance_of(&bob), 500);
        assert_eq!(ledger.total_supply(), 2000);
    }

    #[test]
    fn test_transfer_insufficient_balance_leaves_state() {
        let alice = Address::derive("alice");
        let bob = Address::derive("bob");
        let mut ledger = lp();
        ledger.issue(&alice, 10).unwrap();
        let err = ledger.transfer(&alice, &bob, 11).unwrap_err();
        assert_eq!(
            err,
            FarmError::InsufficientBalance {
                requested: 11,
                available: 10
            }
        );
        assert_eq!(ledger.balance_of(&alice), 10);
        assert_eq!(ledger.balance_of(&bob), 0);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let alice = Address::derive("alice");
        let engine = Address::derive("engine");
        let mut ledger = lp();
        ledger.issue(&alice, 100).unwrap();
        ledger.approve(&alice, &engine, 60);

        ledger.transfer_from(&engine, &alice, &engine, 40).unwrap();
        assert_eq!(ledger.allowance(&alice, &engine), 20);
        assert_eq!(ledger.balance_of(&engine), 40);

        let err = ledger.transfer_from(&engine, &alice, &engine, 21).unwrap_err();
        assert!(matches!(err, FarmError::InsufficientAllowance { .. }));
        assert_eq!(ledger.balance_of(&alice), 60);
    }

    #[test]
    fn test_safe_transfer_caps_to_balance() {
        let vault = Address::derive("vault");
        let bob = Address::derive("bob");
        let mut ledger = lp();
        ledger.issue(&vault, 1000).unwrap();

        assert_eq!(ledger.safe_transfer(&vault, &bob, 200).unwrap(), 200);
        assert_eq!(ledger.balance_of(&vault), 800);
        assert_eq!(ledger.safe_transfer(&vault, &bob, 2000).unwrap(), 800);
        assert_eq!(ledger.balance_of(&bob), 1000);
        assert_eq!(ledger.safe_transfer(&vault, &bob, 5).unwrap(), 0);
    }

    #[test]
    fn test_retire() {
        let alice = Address::derive("alice");
        let mut ledger = lp();
        ledger.issue(&alice, 1000).unwrap();
        ledger.retire(&alice, 200).unwrap();
        assert_eq!(ledger.balance_of(&alice), 800);
        assert_eq!(ledger.total_supply(), 800);
        assert!(ledger.retire(&alice, 801).is_err());
    }

    #[test]
    fn test_asset_book_rejects_duplicates() {
        let mut book = AssetBook::new();
        let address = book.register(lp()).unwrap();
        assert!(book.contains(&address));
        assert!(book.register(lp()).is_err());
        assert_eq!(book.len(), 1);
        assert!(book.get(&Address::derive("missing")).is_err());
    }
}
