// crates/tan-economics/tests/common/mod.rs
//
// Shared fixtures for the integration tests.
//
// The reference farm uses a max supply of 65,454,545,455 wei: 66% of it is
// a farm supply of 43,200,000,000, so epoch 0 emits 432,000,000 per epoch
// and exactly 1000 per block.

#![allow(dead_code)]

use tan_core::{Address, CallContext, FungibleLedger};
use tan_economics::{
    Craftsman, CraftsmanParams, EmissionParams, Ledger, RewardToken, Workbench,
};
use tan_economics::supply::default_genesis;

pub const SMALL_MAX_SUPPLY: u128 = 65_454_545_455;
pub const FARM_SUPPLY: u128 = 43_200_000_000;
pub const DAY: i64 = 86_400;

pub fn engine() -> Address {
    Address::derive("craftsman")
}

pub fn owner() -> Address {
    Address::derive("owner")
}

pub fn dev() -> Address {
    Address::derive("dev")
}

pub fn user(label: &str) -> Address {
    Address::derive(label)
}

pub fn at(sender: Address, block: u64) -> CallContext {
    CallContext::new(sender, block, 0)
}

pub fn craftsman(owner: Address, params: CraftsmanParams) -> Craftsman {
    let token = RewardToken::new(
        Address::derive("tan"),
        engine(),
        SMALL_MAX_SUPPLY,
        66,
        EmissionParams::default(),
        &default_genesis(),
        0,
    )
    .unwrap();
    let workbench = Workbench::new(Address::derive("workbench"), engine());
    Craftsman::new(engine(), owner, dev(), token, workbench, params).unwrap()
}

/// Register `count` LP assets named LP1..LPn, each funding `holders` with
/// `balance` units. Returns the asset addresses.
pub fn register_lps(
    craft: &mut Craftsman,
    count: usize,
    holders: &[Address],
    balance: u128,
) -> Vec<Address> {
    (1..=count)
        .map(|i| {
            let mut ledger = Ledger::new(Address::derive(&format!("lp{}", i)), format!("LP{}", i));
            for holder in holders {
                ledger.issue(holder, balance).unwrap();
            }
            craft.register_asset(ledger).unwrap()
        })
        .collect()
}

pub fn approve_lp(craft: &mut Craftsman, asset: &Address, holder: &Address, amount: u128) {
    let spender = craft.address();
    craft
        .asset_mut(asset)
        .unwrap()
        .approve(holder, &spender, amount);
}

pub fn approve_tan(craft: &mut Craftsman, holder: &Address, amount: u128) {
    let spender = craft.address();
    craft.reward_token_mut().approve(holder, &spender, amount);
}

pub fn tan_balance(craft: &Craftsman, holder: &Address) -> u128 {
    craft.reward_token().balance_of(holder)
}

pub fn lp_balance(craft: &Craftsman, asset: &Address, holder: &Address) -> u128 {
    craft.assets().get(asset).unwrap().balance_of(holder)
}

/// Give `to` some TAN out of the DAO's genesis allocation.
pub fn fund_tan(craft: &mut Craftsman, to: &Address, amount: u128) {
    let dao = Address::derive("dao");
    craft.reward_token_mut().transfer(&dao, to, amount).unwrap();
}
