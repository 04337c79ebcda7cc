// crates/tan-economics/tests/properties.rs
//
// Property tests over random operation sequences: reward conservation on a
// single pool, the supply ceiling, and add-order independence of the
// staking-pool weight.

mod common;

use common::*;
use proptest::prelude::*;
use tan_core::{Address, RewardMinter};
use tan_economics::{CraftsmanParams, EmissionParams, RewardToken};

#[derive(Debug, Clone)]
enum Op {
    Deposit { who: usize, amount: u128 },
    Withdraw { who: usize, amount: u128 },
    Harvest { who: usize },
}

fn op_strategy() -> impl Strategy<Value = (Op, u64)> {
    let op = prop_oneof![
        (0..3usize, 1..1_000u128).prop_map(|(who, amount)| Op::Deposit { who, amount }),
        (0..3usize, 1..1_000u128).prop_map(|(who, amount)| Op::Withdraw { who, amount }),
        (0..3usize).prop_map(|who| Op::Harvest { who }),
    ];
    (op, 0..20u64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Everything paid out of one pool stays within what the pool was owed,
    /// and what the vault keeps back is rounding dust.
    #[test]
    fn reward_conservation_on_single_pool(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let users: Vec<Address> = ["u0", "u1", "u2"].iter().map(|l| user(l)).collect();
        let mut craft = craftsman(owner(), CraftsmanParams::default());
        let lp = register_lps(&mut craft, 1, &users, 1_000_000)[0];
        craft.add_pool(&at(owner(), 1), 1000, lp).unwrap();
        for u in &users {
            approve_lp(&mut craft, &lp, u, u128::MAX);
        }
        // Pool 0 at 333 of 1333.
        let total_weight = craft.total_weight() as u128;
        prop_assert_eq!(total_weight, 1333);

        let mut block = 10u64;
        let mut first_deposit: Option<u64> = None;
        let mut paid: u128 = 0;
        let mut actions: u128 = 0;

        for (op, gap) in ops {
            block += gap;
            let result = match op {
                Op::Deposit { who, amount } => {
                    first_deposit.get_or_insert(block);
                    craft.deposit(&at(users[who], block), 1, amount)
                }
                Op::Withdraw { who, amount } => {
                    let held = craft.user_info(1, &users[who]).unwrap().amount;
                    craft.withdraw(&at(users[who], block), 1, amount.min(held))
                }
                Op::Harvest { who } => craft.deposit(&at(users[who], block), 1, 0),
            };
            paid += result.unwrap().reward_paid;
            actions += 1;
        }

        // Everyone leaves.
        block += 1;
        for u in &users {
            let held = craft.user_info(1, u).unwrap().amount;
            paid += craft.withdraw(&at(*u, block), 1, held).unwrap().reward_paid;
            actions += 1;
        }

        let owed = match first_deposit {
            Some(start) => (block - start) as u128 * 1000 * 1000 / total_weight,
            None => 0,
        };
        prop_assert!(paid <= owed);

        let vault = craft.workbench().address();
        let dust = tan_balance(&craft, &vault);
        prop_assert!(dust <= actions * users.len() as u128);
        prop_assert_eq!(craft.pool(1).unwrap().total_deposited, 0);
    }

    /// No sequence of mints takes supply past the ceiling.
    #[test]
    fn supply_never_exceeds_ceiling(
        max_supply in 1u128..1_000_000_000_000,
        mints in prop::collection::vec(0u128..400_000_000_000, 0..30),
    ) {
        let minter = Address::derive("minter");
        let vault = Address::derive("vault");
        let mut token = RewardToken::new(
            Address::derive("tan"),
            minter,
            max_supply,
            66,
            EmissionParams::default(),
            &[],
            0,
        )
        .unwrap();

        let mut minted_total: u128 = 0;
        for amount in mints {
            let headroom = token.headroom();
            let minted = token.mint(&minter, &vault, amount).unwrap();
            prop_assert_eq!(minted, amount.min(headroom));
            minted_total += minted;
            prop_assert!(token.circulating_supply() <= token.max_supply());
        }
        prop_assert_eq!(token.circulating_supply(), minted_total);
    }

    /// Adding the same pools in any order yields the same staking weight.
    #[test]
    fn add_order_independence(
        weights in prop::collection::vec(0u64..100_000, 2..5),
        ratio in 0u8..=50,
    ) {
        let build = |order: &[usize]| {
            let mut craft = craftsman(owner(), CraftsmanParams::default());
            let lps = register_lps(&mut craft, weights.len(), &[], 0);
            craft.update_staking_ratio(&at(owner(), 1), ratio).unwrap();
            for &i in order {
                craft.add_pool(&at(owner(), 1), weights[i], lps[i]).unwrap();
            }
            (craft.pool(0).unwrap().weight, craft.total_weight())
        };

        let forward: Vec<usize> = (0..weights.len()).collect();
        let reverse: Vec<usize> = forward.iter().rev().copied().collect();
        let (w_fwd, total_fwd) = build(&forward);
        let (w_rev, total_rev) = build(&reverse);

        prop_assert_eq!(w_fwd, w_rev);
        prop_assert_eq!(total_fwd, total_rev);

        let others: u64 = weights.iter().sum();
        prop_assert_eq!(w_fwd, others * ratio as u64 / (100 - ratio as u64));
    }
}
