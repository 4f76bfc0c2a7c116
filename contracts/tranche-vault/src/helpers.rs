use soroban_sdk::{token, Address, Env};
use stellar_tokens::fungible::burnable::emit_burn;
use stellar_tokens::fungible::Base as TokenBase;

use crate::storage::*;

/// shares = assets * total_supply / total_assets, rounded down.
/// An empty or fully written-down tranche prices shares 1:1.
pub fn shares_for_assets(assets: u128, total_assets: u128, total_supply: u128) -> u128 {
    if total_supply == 0 || total_assets == 0 {
        return assets;
    }
    assets
        .checked_mul(total_supply)
        .expect("conversion overflow")
        / total_assets
}

/// Same as `shares_for_assets` but rounded up, so the tranche never
/// under-burns on a withdrawal by asset amount.
pub fn shares_for_assets_ceil(assets: u128, total_assets: u128, total_supply: u128) -> u128 {
    if total_supply == 0 || total_assets == 0 {
        return assets;
    }
    let numerator = assets
        .checked_mul(total_supply)
        .expect("conversion overflow");
    numerator.div_ceil(total_assets)
}

/// assets = shares * total_assets / total_supply, rounded down.
pub fn assets_for_shares(shares: u128, total_assets: u128, total_supply: u128) -> u128 {
    if total_supply == 0 {
        return shares;
    }
    shares
        .checked_mul(total_assets)
        .expect("conversion overflow")
        / total_supply
}

pub fn to_i128(amount: u128) -> i128 {
    if amount > i128::MAX as u128 {
        panic!("amount exceeds i128");
    }
    amount as i128
}

/// Burns `shares` from `owner` and pays `assets` of underlying out of the
/// tranche's virtual balance. Anything retained (fees) stays in the balance.
pub fn burn_and_pay(env: &Env, underlying: &Address, owner: &Address, shares: u128, assets: u128) {
    if share_balance(env, owner) < shares {
        panic!("insufficient shares");
    }
    let cash = read_virtual_token_balance(env);
    if cash < assets {
        panic!("insufficient liquidity");
    }

    if shares > 0 {
        let burn_i128 = to_i128(shares);
        // Burn without implicit auth; callers authorize before reaching here
        TokenBase::update(env, Some(owner), None, burn_i128);
        emit_burn(env, owner, burn_i128);
    }

    write_virtual_token_balance(env, cash - assets);
    if assets > 0 {
        token::Client::new(env, underlying).transfer(
            &env.current_contract_address(),
            owner,
            &to_i128(assets),
        );
    }
}
