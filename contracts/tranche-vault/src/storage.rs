use soroban_sdk::{contracttype, Address, Env};
use stellar_tokens::fungible::Base as TokenBase;

use crate::constants::{TTL_EXTEND_TO, TTL_THRESHOLD};

#[soroban_sdk::contractclient(name = "WithdrawControllerClient")]
pub trait WithdrawControllerContract {
    fn max_withdraw(env: Env, snapshot: TrancheSnapshot, owner_shares: u128) -> u128;
    fn max_redeem(env: Env, snapshot: TrancheSnapshot, owner_shares: u128) -> u128;
    fn on_withdraw(
        env: Env,
        assets: u128,
        snapshot: TrancheSnapshot,
        owner_shares: u128,
    ) -> u128;
    fn on_redeem(env: Env, shares: u128, snapshot: TrancheSnapshot, owner_shares: u128) -> u128;
}

// Storage key types for the contract
#[contracttype]
pub enum DataKey {
    Manager,             // Address
    UnderlyingToken,     // Address
    WithdrawController,  // Address (optional until configured)
    Status,              // PortfolioStatus
    EndDate,             // u64 ledger timestamp
    VirtualTokenBalance, // u128, underlying held by the tranche
    DeployedAssets,      // u128, value of funds lent out, refreshed by checkpoints
    Initialized,         // bool flag to prevent re-initialization
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PortfolioStatus {
    CapitalFormation = 0,
    Live = 1,
    Closed = 2,
}

/// Point-in-time view of the tranche handed to the withdraw controller.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrancheSnapshot {
    pub total_assets: u128,
    pub total_supply: u128,
    pub virtual_token_balance: u128,
    pub status: PortfolioStatus,
    pub end_date: u64,
}

pub fn ensure_initialized(env: &Env) -> Address {
    bump_core_ttl(env);
    env.storage()
        .persistent()
        .get(&DataKey::UnderlyingToken)
        .expect("Vault not initialized")
}

pub fn require_initialized(env: &Env) {
    ensure_initialized(env);
}

pub fn bump_core_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Manager,
        DataKey::UnderlyingToken,
        DataKey::WithdrawController,
        DataKey::Status,
        DataKey::EndDate,
        DataKey::VirtualTokenBalance,
        DataKey::DeployedAssets,
        DataKey::Initialized,
    ] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
}

pub fn read_manager(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::Manager)
        .expect("manager not set")
}

pub fn require_manager(env: &Env, manager: &Address) {
    let stored = read_manager(env);
    bump_core_ttl(env);
    if stored != *manager {
        panic!("not manager");
    }
    manager.require_auth();
}

pub fn read_withdraw_controller(env: &Env) -> Option<Address> {
    env.storage().persistent().get(&DataKey::WithdrawController)
}

pub fn read_status(env: &Env) -> PortfolioStatus {
    env.storage()
        .persistent()
        .get(&DataKey::Status)
        .unwrap_or(PortfolioStatus::CapitalFormation)
}

pub fn write_status(env: &Env, status: PortfolioStatus) {
    env.storage().persistent().set(&DataKey::Status, &status);
}

pub fn read_end_date(env: &Env) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::EndDate)
        .expect("end date not set")
}

pub fn read_virtual_token_balance(env: &Env) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::VirtualTokenBalance)
        .unwrap_or(0u128)
}

pub fn write_virtual_token_balance(env: &Env, amount: u128) {
    env.storage()
        .persistent()
        .set(&DataKey::VirtualTokenBalance, &amount);
}

pub fn read_deployed_assets(env: &Env) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::DeployedAssets)
        .unwrap_or(0u128)
}

pub fn write_deployed_assets(env: &Env, amount: u128) {
    env.storage()
        .persistent()
        .set(&DataKey::DeployedAssets, &amount);
}

pub fn share_balance(env: &Env, addr: &Address) -> u128 {
    let bal = TokenBase::balance(env, addr);
    if bal < 0 {
        panic!("negative shares");
    }
    bal as u128
}

pub fn total_shares(env: &Env) -> u128 {
    let supply = TokenBase::total_supply(env);
    if supply < 0 {
        panic!("negative supply");
    }
    supply as u128
}
