use soroban_sdk::{contracttype, Address, Env};

use crate::constants::{TTL_EXTEND_TO, TTL_THRESHOLD};
use crate::errors::Error;

#[soroban_sdk::contractclient(name = "TrancheVaultClient")]
pub trait TrancheVaultContract {
    fn snapshot(env: Env) -> TrancheSnapshot;
    fn balance(env: Env, id: Address) -> i128;
    fn burn_and_transfer(env: Env, lender: Address, shares: u128, assets: u128);
}

#[contracttype]
pub enum DataKey {
    Manager,       // Address
    Vault,         // Address of the tranche this controller settles for
    Convention,    // AmountConvention, fixed at initialization
    Config,        // ControllerConfig
    LastException, // WithdrawalException being committed (temporary)
    Entered,       // bool reentrancy flag (instance)
    Initialized,   // bool flag to prevent re-initialization
}

/// Mirrors the tranche's lifecycle status. Discriminants match the vault's.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PortfolioStatus {
    CapitalFormation = 0,
    Live = 1,
    Closed = 2,
}

/// Tranche state as read from the vault at the start of an operation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrancheSnapshot {
    pub total_assets: u128,
    pub total_supply: u128,
    pub virtual_token_balance: u128,
    pub status: PortfolioStatus,
    pub end_date: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum WithdrawType {
    Interest = 0,
    Principal = 1,
}

/// How `WithdrawalException::amount` is read.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AmountConvention {
    /// `amount` is the gross asset amount.
    DirectAmount = 0,
    /// `amount` is a share price in basis points; gross assets are
    /// `share_amount * amount / 10_000`.
    SharePrice = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawalException {
    pub lender: Address,
    pub amount: u128,
    pub share_amount: u128,
    pub fee: u32,
    pub withdraw_type: WithdrawType,
}

/// Planned outcome of one exception. `net_asset_amount` is what the lender
/// receives; `fee_amount` stays in the tranche.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub lender: Address,
    pub withdraw_type: WithdrawType,
    pub asset_amount: u128,
    pub net_asset_amount: u128,
    pub share_amount: u128,
    pub fee_amount: u128,
}

/// Whether lenders may withdraw on their own, per portfolio status.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawAllowed {
    pub capital_formation: bool,
    pub live: bool,
    pub closed: bool,
}

impl WithdrawAllowed {
    pub fn get(&self, status: PortfolioStatus) -> bool {
        match status {
            PortfolioStatus::CapitalFormation => self.capital_formation,
            PortfolioStatus::Live => self.live,
            PortfolioStatus::Closed => self.closed,
        }
    }

    pub fn set(&mut self, status: PortfolioStatus, value: bool) {
        match status {
            PortfolioStatus::CapitalFormation => self.capital_formation = value,
            PortfolioStatus::Live => self.live = value,
            PortfolioStatus::Closed => self.closed = value,
        }
    }
}

impl Default for WithdrawAllowed {
    fn default() -> Self {
        Self {
            capital_formation: false,
            live: false,
            closed: true,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerConfig {
    pub floor: u128,
    pub withdraw_allowed: WithdrawAllowed,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawAllowedChange {
    pub status: PortfolioStatus,
    pub value: bool,
}

pub fn bump_core_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Manager,
        DataKey::Vault,
        DataKey::Convention,
        DataKey::Config,
        DataKey::Initialized,
    ] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .persistent()
        .get::<_, bool>(&DataKey::Initialized)
        .unwrap_or(false)
}

pub fn read_manager(env: &Env) -> Result<Address, Error> {
    bump_core_ttl(env);
    env.storage()
        .persistent()
        .get(&DataKey::Manager)
        .ok_or(Error::NotInitialized)
}

pub fn require_manager(env: &Env, caller: &Address) -> Result<(), Error> {
    if read_manager(env)? != *caller {
        return Err(Error::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}

pub fn read_vault(env: &Env) -> Result<Address, Error> {
    bump_core_ttl(env);
    env.storage()
        .persistent()
        .get(&DataKey::Vault)
        .ok_or(Error::NotInitialized)
}

pub fn read_convention(env: &Env) -> Result<AmountConvention, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Convention)
        .ok_or(Error::NotInitialized)
}

pub fn read_config(env: &Env) -> Result<ControllerConfig, Error> {
    bump_core_ttl(env);
    env.storage()
        .persistent()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn write_config(env: &Env, config: &ControllerConfig) {
    env.storage().persistent().set(&DataKey::Config, config);
}

pub fn read_last_exception(env: &Env) -> Option<WithdrawalException> {
    env.storage().temporary().get(&DataKey::LastException)
}

pub fn write_last_exception(env: &Env, exception: &WithdrawalException) {
    env.storage()
        .temporary()
        .set(&DataKey::LastException, exception);
}

pub fn clear_last_exception(env: &Env) {
    env.storage().temporary().remove(&DataKey::LastException);
}

pub fn enter(env: &Env) -> Result<(), Error> {
    let entered = env
        .storage()
        .instance()
        .get::<_, bool>(&DataKey::Entered)
        .unwrap_or(false);
    if entered {
        return Err(Error::Reentrant);
    }
    env.storage().instance().set(&DataKey::Entered, &true);
    Ok(())
}

pub fn exit(env: &Env) {
    env.storage().instance().set(&DataKey::Entered, &false);
}
