use soroban_sdk::{contract, contractimpl, log, Address, Env, Vec};

use crate::errors::Error;
use crate::events::*;
use crate::limits;
use crate::settlement::{self, BatchPlan};
use crate::storage::*;

/// Gates self-service withdrawals for one tranche and lets its manager push
/// withdrawal exceptions: forced redemptions for named lenders, settled as
/// one all-or-nothing batch that never takes the tranche below its floor.
#[contract]
pub struct MultiWithdrawalController;

#[contractimpl]
impl MultiWithdrawalController {
    pub fn initialize(
        env: Env,
        manager: Address,
        vault: Address,
        convention: AmountConvention,
        floor: u128,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        manager.require_auth();
        let storage = env.storage().persistent();
        storage.set(&DataKey::Initialized, &true);
        storage.set(&DataKey::Manager, &manager);
        storage.set(&DataKey::Vault, &vault);
        storage.set(&DataKey::Convention, &convention);
        write_config(
            &env,
            &ControllerConfig {
                floor,
                withdraw_allowed: WithdrawAllowed::default(),
            },
        );
        bump_core_ttl(&env);
        Ok(())
    }

    /// Manager: minimum assets that must stay in the tranche.
    pub fn set_floor(env: Env, caller: Address, floor: u128) -> Result<(), Error> {
        require_manager(&env, &caller)?;
        let mut config = read_config(&env)?;
        config.floor = floor;
        write_config(&env, &config);
        FloorChanged { floor }.publish(&env);
        Ok(())
    }

    /// Manager: open or close self-service withdrawals for one status.
    pub fn set_withdraw_allowed(
        env: Env,
        caller: Address,
        value: bool,
        status: PortfolioStatus,
    ) -> Result<(), Error> {
        require_manager(&env, &caller)?;
        let mut config = read_config(&env)?;
        config.withdraw_allowed.set(status, value);
        write_config(&env, &config);
        WithdrawAllowedChanged {
            status,
            allowed: value,
        }
        .publish(&env);
        Ok(())
    }

    /// Applies both settings at once. Resubmitting the current values is a
    /// no-op that succeeds for any caller.
    pub fn configure(
        env: Env,
        caller: Address,
        floor: u128,
        change: WithdrawAllowedChange,
    ) -> Result<(), Error> {
        let mut config = read_config(&env)?;
        let floor_changed = config.floor != floor;
        let allowed_changed = config.withdraw_allowed.get(change.status) != change.value;
        if !floor_changed && !allowed_changed {
            return Ok(());
        }

        require_manager(&env, &caller)?;
        if floor_changed {
            config.floor = floor;
            FloorChanged { floor }.publish(&env);
        }
        if allowed_changed {
            config.withdraw_allowed.set(change.status, change.value);
            WithdrawAllowedChanged {
                status: change.status,
                allowed: change.value,
            }
            .publish(&env);
        }
        write_config(&env, &config);
        Ok(())
    }

    /// Manager: settle a batch of withdrawal exceptions against `vault`.
    /// Either every record settles, in order, or nothing changes.
    pub fn multi_redeem(
        env: Env,
        caller: Address,
        vault: Address,
        exceptions: Vec<WithdrawalException>,
    ) -> Result<Vec<Settlement>, Error> {
        enter(&env)?;
        let result = Self::process_batch(&env, &caller, &vault, &exceptions);
        exit(&env);
        result
    }

    /// Vault hook: assets `owner_shares` may withdraw on their own.
    pub fn max_withdraw(
        env: Env,
        snapshot: TrancheSnapshot,
        owner_shares: u128,
    ) -> Result<u128, Error> {
        limits::max_withdraw(&read_config(&env)?, &snapshot, owner_shares)
    }

    /// Vault hook: shares `owner_shares` may redeem on their own.
    pub fn max_redeem(env: Env, snapshot: TrancheSnapshot, owner_shares: u128) -> Result<u128, Error> {
        limits::max_redeem(&read_config(&env)?, &snapshot, owner_shares)
    }

    /// Vault only: approve a self-service withdrawal of `assets` and return
    /// the shares to burn.
    pub fn on_withdraw(
        env: Env,
        assets: u128,
        snapshot: TrancheSnapshot,
        owner_shares: u128,
    ) -> Result<u128, Error> {
        read_vault(&env)?.require_auth();
        let config = read_config(&env)?;
        if !config.withdraw_allowed.get(snapshot.status) {
            return Err(Error::WithdrawalsNotAllowed);
        }
        if assets > limits::max_withdraw(&config, &snapshot, owner_shares)? {
            return Err(Error::ExceedsMaxWithdraw);
        }
        limits::preview_withdraw(&snapshot, assets)
    }

    /// Vault only: approve a self-service redemption of `shares` and return
    /// the assets to pay.
    pub fn on_redeem(
        env: Env,
        shares: u128,
        snapshot: TrancheSnapshot,
        owner_shares: u128,
    ) -> Result<u128, Error> {
        read_vault(&env)?.require_auth();
        let config = read_config(&env)?;
        if !config.withdraw_allowed.get(snapshot.status) {
            return Err(Error::RedemptionsNotAllowed);
        }
        if shares > limits::max_redeem(&config, &snapshot, owner_shares)? {
            return Err(Error::ExceedsMaxRedeem);
        }
        limits::convert_to_assets(&snapshot, shares)
    }

    pub fn manager(env: Env) -> Result<Address, Error> {
        read_manager(&env)
    }

    pub fn vault(env: Env) -> Result<Address, Error> {
        read_vault(&env)
    }

    pub fn convention(env: Env) -> Result<AmountConvention, Error> {
        read_convention(&env)
    }

    pub fn floor(env: Env) -> Result<u128, Error> {
        Ok(read_config(&env)?.floor)
    }

    pub fn withdraw_allowed(env: Env, status: PortfolioStatus) -> Result<bool, Error> {
        Ok(read_config(&env)?.withdraw_allowed.get(status))
    }

    pub fn config(env: Env) -> Result<ControllerConfig, Error> {
        read_config(&env)
    }

    /// Record being committed by an in-flight batch, if any.
    pub fn last_exception(env: Env) -> Option<WithdrawalException> {
        read_last_exception(&env)
    }
}

impl MultiWithdrawalController {
    fn process_batch(
        env: &Env,
        caller: &Address,
        vault: &Address,
        exceptions: &Vec<WithdrawalException>,
    ) -> Result<Vec<Settlement>, Error> {
        require_manager(env, caller)?;
        if exceptions.is_empty() {
            return Err(Error::EmptyBatch);
        }
        if *vault != read_vault(env)? {
            return Err(Error::WrongTranche);
        }

        let tranche = TrancheVaultClient::new(env, vault);
        let snapshot = tranche.snapshot();
        let config = read_config(env)?;
        let escape_hatch = snapshot.status == PortfolioStatus::Closed
            || env.ledger().timestamp() > snapshot.end_date;
        if config.withdraw_allowed.get(snapshot.status) && !escape_hatch {
            return Err(Error::RedemptionsCurrentlyEnabled);
        }

        let BatchPlan {
            settlements,
            total_net,
        } = settlement::plan_batch(env, read_convention(env)?, exceptions, |lender| {
            u128::try_from(tranche.balance(lender)).unwrap_or(0)
        })
        .inspect_err(|err| log!(env, "exception batch rejected: {}", *err as u32))?;

        let remaining = settlement::remaining_after(snapshot.total_assets, total_net, config.floor)
            .inspect_err(|_| {
                log!(
                    env,
                    "below floor: total_assets {} total_net {} floor {}",
                    snapshot.total_assets,
                    total_net,
                    config.floor
                )
            })?;
        if total_net > snapshot.virtual_token_balance {
            log!(
                env,
                "insufficient liquidity: cash {} total_net {}",
                snapshot.virtual_token_balance,
                total_net
            );
            return Err(Error::InsufficientLiquidity);
        }

        for (exception, settled) in exceptions.iter().zip(settlements.iter()) {
            write_last_exception(env, &exception);
            tranche.burn_and_transfer(
                &settled.lender,
                &settled.share_amount,
                &settled.net_asset_amount,
            );
            Redeem {
                lender: settled.lender.clone(),
                tranche: vault.clone(),
                withdraw_type: settled.withdraw_type,
                asset_amount: settled.net_asset_amount,
                share_amount: settled.share_amount,
                fee_amount: settled.fee_amount,
            }
            .publish(env);
        }
        clear_last_exception(env);

        BatchProcessed {
            tranche: vault.clone(),
            records: settlements.len(),
            total_net,
            remaining,
        }
        .publish(env);
        Ok(settlements)
    }
}
