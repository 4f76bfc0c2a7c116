use soroban_sdk::{contract, contractimpl, token, Address, Env, String};
use stellar_tokens::fungible::Base as TokenBase;

use crate::events::*;
use crate::helpers::*;
use crate::storage::*;

#[contract]
pub struct TrancheVault;

#[contractimpl]
impl TrancheVault {
    /// Initialize the tranche with its manager, underlying token and portfolio end date.
    /// Share decimals follow the underlying token.
    pub fn initialize(
        env: Env,
        manager: Address,
        underlying: Address,
        end_date: u64,
        name: String,
        symbol: String,
    ) {
        let storage = env.storage().persistent();
        if storage
            .get::<_, bool>(&DataKey::Initialized)
            .unwrap_or(false)
        {
            panic!("already initialized");
        }
        manager.require_auth();
        if end_date <= env.ledger().timestamp() {
            panic!("invalid end date");
        }
        storage.set(&DataKey::Initialized, &true);
        storage.set(&DataKey::Manager, &manager);
        storage.set(&DataKey::UnderlyingToken, &underlying);
        storage.set(&DataKey::EndDate, &end_date);
        write_status(&env, PortfolioStatus::CapitalFormation);
        write_virtual_token_balance(&env, 0);
        write_deployed_assets(&env, 0);

        let decimals = token::Client::new(&env, &underlying).decimals();
        TokenBase::set_metadata(&env, decimals, name, symbol);
        bump_core_ttl(&env);
    }

    /// Manager: attach the controller that gates withdrawals and settles exceptions.
    pub fn set_withdraw_controller(env: Env, manager: Address, controller: Address) {
        require_initialized(&env);
        require_manager(&env, &manager);
        env.storage()
            .persistent()
            .set(&DataKey::WithdrawController, &controller);
        NewWithdrawController { controller }.publish(&env);
    }

    /// Manager: CapitalFormation -> Live
    pub fn start(env: Env, manager: Address) {
        require_initialized(&env);
        require_manager(&env, &manager);
        if read_status(&env) != PortfolioStatus::CapitalFormation {
            panic!("invalid status");
        }
        write_status(&env, PortfolioStatus::Live);
        StatusChanged {
            status: PortfolioStatus::Live,
        }
        .publish(&env);
    }

    /// Live -> Closed. Only the manager may close early; once the end date
    /// has passed anyone can.
    pub fn close(env: Env, caller: Address) {
        require_initialized(&env);
        if read_status(&env) != PortfolioStatus::Live {
            panic!("invalid status");
        }
        if env.ledger().timestamp() <= read_end_date(&env) && caller != read_manager(&env) {
            panic!("not manager");
        }
        caller.require_auth();
        write_status(&env, PortfolioStatus::Closed);
        StatusChanged {
            status: PortfolioStatus::Closed,
        }
        .publish(&env);
    }

    /// Deposit underlying and receive tranche shares at the current price.
    pub fn deposit(env: Env, lender: Address, assets: u128) -> u128 {
        let underlying = ensure_initialized(&env);
        lender.require_auth();
        if assets == 0 {
            panic!("zero deposit");
        }
        if read_status(&env) == PortfolioStatus::Closed {
            panic!("portfolio closed");
        }

        let shares = Self::convert_to_shares(env.clone(), assets);
        if shares == 0 {
            panic!("zero shares");
        }

        token::Client::new(&env, &underlying).transfer(
            &lender,
            &env.current_contract_address(),
            &to_i128(assets),
        );
        TokenBase::mint(&env, &lender, to_i128(shares));
        write_virtual_token_balance(&env, read_virtual_token_balance(&env) + assets);

        Deposit {
            lender,
            assets,
            shares,
        }
        .publish(&env);
        shares
    }

    /// Self-service withdrawal by asset amount. Returns shares burned.
    pub fn withdraw(env: Env, owner: Address, assets: u128) -> u128 {
        let underlying = ensure_initialized(&env);
        owner.require_auth();
        let controller = Self::controller_client(&env);
        let owner_shares = share_balance(&env, &owner);
        let snapshot = Self::snapshot(env.clone());
        let shares = controller.on_withdraw(&assets, &snapshot, &owner_shares);

        burn_and_pay(&env, &underlying, &owner, shares, assets);
        Withdraw {
            owner,
            assets,
            shares,
        }
        .publish(&env);
        shares
    }

    /// Self-service redemption by share amount. Returns assets paid.
    pub fn redeem(env: Env, owner: Address, shares: u128) -> u128 {
        let underlying = ensure_initialized(&env);
        owner.require_auth();
        let controller = Self::controller_client(&env);
        let owner_shares = share_balance(&env, &owner);
        let snapshot = Self::snapshot(env.clone());
        let assets = controller.on_redeem(&shares, &snapshot, &owner_shares);

        burn_and_pay(&env, &underlying, &owner, shares, assets);
        Redeem {
            owner,
            assets,
            shares,
        }
        .publish(&env);
        assets
    }

    /// Controller only: burn a lender's shares and pay out the net amount of
    /// a settled withdrawal exception.
    pub fn burn_and_transfer(env: Env, lender: Address, shares: u128, assets: u128) {
        let underlying = ensure_initialized(&env);
        let controller =
            read_withdraw_controller(&env).expect("withdraw controller not set");
        controller.require_auth();
        burn_and_pay(&env, &underlying, &lender, shares, assets);
        SharesBurned {
            lender,
            controller,
            shares,
            assets,
        }
        .publish(&env);
    }

    pub fn max_withdraw(env: Env, owner: Address) -> u128 {
        require_initialized(&env);
        let Some(controller) = read_withdraw_controller(&env) else {
            return 0;
        };
        let owner_shares = share_balance(&env, &owner);
        WithdrawControllerClient::new(&env, &controller)
            .max_withdraw(&Self::snapshot(env.clone()), &owner_shares)
    }

    pub fn max_redeem(env: Env, owner: Address) -> u128 {
        require_initialized(&env);
        let Some(controller) = read_withdraw_controller(&env) else {
            return 0;
        };
        let owner_shares = share_balance(&env, &owner);
        WithdrawControllerClient::new(&env, &controller)
            .max_redeem(&Self::snapshot(env.clone()), &owner_shares)
    }

    /// Manager: move cash out of the tranche to fund a loan.
    pub fn fund_loan(env: Env, manager: Address, borrower: Address, amount: u128) {
        let underlying = ensure_initialized(&env);
        require_manager(&env, &manager);
        if read_status(&env) != PortfolioStatus::Live {
            panic!("portfolio not live");
        }
        let cash = read_virtual_token_balance(&env);
        if cash < amount {
            panic!("insufficient liquidity");
        }
        write_virtual_token_balance(&env, cash - amount);
        write_deployed_assets(&env, read_deployed_assets(&env) + amount);
        token::Client::new(&env, &underlying).transfer(
            &env.current_contract_address(),
            &borrower,
            &to_i128(amount),
        );
        Self::publish_checkpoint(&env);
    }

    /// Repay a loan. Principal leaves the deployed bucket, interest is pure
    /// gain for the share price.
    pub fn repay_loan(env: Env, payer: Address, principal: u128, interest: u128) {
        let underlying = ensure_initialized(&env);
        payer.require_auth();
        let deployed = read_deployed_assets(&env);
        if principal > deployed {
            panic!("repayment exceeds deployed assets");
        }
        let total = principal
            .checked_add(interest)
            .expect("repayment overflow");
        token::Client::new(&env, &underlying).transfer(
            &payer,
            &env.current_contract_address(),
            &to_i128(total),
        );
        write_deployed_assets(&env, deployed - principal);
        write_virtual_token_balance(&env, read_virtual_token_balance(&env) + total);
        Self::publish_checkpoint(&env);
    }

    /// Manager: mark the deployed assets to their current value.
    pub fn update_checkpoint(env: Env, manager: Address, deployed_assets: u128) {
        require_initialized(&env);
        require_manager(&env, &manager);
        write_deployed_assets(&env, deployed_assets);
        Self::publish_checkpoint(&env);
    }

    pub fn snapshot(env: Env) -> TrancheSnapshot {
        require_initialized(&env);
        TrancheSnapshot {
            total_assets: Self::total_assets(env.clone()),
            total_supply: total_shares(&env),
            virtual_token_balance: read_virtual_token_balance(&env),
            status: read_status(&env),
            end_date: read_end_date(&env),
        }
    }

    /// Cash held plus the value of deployed assets.
    pub fn total_assets(env: Env) -> u128 {
        read_virtual_token_balance(&env)
            .checked_add(read_deployed_assets(&env))
            .expect("total assets overflow")
    }

    pub fn virtual_token_balance(env: Env) -> u128 {
        read_virtual_token_balance(&env)
    }

    pub fn convert_to_shares(env: Env, assets: u128) -> u128 {
        shares_for_assets(assets, Self::total_assets(env.clone()), total_shares(&env))
    }

    pub fn convert_to_assets(env: Env, shares: u128) -> u128 {
        assets_for_shares(shares, Self::total_assets(env.clone()), total_shares(&env))
    }

    pub fn preview_withdraw(env: Env, assets: u128) -> u128 {
        shares_for_assets_ceil(assets, Self::total_assets(env.clone()), total_shares(&env))
    }

    pub fn status(env: Env) -> PortfolioStatus {
        read_status(&env)
    }

    pub fn end_date(env: Env) -> u64 {
        read_end_date(&env)
    }

    pub fn manager(env: Env) -> Address {
        read_manager(&env)
    }

    pub fn underlying(env: Env) -> Address {
        ensure_initialized(&env)
    }

    pub fn withdraw_controller(env: Env) -> Option<Address> {
        read_withdraw_controller(&env)
    }

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }

    pub fn total_supply(env: Env) -> i128 {
        TokenBase::total_supply(&env)
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        TokenBase::balance(&env, &id)
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        if amount <= 0 {
            panic!("bad amount");
        }
        TokenBase::transfer(&env, &from, &to, amount);
    }
}

impl TrancheVault {
    fn controller_client(env: &Env) -> WithdrawControllerClient<'_> {
        let controller = read_withdraw_controller(env).expect("withdraw controller not set");
        WithdrawControllerClient::new(env, &controller)
    }

    fn publish_checkpoint(env: &Env) {
        CheckpointUpdated {
            virtual_token_balance: read_virtual_token_balance(env),
            deployed_assets: read_deployed_assets(env),
        }
        .publish(env);
    }
}
