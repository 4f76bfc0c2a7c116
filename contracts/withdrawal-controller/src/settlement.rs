//! Pure planning of an exception batch. Nothing here touches storage or
//! moves tokens; the contract commits a plan only after every check passes.

use soroban_sdk::{Address, Env, Map, Vec};

use crate::constants::BPS_DENOMINATOR;
use crate::errors::Error;
use crate::storage::{AmountConvention, Settlement, WithdrawalException};

pub struct BatchPlan {
    pub settlements: Vec<Settlement>,
    pub total_net: u128,
}

/// Gross asset amount of one exception under the deployment's convention.
pub fn resolve_asset_amount(
    convention: AmountConvention,
    amount: u128,
    share_amount: u128,
) -> Result<u128, Error> {
    match convention {
        AmountConvention::DirectAmount => Ok(amount),
        AmountConvention::SharePrice => share_amount
            .checked_mul(amount)
            .map(|gross| gross / BPS_DENOMINATOR)
            .ok_or(Error::MathOverflow),
    }
}

/// floor(asset_amount * fee / 10_000). Fees of 100% or more are rejected.
pub fn fee_amount(asset_amount: u128, fee: u32) -> Result<u128, Error> {
    if u128::from(fee) >= BPS_DENOMINATOR {
        return Err(Error::InvalidFee);
    }
    asset_amount
        .checked_mul(u128::from(fee))
        .map(|scaled| scaled / BPS_DENOMINATOR)
        .ok_or(Error::MathOverflow)
}

pub fn plan_exception(
    convention: AmountConvention,
    exception: &WithdrawalException,
) -> Result<Settlement, Error> {
    if exception.amount == 0 || exception.share_amount == 0 {
        return Err(Error::ZeroAmount);
    }
    let asset_amount =
        resolve_asset_amount(convention, exception.amount, exception.share_amount)?;
    if asset_amount == 0 {
        return Err(Error::ZeroAmount);
    }
    let fee_amount = fee_amount(asset_amount, exception.fee)?;

    Ok(Settlement {
        lender: exception.lender.clone(),
        withdraw_type: exception.withdraw_type,
        asset_amount,
        net_asset_amount: asset_amount - fee_amount,
        share_amount: exception.share_amount,
        fee_amount,
    })
}

/// Plans every exception in order. A lender listed more than once must hold
/// enough shares for all of their records together. `share_balance` is
/// queried once per distinct lender.
pub fn plan_batch<F>(
    env: &Env,
    convention: AmountConvention,
    exceptions: &Vec<WithdrawalException>,
    mut share_balance: F,
) -> Result<BatchPlan, Error>
where
    F: FnMut(&Address) -> u128,
{
    let mut settlements = Vec::new(env);
    let mut unclaimed: Map<Address, u128> = Map::new(env);
    let mut total_net: u128 = 0;

    for exception in exceptions.iter() {
        let settlement = plan_exception(convention, &exception)?;

        let available = match unclaimed.get(settlement.lender.clone()) {
            Some(left) => left,
            None => share_balance(&settlement.lender),
        };
        if settlement.share_amount > available {
            return Err(Error::InsufficientShares);
        }
        unclaimed.set(
            settlement.lender.clone(),
            available - settlement.share_amount,
        );

        total_net = total_net
            .checked_add(settlement.net_asset_amount)
            .ok_or(Error::MathOverflow)?;
        settlements.push_back(settlement);
    }

    Ok(BatchPlan {
        settlements,
        total_net,
    })
}

/// Tranche assets left once `total_net` is paid out. Fails when that would
/// leave less than `floor`; landing exactly on the floor is fine.
pub fn remaining_after(total_assets: u128, total_net: u128, floor: u128) -> Result<u128, Error> {
    match total_assets.checked_sub(total_net) {
        Some(remaining) if remaining >= floor => Ok(remaining),
        _ => Err(Error::BelowFloor),
    }
}
