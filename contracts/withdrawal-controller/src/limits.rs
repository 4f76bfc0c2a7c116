//! Self-service withdrawal limits. Same share math as the vault: floor
//! rounding, identity pricing on an empty tranche.

use crate::errors::Error;
use crate::storage::{ControllerConfig, PortfolioStatus, TrancheSnapshot};

pub fn convert_to_assets(snapshot: &TrancheSnapshot, shares: u128) -> Result<u128, Error> {
    if snapshot.total_supply == 0 {
        return Ok(shares);
    }
    shares
        .checked_mul(snapshot.total_assets)
        .map(|scaled| scaled / snapshot.total_supply)
        .ok_or(Error::MathOverflow)
}

pub fn convert_to_shares(snapshot: &TrancheSnapshot, assets: u128) -> Result<u128, Error> {
    if snapshot.total_supply == 0 || snapshot.total_assets == 0 {
        return Ok(assets);
    }
    assets
        .checked_mul(snapshot.total_supply)
        .map(|scaled| scaled / snapshot.total_assets)
        .ok_or(Error::MathOverflow)
}

/// Shares burned for a withdrawal of `assets`, rounded up.
pub fn preview_withdraw(snapshot: &TrancheSnapshot, assets: u128) -> Result<u128, Error> {
    if snapshot.total_supply == 0 || snapshot.total_assets == 0 {
        return Ok(assets);
    }
    assets
        .checked_mul(snapshot.total_supply)
        .map(|scaled| scaled.div_ceil(snapshot.total_assets))
        .ok_or(Error::MathOverflow)
}

/// Assets the tranche can release to self-service right now. Cash on hand
/// always caps it; the floor only applies until the portfolio closes.
pub fn asset_cap(config: &ControllerConfig, snapshot: &TrancheSnapshot) -> u128 {
    if snapshot.status == PortfolioStatus::Closed {
        return snapshot.virtual_token_balance;
    }
    snapshot
        .virtual_token_balance
        .min(snapshot.total_assets.saturating_sub(config.floor))
}

pub fn max_withdraw(
    config: &ControllerConfig,
    snapshot: &TrancheSnapshot,
    owner_shares: u128,
) -> Result<u128, Error> {
    if !config.withdraw_allowed.get(snapshot.status) {
        return Ok(0);
    }
    Ok(convert_to_assets(snapshot, owner_shares)?.min(asset_cap(config, snapshot)))
}

pub fn max_redeem(
    config: &ControllerConfig,
    snapshot: &TrancheSnapshot,
    owner_shares: u128,
) -> Result<u128, Error> {
    if !config.withdraw_allowed.get(snapshot.status) {
        return Ok(0);
    }
    Ok(owner_shares.min(convert_to_shares(snapshot, asset_cap(config, snapshot))?))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::WithdrawAllowed;

    fn snapshot(total_assets: u128, total_supply: u128, cash: u128, status: PortfolioStatus) -> TrancheSnapshot {
        TrancheSnapshot {
            total_assets,
            total_supply,
            virtual_token_balance: cash,
            status,
            end_date: 0,
        }
    }

    fn config(floor: u128, live: bool) -> ControllerConfig {
        let mut withdraw_allowed = WithdrawAllowed::default();
        withdraw_allowed.set(PortfolioStatus::Live, live);
        ControllerConfig {
            floor,
            withdraw_allowed,
        }
    }

    #[test]
    fn floor_limits_live_withdrawals() {
        let s = snapshot(100, 100, 100, PortfolioStatus::Live);
        assert_eq!(max_withdraw(&config(30, true), &s, 100), Ok(70));
        assert_eq!(max_redeem(&config(30, true), &s, 100), Ok(70));
        assert_eq!(max_withdraw(&config(30, true), &s, 50), Ok(50));
    }

    #[test]
    fn disabled_status_gives_zero() {
        let s = snapshot(100, 100, 100, PortfolioStatus::Live);
        assert_eq!(max_withdraw(&config(0, false), &s, 100), Ok(0));
        assert_eq!(max_redeem(&config(0, false), &s, 100), Ok(0));
    }

    #[test]
    fn closed_ignores_floor() {
        let s = snapshot(100, 100, 100, PortfolioStatus::Closed);
        assert_eq!(max_withdraw(&config(30, false), &s, 100), Ok(100));
        assert_eq!(max_redeem(&config(30, false), &s, 100), Ok(100));
    }

    #[test]
    fn cash_caps_withdrawals() {
        // 80 of 100 lent out
        let s = snapshot(100, 100, 20, PortfolioStatus::Live);
        assert_eq!(max_withdraw(&config(0, true), &s, 100), Ok(20));
        assert_eq!(max_redeem(&config(0, true), &s, 100), Ok(20));
    }

    #[test]
    fn conversions_follow_share_price() {
        let s = snapshot(125, 100, 125, PortfolioStatus::Live);
        assert_eq!(convert_to_shares(&s, 25), Ok(20));
        assert_eq!(convert_to_assets(&s, 80), Ok(100));
        assert_eq!(preview_withdraw(&s, 1), Ok(1));
        assert_eq!(convert_to_shares(&s, 1), Ok(0));
    }
}
