use soroban_sdk::{contractevent, Address};

use crate::storage::PortfolioStatus;

/// Emitted on deposit when tranche shares are minted.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    #[topic]
    pub lender: Address,
    pub assets: u128,
    pub shares: u128,
}

/// Self-service withdrawal by asset amount.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdraw {
    #[topic]
    pub owner: Address,
    pub assets: u128,
    pub shares: u128,
}

/// Self-service redemption by share amount.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redeem {
    #[topic]
    pub owner: Address,
    pub assets: u128,
    pub shares: u128,
}

/// Settlement pushed by the withdraw controller outside the self-service flow.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SharesBurned {
    #[topic]
    pub lender: Address,
    #[topic]
    pub controller: Address,
    pub shares: u128,
    pub assets: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusChanged {
    pub status: PortfolioStatus,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckpointUpdated {
    pub virtual_token_balance: u128,
    pub deployed_assets: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewWithdrawController {
    #[topic]
    pub controller: Address,
}
