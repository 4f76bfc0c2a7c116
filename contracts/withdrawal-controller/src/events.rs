use soroban_sdk::{contractevent, Address};

use crate::storage::{PortfolioStatus, WithdrawType};

/// One settled withdrawal exception. `asset_amount` is the net paid out.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redeem {
    #[topic]
    pub lender: Address,
    #[topic]
    pub tranche: Address,
    pub withdraw_type: WithdrawType,
    pub asset_amount: u128,
    pub share_amount: u128,
    pub fee_amount: u128,
}

/// Summary emitted after every record of a batch has been settled.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchProcessed {
    #[topic]
    pub tranche: Address,
    pub records: u32,
    pub total_net: u128,
    pub remaining: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FloorChanged {
    pub floor: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawAllowedChanged {
    #[topic]
    pub status: PortfolioStatus,
    pub allowed: bool,
}
