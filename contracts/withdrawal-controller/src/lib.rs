#![no_std]

#[cfg(test)]
extern crate std;

mod constants;
mod contract;
mod errors;
mod events;
mod limits;
mod settlement;
mod storage;

pub use contract::{MultiWithdrawalController, MultiWithdrawalControllerClient};
pub use errors::Error;
pub use storage::{
    AmountConvention, ControllerConfig, PortfolioStatus, Settlement, TrancheSnapshot,
    WithdrawAllowed, WithdrawAllowedChange, WithdrawType, WithdrawalException,
};
