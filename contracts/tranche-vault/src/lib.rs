#![no_std]

mod constants;
mod contract;
mod events;
mod helpers;
mod storage;

pub use contract::{TrancheVault, TrancheVaultClient};
pub use storage::{PortfolioStatus, TrancheSnapshot};
