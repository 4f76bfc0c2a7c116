use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    Unauthorized = 1,
    EmptyBatch = 2,
    ZeroAmount = 3,
    RedemptionsCurrentlyEnabled = 4,
    BelowFloor = 5,
    InsufficientShares = 6,
    AlreadyInitialized = 7,
    NotInitialized = 8,
    WrongTranche = 9,
    InvalidFee = 10,
    InsufficientLiquidity = 11,
    MathOverflow = 12,
    Reentrant = 13,
    WithdrawalsNotAllowed = 14,
    RedemptionsNotAllowed = 15,
    ExceedsMaxWithdraw = 16,
    ExceedsMaxRedeem = 17,
}
