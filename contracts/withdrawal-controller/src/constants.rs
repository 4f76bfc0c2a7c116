/// Basis-point denominator for fees and share prices (10_000 = 100% / 1.0).
pub const BPS_DENOMINATOR: u128 = 10_000;
pub const TTL_THRESHOLD: u32 = 100_000;
pub const TTL_EXTEND_TO: u32 = 200_000;
