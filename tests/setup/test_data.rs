use discipline_client::constants::LAMPORTS_PER_SOL;

// 2024-06-10T06:13:20Z
pub const START_TIME: i64 = 1_718_000_000;
pub const INITIAL_BALANCE: u64 = 10 * LAMPORTS_PER_SOL;

// Task test data
pub const DEFAULT_DESCRIPTION: &str = "Read 10 pages";
pub const DEFAULT_DURATION: i64 = 3600;
pub const DEFAULT_STAKE: u64 = 100_000_000; // 0.1 SOL

pub const RECONCILE_INTERVAL_MS: u64 = 10;
