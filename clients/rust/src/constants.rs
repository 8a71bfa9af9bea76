use solana_sdk::pubkey::Pubkey;

pub const PROGRAM_ID: Pubkey = Pubkey::from_str_const("8d8w7DMGf8G41nmg2qnDGDqL6d4hGABNPHLpTnTUfoqn");

/// Receives the stake of every failed task. The program rejects any other account.
pub const CHARITY_WALLET: Pubkey =
    Pubkey::from_str_const("3rzenMHF1M27EAK7moeTgLdKepu1pXWvFs9jTWpAeCCb");

pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::from_str_const("11111111111111111111111111111111");
pub const SYSVAR_CLOCK_ID: Pubkey =
    Pubkey::from_str_const("SysvarC1ock11111111111111111111111111111111");

pub const TASK_SEED: &[u8] = b"task";
pub const VAULT_SEED: &[u8] = b"vault";
pub const GLOBAL_STATE_SEED: &[u8] = b"state";

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Largest serialized legacy transaction accepted by the cluster.
pub const PACKET_DATA_SIZE: usize = 1232;

// One signature, header, six account keys, blockhash and the single
// create_task instruction header (program index, five account indexes,
// two-byte data length).
const CREATE_TASK_TX_OVERHEAD: usize = (1 + 64) + 3 + (1 + 6 * 32) + 32 + 1 + 1 + (1 + 5) + 2;

pub const MAX_INSTRUCTION_DATA_LEN: usize = PACKET_DATA_SIZE - CREATE_TASK_TX_OVERHEAD;

// discriminator, task_id, description length prefix, duration, stake_amount
const CREATE_TASK_FIXED_LEN: usize = 8 + 8 + 4 + 8 + 8;

pub const MAX_DESCRIPTION_LEN: usize = MAX_INSTRUCTION_DATA_LEN - CREATE_TASK_FIXED_LEN;
