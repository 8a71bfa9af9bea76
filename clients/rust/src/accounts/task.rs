use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::accounts::{decode_record, encode_record};
use crate::errors::Result;
use crate::types::TaskStatus;

pub const TASK_DISCRIMINATOR: [u8; 8] = [79, 34, 229, 55, 88, 90, 55, 84];

/// Byte offset of `owner` inside a task record: discriminator then `task_id`.
pub const TASK_OWNER_OFFSET: usize = 8 + 8;

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub task_id: u64,
    pub owner: Pubkey,
    pub description: String,
    pub stake_amount: u64,
    pub expires_at: i64,
    pub status: TaskStatus,
    pub task_bump: u8,
    pub vault_bump: u8,
}

impl Task {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        decode_record(data, &TASK_DISCRIMINATOR, "Task")
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode_record(self, &TASK_DISCRIMINATOR)
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}

/// A decoded task together with the address it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskAccount {
    pub address: Pubkey,
    pub task: Task,
}

pub fn decode_task(data: &[u8]) -> Result<Task> {
    Task::from_bytes(data)
}
