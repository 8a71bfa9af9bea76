use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::constants::{MAX_DESCRIPTION_LEN, PROGRAM_ID, SYSTEM_PROGRAM_ID, SYSVAR_CLOCK_ID};
use crate::errors::{DisciplineError, Result};
use crate::instructions::{decode_instruction, encode_instruction};
use crate::pda::{find_task_pda_with_program, find_vault_pda_with_program};

pub const CREATE_TASK_DISCRIMINATOR: [u8; 8] = [194, 80, 6, 180, 232, 127, 48, 171];

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateTaskInstructionArgs {
    pub task_id: u64,
    pub description: String,
    /// Seconds until expiry, counted from the slot the task is created in.
    pub duration: i64,
    pub stake_amount: u64,
}

impl CreateTaskInstructionArgs {
    pub fn data(&self) -> Result<Vec<u8>> {
        let len = self.description.len();
        if len > MAX_DESCRIPTION_LEN {
            return Err(DisciplineError::DescriptionTooLong {
                len,
                max: MAX_DESCRIPTION_LEN,
            });
        }

        Ok(encode_instruction(&CREATE_TASK_DISCRIMINATOR, self))
    }

    pub fn from_data(data: &[u8]) -> Result<Self> {
        decode_instruction(data, &CREATE_TASK_DISCRIMINATOR, "create_task instruction")
    }
}

/// Builds a `create_task` instruction.
///
/// ### Accounts:
///
///   0. `[writable, signer]` owner
///   1. `[writable]` task
///   2. `[writable]` vault
///   3. `[]` system_program
///   4. `[]` clock
///
/// `task` and `vault` are derived from the owner and task id when not set.
#[derive(Clone, Debug, Default)]
pub struct CreateTaskBuilder {
    program_id: Option<Pubkey>,
    owner: Option<Pubkey>,
    task: Option<Pubkey>,
    vault: Option<Pubkey>,
    task_id: Option<u64>,
    description: Option<String>,
    duration: Option<i64>,
    stake_amount: Option<u64>,
}

impl CreateTaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn program_id(&mut self, program_id: Pubkey) -> &mut Self {
        self.program_id = Some(program_id);
        self
    }

    #[inline(always)]
    pub fn owner(&mut self, owner: Pubkey) -> &mut Self {
        self.owner = Some(owner);
        self
    }

    #[inline(always)]
    pub fn task(&mut self, task: Pubkey) -> &mut Self {
        self.task = Some(task);
        self
    }

    #[inline(always)]
    pub fn vault(&mut self, vault: Pubkey) -> &mut Self {
        self.vault = Some(vault);
        self
    }

    #[inline(always)]
    pub fn task_id(&mut self, task_id: u64) -> &mut Self {
        self.task_id = Some(task_id);
        self
    }

    #[inline(always)]
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    #[inline(always)]
    pub fn duration(&mut self, duration: i64) -> &mut Self {
        self.duration = Some(duration);
        self
    }

    #[inline(always)]
    pub fn stake_amount(&mut self, stake_amount: u64) -> &mut Self {
        self.stake_amount = Some(stake_amount);
        self
    }

    pub fn instruction(&self) -> Result<Instruction> {
        let program_id = self.program_id.unwrap_or(PROGRAM_ID);
        let owner = self.owner.ok_or(DisciplineError::MissingField("owner"))?;
        let task_id = self.task_id.ok_or(DisciplineError::MissingField("task_id"))?;

        let task = match self.task {
            Some(task) => task,
            None => find_task_pda_with_program(&owner, task_id, &program_id)?.0,
        };
        let vault = match self.vault {
            Some(vault) => vault,
            None => find_vault_pda_with_program(&task, &program_id)?.0,
        };

        let args = CreateTaskInstructionArgs {
            task_id,
            description: self
                .description
                .clone()
                .ok_or(DisciplineError::MissingField("description"))?,
            duration: self.duration.ok_or(DisciplineError::MissingField("duration"))?,
            stake_amount: self
                .stake_amount
                .ok_or(DisciplineError::MissingField("stake_amount"))?,
        };

        Ok(Instruction {
            program_id,
            accounts: vec![
                AccountMeta::new(owner, true),
                AccountMeta::new(task, false),
                AccountMeta::new(vault, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                AccountMeta::new_readonly(SYSVAR_CLOCK_ID, false),
            ],
            data: args.data()?,
        })
    }
}
