use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::constants::{CHARITY_WALLET, PROGRAM_ID, SYSTEM_PROGRAM_ID, SYSVAR_CLOCK_ID};
use crate::errors::{DisciplineError, Result};
use crate::instructions::{decode_instruction, encode_instruction};
use crate::pda::{
    find_global_state_pda_with_program, find_task_pda_with_program, find_vault_pda_with_program,
};

pub const RESOLVE_TASK_DISCRIMINATOR: [u8; 8] = [116, 245, 180, 251, 30, 233, 101, 33];

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ResolveTaskInstructionArgs {
    pub task_id: u64,
    pub completed: bool,
}

impl ResolveTaskInstructionArgs {
    pub fn data(&self) -> Vec<u8> {
        encode_instruction(&RESOLVE_TASK_DISCRIMINATOR, self)
    }

    pub fn from_data(data: &[u8]) -> Result<Self> {
        decode_instruction(data, &RESOLVE_TASK_DISCRIMINATOR, "resolve_task instruction")
    }
}

/// Builds a `resolve_task` instruction.
///
/// ### Accounts:
///
///   0. `[writable, signer]` owner
///   1. `[writable]` task
///   2. `[writable]` vault
///   3. `[writable]` charity
///   4. `[writable]` global_state
///   5. `[]` system_program
///   6. `[]` clock
#[derive(Clone, Debug, Default)]
pub struct ResolveTaskBuilder {
    program_id: Option<Pubkey>,
    owner: Option<Pubkey>,
    task: Option<Pubkey>,
    vault: Option<Pubkey>,
    charity: Option<Pubkey>,
    global_state: Option<Pubkey>,
    task_id: Option<u64>,
    completed: Option<bool>,
}

impl ResolveTaskBuilder {
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

    /// `[optional account, default to CHARITY_WALLET]`
    #[inline(always)]
    pub fn charity(&mut self, charity: Pubkey) -> &mut Self {
        self.charity = Some(charity);
        self
    }

    #[inline(always)]
    pub fn global_state(&mut self, global_state: Pubkey) -> &mut Self {
        self.global_state = Some(global_state);
        self
    }

    #[inline(always)]
    pub fn task_id(&mut self, task_id: u64) -> &mut Self {
        self.task_id = Some(task_id);
        self
    }

    #[inline(always)]
    pub fn completed(&mut self, completed: bool) -> &mut Self {
        self.completed = Some(completed);
        self
    }

    pub fn instruction(&self) -> Result<Instruction> {
        let program_id = self.program_id.unwrap_or(PROGRAM_ID);
        let owner = self.owner.ok_or(DisciplineError::MissingField("owner"))?;
        let task_id = self.task_id.ok_or(DisciplineError::MissingField("task_id"))?;
        let completed = self
            .completed
            .ok_or(DisciplineError::MissingField("completed"))?;

        let task = match self.task {
            Some(task) => task,
            None => find_task_pda_with_program(&owner, task_id, &program_id)?.0,
        };
        let vault = match self.vault {
            Some(vault) => vault,
            None => find_vault_pda_with_program(&task, &program_id)?.0,
        };
        let global_state = match self.global_state {
            Some(global_state) => global_state,
            None => find_global_state_pda_with_program(&program_id)?.0,
        };

        Ok(Instruction {
            program_id,
            accounts: vec![
                AccountMeta::new(owner, true),
                AccountMeta::new(task, false),
                AccountMeta::new(vault, false),
                AccountMeta::new(self.charity.unwrap_or(CHARITY_WALLET), false),
                AccountMeta::new(global_state, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                AccountMeta::new_readonly(SYSVAR_CLOCK_ID, false),
            ],
            data: ResolveTaskInstructionArgs { task_id, completed }.data(),
        })
    }
}
