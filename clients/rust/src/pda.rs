use solana_sdk::pubkey::Pubkey;
use tracing::trace;

use crate::constants::{GLOBAL_STATE_SEED, PROGRAM_ID, TASK_SEED, VAULT_SEED};
use crate::errors::{DisciplineError, Result};

/// Searches bumps from 255 down to 0 and returns the first off-curve address
/// for `seeds` under `program_id`, together with the bump that produced it.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut candidate = seeds.to_vec();
        candidate.push(&bump_seed);

        if let Ok(address) = Pubkey::create_program_address(&candidate, program_id) {
            trace!(%address, bump, "derived program address");
            return Ok((address, bump));
        }
    }

    Err(DisciplineError::Derivation { seeds: seeds.len() })
}

pub fn find_task_pda(owner: &Pubkey, task_id: u64) -> Result<(Pubkey, u8)> {
    find_task_pda_with_program(owner, task_id, &PROGRAM_ID)
}

pub fn find_task_pda_with_program(
    owner: &Pubkey,
    task_id: u64,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8)> {
    let seeds: &[&[u8]] = &[TASK_SEED, owner.as_ref(), &task_id.to_le_bytes()];
    find_program_address(seeds, program_id)
}

pub fn find_vault_pda(task: &Pubkey) -> Result<(Pubkey, u8)> {
    find_vault_pda_with_program(task, &PROGRAM_ID)
}

pub fn find_vault_pda_with_program(task: &Pubkey, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    find_program_address(&[VAULT_SEED, task.as_ref()], program_id)
}

pub fn find_global_state_pda() -> Result<(Pubkey, u8)> {
    find_global_state_pda_with_program(&PROGRAM_ID)
}

pub fn find_global_state_pda_with_program(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    find_program_address(&[GLOBAL_STATE_SEED], program_id)
}
