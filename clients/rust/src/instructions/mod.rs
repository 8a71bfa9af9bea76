pub mod create_task;
pub mod resolve_task;

pub use create_task::*;
pub use resolve_task::*;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::errors::{DisciplineError, Result};

/// Encodes `create_task` instruction data.
///
/// Fails with [`DisciplineError::DescriptionTooLong`] rather than truncating
/// when the description would push the payload past the transaction size.
pub fn encode_create_task(
    task_id: u64,
    description: &str,
    duration: i64,
    stake_amount: u64,
) -> Result<Vec<u8>> {
    CreateTaskInstructionArgs {
        task_id,
        description: description.to_string(),
        duration,
        stake_amount,
    }
    .data()
}

pub fn encode_resolve_task(task_id: u64, completed: bool) -> Vec<u8> {
    ResolveTaskInstructionArgs { task_id, completed }.data()
}

fn encode_instruction<T: BorshSerialize>(discriminator: &[u8; 8], args: &T) -> Vec<u8> {
    let mut data = discriminator.to_vec();
    // Writing into a Vec cannot fail.
    let _ = args.serialize(&mut data);
    data
}

/// Instruction payloads are exact: a wrong discriminator, a short buffer or
/// bytes left over after the last argument are all rejected.
fn decode_instruction<T: BorshDeserialize>(
    data: &[u8],
    discriminator: &[u8; 8],
    record: &'static str,
) -> Result<T> {
    match data.split_at_checked(discriminator.len()) {
        Some((head, body)) if head == discriminator => {
            borsh::from_slice(body).map_err(|e| DisciplineError::malformed(record, e))
        }
        Some((head, _)) => Err(DisciplineError::malformed(
            record,
            format!("discriminator {head:?} does not match {discriminator:?}"),
        )),
        None => Err(DisciplineError::malformed(
            record,
            format!("{} bytes is shorter than the discriminator", data.len()),
        )),
    }
}
