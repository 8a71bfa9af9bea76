pub mod global_state;
pub mod task;

pub use global_state::*;
pub use task::*;

use borsh::BorshDeserialize;

use crate::errors::{DisciplineError, Result};

/// Checks the 8-byte account discriminator and decodes the fields after it.
/// Bytes past the last field are allowed: accounts are allocated at their
/// maximum size and the tail stays zeroed.
pub(crate) fn decode_record<T: BorshDeserialize>(
    data: &[u8],
    discriminator: &[u8; 8],
    record: &'static str,
) -> Result<T> {
    if data.len() < discriminator.len() {
        return Err(DisciplineError::malformed(
            record,
            format!("{} bytes is shorter than the discriminator", data.len()),
        ));
    }

    let (head, mut body) = data.split_at(discriminator.len());
    if head != discriminator {
        return Err(DisciplineError::malformed(
            record,
            format!("discriminator {head:?} does not match {discriminator:?}"),
        ));
    }

    T::deserialize(&mut body).map_err(|e| DisciplineError::malformed(record, e))
}

pub(crate) fn encode_record<T: borsh::BorshSerialize>(value: &T, discriminator: &[u8; 8]) -> Vec<u8> {
    let mut data = discriminator.to_vec();
    // Writing into a Vec cannot fail.
    let _ = value.serialize(&mut data);
    data
}
