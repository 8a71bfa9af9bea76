use borsh::{BorshDeserialize, BorshSerialize};

use crate::accounts::{decode_record, encode_record};
use crate::errors::Result;

pub const GLOBAL_STATE_DISCRIMINATOR: [u8; 8] = [163, 46, 74, 168, 216, 123, 133, 98];

/// Program-wide totals. `total_donated` only ever grows.
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobalState {
    pub total_donated: u64,
}

impl GlobalState {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        decode_record(data, &GLOBAL_STATE_DISCRIMINATOR, "GlobalState")
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode_record(self, &GLOBAL_STATE_DISCRIMINATOR)
    }
}

pub fn decode_global_state(data: &[u8]) -> Result<GlobalState> {
    GlobalState::from_bytes(data)
}
