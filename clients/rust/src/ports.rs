//! Collaborators the client talks to but does not implement: the program
//! account store, transaction submission and the wallet identity.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("rpc request failed: {0}")]
    Request(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected rpc response: {0}")]
    Response(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),
}

/// Cluster commitment levels, weakest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(format!("unknown commitment level `{other}`")),
        }
    }
}

/// Server-side account filter, evaluated against raw account data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountFilter {
    Memcmp { offset: usize, bytes: Vec<u8> },
    DataSize(u64),
}

impl AccountFilter {
    pub fn memcmp(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Memcmp {
            offset,
            bytes: bytes.into(),
        }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::Memcmp { offset, bytes } => offset
                .checked_add(bytes.len())
                .and_then(|end| data.get(*offset..end))
                .is_some_and(|window| window == bytes.as_slice()),
            Self::DataSize(size) => data.len() as u64 == *size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedAccount {
    pub address: Pubkey,
    pub data: Vec<u8>,
}

/// Outcome of waiting for a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Landed,
    Rejected { reason: String },
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns every account owned by `program_id` whose data passes all `filters`.
    /// No ordering is guaranteed.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> TransportResult<Vec<KeyedAccount>>;

    /// Raw account data, or `None` when the account does not exist.
    async fn get_account(&self, address: &Pubkey) -> TransportResult<Option<Vec<u8>>>;

    async fn get_balance(&self, address: &Pubkey) -> TransportResult<u64>;
}

#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Signs a transaction carrying `instruction` and broadcasts it.
    async fn sign_and_send(&self, instruction: Instruction) -> TransportResult<Signature>;

    /// Waits until `signature` reaches `commitment` or fails.
    async fn confirm(
        &self,
        signature: &Signature,
        commitment: Commitment,
    ) -> TransportResult<Confirmation>;
}

pub trait WalletIdentity: Send + Sync {
    fn pubkey(&self) -> Pubkey;
}
