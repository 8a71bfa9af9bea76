use std::fmt;

use num_traits::FromPrimitive;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::ports::TransportError;
use crate::types::TaskStatus;

pub type Result<T> = std::result::Result<T, DisciplineError>;

/// How far a submission got before it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionStage {
    /// Signing or broadcasting failed; nothing reached the cluster.
    Send,
    /// The transaction was sent but its status could not be confirmed.
    Confirm,
    /// The transaction landed and the program rejected it.
    Rejected,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => f.write_str("send"),
            Self::Confirm => f.write_str("confirm"),
            Self::Rejected => f.write_str("execution"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DisciplineError {
    #[error("no off-curve program address for {seeds} seed(s)")]
    Derivation { seeds: usize },

    #[error("malformed {record} record: {reason}")]
    MalformedRecord { record: &'static str, reason: String },

    #[error("task {task_id} expires at {expires_at}, current time is {now}")]
    NotYetExpired {
        task_id: u64,
        expires_at: i64,
        now: i64,
    },

    #[error("task {task_id} is already {status}")]
    AlreadyResolved { task_id: u64, status: TaskStatus },

    #[error("submission failed during {stage}: {reason}")]
    SubmissionFailed {
        stage: SubmissionStage,
        signature: Option<Signature>,
        reason: String,
        program_error: Option<ProgramErrorCode>,
    },

    #[error("account {0} not found")]
    NotFound(Pubkey),

    #[error("task description must not be empty")]
    InvalidDescription,

    #[error("task description is {len} bytes, at most {max} fit in one instruction")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("task duration must be at least one second, got {0}")]
    InvalidDuration(i64),

    #[error("stake amount must be greater than zero")]
    InvalidStake,

    #[error("task {task_id} belongs to {owner}")]
    NotOwner { task_id: u64, owner: Pubkey },

    #[error("a transaction for task {0} is already in flight")]
    OperationInFlight(u64),

    #[error("task id {0} is already used by this owner")]
    TaskIdCollision(u64),

    #[error("instruction builder is missing `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DisciplineError {
    pub(crate) fn malformed(record: &'static str, reason: impl fmt::Display) -> Self {
        Self::MalformedRecord {
            record,
            reason: reason.to_string(),
        }
    }

    /// True when the cluster refused a create because the derived task account
    /// already exists, which is what a reused task id looks like on-chain.
    pub fn is_address_in_use(&self) -> bool {
        match self {
            Self::TaskIdCollision(_) => true,
            Self::SubmissionFailed { program_error, .. } => {
                *program_error == Some(ProgramErrorCode::AccountAlreadyInUse)
            }
            _ => false,
        }
    }
}

/// Well-known error codes a rejected transaction reports for this program's
/// instructions. Code 0 is raised by the system program while allocating an
/// account; the rest are Anchor framework constraint codes.
#[derive(Clone, Copy, Debug, Eq, Error, num_derive::FromPrimitive, PartialEq)]
pub enum ProgramErrorCode {
    /// 0 - Address already in use
    #[error("Address already in use")]
    AccountAlreadyInUse = 0x0,
    /// 102 - Instruction did not deserialize
    #[error("Instruction did not deserialize")]
    InstructionDidNotDeserialize = 0x66,
    /// 2001 - A has one constraint was violated
    #[error("A has one constraint was violated")]
    ConstraintHasOne = 0x7d1,
    /// 2006 - A seeds constraint was violated
    #[error("A seeds constraint was violated")]
    ConstraintSeeds = 0x7d6,
    /// 2012 - An address constraint was violated
    #[error("An address constraint was violated")]
    ConstraintAddress = 0x7dc,
    /// 3002 - Account discriminator did not match
    #[error("Account discriminator did not match")]
    AccountDiscriminatorMismatch = 0xbba,
    /// 3012 - The program expected this account to be already initialized
    #[error("The program expected this account to be already initialized")]
    AccountNotInitialized = 0xbc4,
}

impl ProgramErrorCode {
    /// Extracts the custom error code from a node's failure text, accepting
    /// both the log form (`custom program error: 0x0`) and the JSON status
    /// form (`{"InstructionError":[0,{"Custom":0}]}`).
    pub fn from_reason(reason: &str) -> Option<Self> {
        const LOG_MARKER: &str = "custom program error: 0x";
        const JSON_MARKER: &str = "\"Custom\":";

        let code = if let Some(start) = reason.find(LOG_MARKER) {
            let digits: String = reason[start + LOG_MARKER.len()..]
                .chars()
                .take_while(char::is_ascii_hexdigit)
                .collect();
            u32::from_str_radix(&digits, 16).ok()?
        } else if let Some(start) = reason.find(JSON_MARKER) {
            let digits: String = reason[start + JSON_MARKER.len()..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()?
        } else {
            return None;
        };

        Self::from_u32(code)
    }
}
