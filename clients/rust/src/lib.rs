//! Client for the discipline staking program.
//!
//! Derives the program's accounts, encodes its instructions, decodes its
//! account records and drives the pending -> completed/failed lifecycle of a
//! staked task through injected transport ports.

pub mod accounts;
pub mod config;
pub mod constants;
pub mod errors;
pub mod instructions;
pub mod lifecycle;
pub mod pda;
pub mod ports;
pub mod reconciler;
pub mod repository;
pub mod rpc;
pub mod types;
pub mod view;

pub use accounts::{decode_global_state, decode_task, GlobalState, Task, TaskAccount};
pub use config::{ClientConfig, ConfigError};
pub use errors::{DisciplineError, ProgramErrorCode, Result, SubmissionStage};
pub use instructions::{encode_create_task, encode_resolve_task, CreateTaskBuilder, ResolveTaskBuilder};
pub use lifecycle::{CreateTaskRequest, CreatedTask, ResolvedTask, TaskLifecycle, TaskSnapshot};
pub use pda::{find_global_state_pda, find_task_pda, find_vault_pda};
pub use ports::{AccountStore, Commitment, Confirmation, TransactionSender, WalletIdentity};
pub use repository::TaskRepository;
pub use types::TaskStatus;
pub use view::TaskView;
