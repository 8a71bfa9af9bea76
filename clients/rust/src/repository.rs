use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::accounts::{GlobalState, Task, TaskAccount, TASK_DISCRIMINATOR, TASK_OWNER_OFFSET};
use crate::constants::PROGRAM_ID;
use crate::errors::{DisciplineError, Result};
use crate::pda::{find_global_state_pda_with_program, find_task_pda_with_program};
use crate::ports::{AccountFilter, AccountStore};

/// Read-only access to the program's task and global state records.
pub struct TaskRepository<A: AccountStore> {
    store: Arc<A>,
    program_id: Pubkey,
}

impl<A: AccountStore> TaskRepository<A> {
    pub fn new(store: Arc<A>) -> Self {
        Self::with_program_id(store, PROGRAM_ID)
    }

    pub fn with_program_id(store: Arc<A>, program_id: Pubkey) -> Self {
        Self { store, program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Filters selecting task records owned by `owner`.
    pub fn owner_filters(owner: &Pubkey) -> Vec<AccountFilter> {
        vec![
            AccountFilter::memcmp(0, TASK_DISCRIMINATOR.to_vec()),
            AccountFilter::memcmp(TASK_OWNER_OFFSET, owner.to_bytes().to_vec()),
        ]
    }

    /// Every task owned by `owner`, sorted by task id.
    ///
    /// The store itself gives no ordering guarantee; the sort is only for
    /// stable presentation. A record that fails to decode fails the call.
    pub async fn list_tasks(&self, owner: &Pubkey) -> Result<Vec<TaskAccount>> {
        let accounts = self
            .store
            .get_program_accounts(&self.program_id, &Self::owner_filters(owner))
            .await?;

        let mut tasks = accounts
            .into_iter()
            .map(|account| {
                let task = Task::from_bytes(&account.data).map_err(|err| match err {
                    DisciplineError::MalformedRecord { record, reason } => {
                        DisciplineError::MalformedRecord {
                            record,
                            reason: format!("{}: {reason}", account.address),
                        }
                    }
                    other => other,
                })?;
                Ok(TaskAccount {
                    address: account.address,
                    task,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tasks.retain(|account| account.task.owner == *owner);
        tasks.sort_by_key(|account| account.task.task_id);

        debug!(%owner, count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    pub async fn fetch_task(&self, owner: &Pubkey, task_id: u64) -> Result<TaskAccount> {
        let (address, _) = find_task_pda_with_program(owner, task_id, &self.program_id)?;
        let data = self
            .store
            .get_account(&address)
            .await?
            .ok_or(DisciplineError::NotFound(address))?;

        Ok(TaskAccount {
            address,
            task: Task::from_bytes(&data)?,
        })
    }

    /// Whether an account already lives at the address `(owner, task_id)` derives to.
    pub async fn task_exists(&self, owner: &Pubkey, task_id: u64) -> Result<bool> {
        let (address, _) = find_task_pda_with_program(owner, task_id, &self.program_id)?;
        Ok(self.store.get_account(&address).await?.is_some())
    }

    /// Fails with [`DisciplineError::NotFound`] until the program has been initialized.
    pub async fn fetch_global_state(&self) -> Result<GlobalState> {
        let (address, _) = find_global_state_pda_with_program(&self.program_id)?;
        let data = self
            .store
            .get_account(&address)
            .await?
            .ok_or(DisciplineError::NotFound(address))?;

        GlobalState::from_bytes(&data)
    }

    pub async fn vault_balance(&self, vault: &Pubkey) -> Result<u64> {
        Ok(self.store.get_balance(vault).await?)
    }
}
