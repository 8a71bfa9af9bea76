//! Task lifecycle: create, resolve and the reconciled task snapshot.
//!
//! A task moves `Pending -> Completed | Failed` exactly once. The checks made
//! here are an optimistic pre-flight; the program re-checks every guard
//! against its own clock and is the authority when the two disagree.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use mockable::Clock;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::accounts::{Task, TaskAccount};
use crate::config::ClientConfig;
use crate::constants::MAX_DESCRIPTION_LEN;
use crate::errors::{DisciplineError, ProgramErrorCode, Result, SubmissionStage};
use crate::instructions::{CreateTaskBuilder, ResolveTaskBuilder};
use crate::pda::{
    find_global_state_pda_with_program, find_task_pda_with_program, find_vault_pda_with_program,
};
use crate::ports::{AccountStore, Commitment, Confirmation, TransactionSender, WalletIdentity};
use crate::repository::TaskRepository;
use crate::types::TaskStatus;
use crate::view::TaskView;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub description: String,
    /// Seconds from creation until the task can be resolved.
    pub duration: i64,
    pub stake_amount: u64,
}

impl CreateTaskRequest {
    pub fn new(description: impl Into<String>, duration: i64, stake_amount: u64) -> Self {
        Self {
            description: description.into(),
            duration,
            stake_amount,
        }
    }

    /// Checks the creation guards and returns the trimmed description.
    pub fn validate(&self) -> Result<&str> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(DisciplineError::InvalidDescription);
        }
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(DisciplineError::DescriptionTooLong {
                len: description.len(),
                max: MAX_DESCRIPTION_LEN,
            });
        }
        if self.duration < 1 {
            return Err(DisciplineError::InvalidDuration(self.duration));
        }
        if self.stake_amount == 0 {
            return Err(DisciplineError::InvalidStake);
        }
        Ok(description)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedTask {
    pub task_id: u64,
    pub task_address: Pubkey,
    pub vault_address: Pubkey,
    pub signature: Signature,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTask {
    pub task_id: u64,
    pub status: TaskStatus,
    pub signature: Signature,
}

/// The task collection as last published. Replaced as a whole, never patched
/// from several writers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskSnapshot {
    pub tasks: Vec<TaskView>,
    /// `None` while the program's global state has not been created.
    pub total_donated: Option<u64>,
    /// Sequence number of the fetch this snapshot came from; 0 before the first.
    pub fetch_sequence: u64,
    pub fetched_at: Option<i64>,
}

impl TaskSnapshot {
    pub fn task(&self, task_id: u64) -> Option<&TaskView> {
        self.tasks.iter().find(|view| view.task.task_id == task_id)
    }

    pub fn has_predictions(&self) -> bool {
        self.tasks.iter().any(|view| view.predicted)
    }
}

/// Task ids are millisecond timestamps. Two creates inside the same
/// millisecond in one process get consecutive ids instead of colliding; a
/// collision across processes is caught by the address check before submit
/// and, failing that, by the program refusing to reuse the account.
#[derive(Debug, Default)]
pub struct TaskIdGenerator {
    last: AtomicU64,
}

impl TaskIdGenerator {
    pub fn next(&self, now_ms: u64) -> u64 {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_ms.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Resolution guard shared by the controller and presentation code.
pub fn check_resolvable(task: &Task, identity: &Pubkey, now: i64) -> Result<()> {
    if task.owner != *identity {
        return Err(DisciplineError::NotOwner {
            task_id: task.task_id,
            owner: task.owner,
        });
    }
    if task.status.is_terminal() {
        return Err(DisciplineError::AlreadyResolved {
            task_id: task.task_id,
            status: task.status,
        });
    }
    if now < task.expires_at {
        return Err(DisciplineError::NotYetExpired {
            task_id: task.task_id,
            expires_at: task.expires_at,
            now,
        });
    }
    Ok(())
}

struct InFlight<'a> {
    tasks: &'a Mutex<HashSet<u64>>,
    task_id: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.task_id);
    }
}

pub struct TaskLifecycle<A, S, C>
where
    A: AccountStore,
    S: TransactionSender + WalletIdentity,
    C: Clock + Send + Sync,
{
    repository: TaskRepository<A>,
    sender: Arc<S>,
    clock: Arc<C>,
    program_id: Pubkey,
    charity: Pubkey,
    commitment: Commitment,
    ids: TaskIdGenerator,
    in_flight: Mutex<HashSet<u64>>,
    fetch_sequence: AtomicU64,
    snapshot: watch::Sender<TaskSnapshot>,
}

impl<A, S, C> TaskLifecycle<A, S, C>
where
    A: AccountStore,
    S: TransactionSender + WalletIdentity,
    C: Clock + Send + Sync,
{
    pub fn new(store: Arc<A>, sender: Arc<S>, clock: Arc<C>, config: &ClientConfig) -> Self {
        let (snapshot, _) = watch::channel(TaskSnapshot::default());
        Self {
            repository: TaskRepository::with_program_id(store, config.program_id),
            sender,
            clock,
            program_id: config.program_id,
            charity: config.charity,
            commitment: config.commitment,
            ids: TaskIdGenerator::default(),
            in_flight: Mutex::new(HashSet::new()),
            fetch_sequence: AtomicU64::new(0),
            snapshot,
        }
    }

    pub fn owner(&self) -> Pubkey {
        self.sender.pubkey()
    }

    pub fn repository(&self) -> &TaskRepository<A> {
        &self.repository
    }

    /// Current time in Unix seconds.
    pub fn now(&self) -> i64 {
        self.clock.utc().timestamp()
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.snapshot.subscribe()
    }

    /// Escrows `stake_amount` lamports against a new pending task.
    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<CreatedTask> {
        let description = request.validate()?.to_string();
        let owner = self.owner();

        let now_ms = u64::try_from(self.clock.utc().timestamp_millis()).unwrap_or_default();
        let task_id = self.ids.next(now_ms);
        let _in_flight = self.begin(task_id)?;

        if self.repository.task_exists(&owner, task_id).await? {
            return Err(DisciplineError::TaskIdCollision(task_id));
        }

        let (task_address, task_bump) =
            find_task_pda_with_program(&owner, task_id, &self.program_id)?;
        let (vault_address, vault_bump) =
            find_vault_pda_with_program(&task_address, &self.program_id)?;

        let instruction = CreateTaskBuilder::new()
            .program_id(self.program_id)
            .owner(owner)
            .task(task_address)
            .vault(vault_address)
            .task_id(task_id)
            .description(description.clone())
            .duration(request.duration)
            .stake_amount(request.stake_amount)
            .instruction()?;

        let signature = self.submit(task_id, instruction).await?;
        info!(task_id, %task_address, stake = request.stake_amount, %signature, "task created");

        let now = self.now();
        let view = TaskView {
            address: task_address,
            task: Task {
                task_id,
                owner,
                description,
                stake_amount: request.stake_amount,
                expires_at: now + request.duration,
                status: TaskStatus::Pending,
                task_bump,
                vault_bump,
            },
            predicted: true,
            created_at: Some(now),
            duration: Some(request.duration),
        };
        self.snapshot.send_modify(|snapshot| {
            snapshot.tasks.retain(|existing| existing.task.task_id != task_id);
            snapshot.tasks.push(view);
        });

        Ok(CreatedTask {
            task_id,
            task_address,
            vault_address,
            signature,
        })
    }

    /// Resolves an expired pending task: `completed` returns the stake to the
    /// owner, otherwise it goes to the charity.
    pub async fn resolve_task(&self, task_id: u64, completed: bool) -> Result<ResolvedTask> {
        let owner = self.owner();
        let _in_flight = self.begin(task_id)?;

        let TaskAccount { address, task } = self.repository.fetch_task(&owner, task_id).await?;
        check_resolvable(&task, &owner, self.now())?;

        let (vault, _) = find_vault_pda_with_program(&address, &self.program_id)?;
        let (global_state, _) = find_global_state_pda_with_program(&self.program_id)?;

        let instruction = ResolveTaskBuilder::new()
            .program_id(self.program_id)
            .owner(owner)
            .task(address)
            .vault(vault)
            .charity(self.charity)
            .global_state(global_state)
            .task_id(task_id)
            .completed(completed)
            .instruction()?;

        let signature = self.submit(task_id, instruction).await?;
        let status = TaskStatus::from_outcome(completed);
        info!(task_id, %status, stake = task.stake_amount, %signature, "task resolved");

        // A fetch that already saw the resolution is authoritative and is left as is.
        self.snapshot.send_if_modified(|snapshot| {
            let Some(view) = snapshot
                .tasks
                .iter_mut()
                .find(|view| view.task.task_id == task_id && view.task.is_pending())
            else {
                return false;
            };
            view.task.status = status;
            view.predicted = true;
            if status == TaskStatus::Failed {
                if let Some(total) = snapshot.total_donated.as_mut() {
                    *total = total.saturating_add(task.stake_amount);
                }
            }
            true
        });

        Ok(ResolvedTask {
            task_id,
            status,
            signature,
        })
    }

    /// Fetches the owner's tasks and the global state and publishes them as the
    /// new snapshot, unless a fetch issued later has already been published.
    pub async fn refresh(&self) -> Result<TaskSnapshot> {
        let sequence = self.fetch_sequence.fetch_add(1, Ordering::AcqRel) + 1;
        let owner = self.owner();

        let tasks = self.repository.list_tasks(&owner).await?;
        let total_donated = match self.repository.fetch_global_state().await {
            Ok(state) => Some(state.total_donated),
            Err(DisciplineError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };

        let fetched = TaskSnapshot {
            tasks: tasks.into_iter().map(TaskView::from_account).collect(),
            total_donated,
            fetch_sequence: sequence,
            fetched_at: Some(self.now()),
        };

        let published = self.snapshot.send_if_modified(|current| {
            if current.fetch_sequence > sequence {
                return false;
            }
            *current = fetched.clone();
            true
        });
        if !published {
            debug!(sequence, "discarded stale fetch");
        }

        Ok(fetched)
    }

    fn begin(&self, task_id: u64) -> Result<InFlight<'_>> {
        let mut tasks = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !tasks.insert(task_id) {
            return Err(DisciplineError::OperationInFlight(task_id));
        }
        Ok(InFlight {
            tasks: &self.in_flight,
            task_id,
        })
    }

    async fn submit(&self, task_id: u64, instruction: Instruction) -> Result<Signature> {
        let signature = self
            .sender
            .sign_and_send(instruction)
            .await
            .map_err(|err| submission_failed(SubmissionStage::Send, None, err.to_string()))?;
        debug!(task_id, %signature, "transaction sent");

        match self.sender.confirm(&signature, self.commitment).await {
            Ok(Confirmation::Landed) => Ok(signature),
            Ok(Confirmation::Rejected { reason }) => Err(submission_failed(
                SubmissionStage::Rejected,
                Some(signature),
                reason,
            )),
            Err(err) => Err(submission_failed(
                SubmissionStage::Confirm,
                Some(signature),
                err.to_string(),
            )),
        }
    }
}

fn submission_failed(
    stage: SubmissionStage,
    signature: Option<Signature>,
    reason: String,
) -> DisciplineError {
    DisciplineError::SubmissionFailed {
        stage,
        signature,
        program_error: ProgramErrorCode::from_reason(&reason),
        reason,
    }
}
