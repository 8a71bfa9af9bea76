use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use discipline_client::accounts::{GlobalState, Task};
use discipline_client::constants::{CHARITY_WALLET, PROGRAM_ID, SYSTEM_PROGRAM_ID};
use discipline_client::instructions::{
    CreateTaskInstructionArgs, ResolveTaskInstructionArgs, CREATE_TASK_DISCRIMINATOR,
    RESOLVE_TASK_DISCRIMINATOR,
};
use discipline_client::pda::{
    find_global_state_pda_with_program, find_task_pda_with_program, find_vault_pda_with_program,
};
use discipline_client::ports::{AccountFilter, KeyedAccount, TransportResult};
use discipline_client::{AccountStore, Confirmation, ProgramErrorCode, TaskStatus};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::{custom_program_error, Gate, TestClock};

/// Program error codes raised by the task program's own checks.
pub const INVALID_STAKE: u32 = 6000;
pub const INVALID_DURATION: u32 = 6001;
pub const TASK_ALREADY_RESOLVED: u32 = 6002;
pub const TASK_NOT_EXPIRED: u32 = 6003;
/// System program: the payer cannot cover the transfer.
pub const INSUFFICIENT_FUNDS: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerAccount {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, LedgerAccount>,
    outcomes: HashMap<Signature, Confirmation>,
    send_failure: Option<String>,
    sequence: u64,
    processed: usize,
}

/// In-memory cluster that runs the task program's create and resolve rules
/// against a [`TestClock`], and serves reads through [`AccountStore`].
pub struct LocalLedger {
    program_id: Pubkey,
    charity: Pubkey,
    clock: Arc<TestClock>,
    state: Mutex<LedgerState>,
    listing_gate: Mutex<Option<Arc<Gate>>>,
}

impl LocalLedger {
    pub fn new(clock: Arc<TestClock>) -> Self {
        Self {
            program_id: PROGRAM_ID,
            charity: CHARITY_WALLET,
            clock,
            state: Mutex::new(LedgerState::default()),
            listing_gate: Mutex::new(None),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn clock(&self) -> &TestClock {
        &self.clock
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn airdrop(&self, address: &Pubkey, lamports: u64) {
        let mut state = self.state();
        let account = state.accounts.entry(*address).or_insert_with(|| LedgerAccount {
            owner: SYSTEM_PROGRAM_ID,
            ..LedgerAccount::default()
        });
        account.lamports += lamports;
    }

    pub fn get_lamports(&self, address: &Pubkey) -> u64 {
        self.state()
            .accounts
            .get(address)
            .map_or(0, |account| account.lamports)
    }

    pub fn account(&self, address: &Pubkey) -> Option<LedgerAccount> {
        self.state().accounts.get(address).cloned()
    }

    /// Writes raw data into a program-owned account, replacing whatever was there.
    pub fn set_program_account(&self, address: Pubkey, data: Vec<u8>) {
        self.state().accounts.insert(
            address,
            LedgerAccount {
                lamports: 1,
                owner: self.program_id,
                data,
            },
        );
    }

    pub fn initialize_global_state(&self) -> Pubkey {
        let (address, _) = find_global_state_pda_with_program(&self.program_id)
            .expect("global state address");
        self.set_program_account(address, GlobalState::default().to_bytes());
        address
    }

    pub fn global_state(&self) -> Option<GlobalState> {
        let (address, _) = find_global_state_pda_with_program(&self.program_id).ok()?;
        let account = self.account(&address)?;
        GlobalState::from_bytes(&account.data).ok()
    }

    /// Parks the next `get_program_accounts` at `gate` after it has read the
    /// accounts, so the caller returns data as of the moment it was issued.
    pub fn hold_next_listing(&self, gate: Arc<Gate>) {
        *self
            .listing_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(gate);
    }

    /// Makes the next `sign_and_send` fail before anything reaches the ledger.
    pub fn fail_next_send(&self, reason: impl Into<String>) {
        self.state().send_failure = Some(reason.into());
    }

    /// Number of transactions that reached the program, landed or not.
    pub fn processed_count(&self) -> usize {
        self.state().processed
    }

    pub(crate) fn take_send_failure(&self) -> Option<String> {
        self.state().send_failure.take()
    }

    pub(crate) fn next_sequence(&self) -> u64 {
        let mut state = self.state();
        state.sequence += 1;
        state.sequence
    }

    pub(crate) fn record(&self, signature: Signature, outcome: Confirmation) {
        self.state().outcomes.insert(signature, outcome);
    }

    pub(crate) fn outcome(&self, signature: &Signature) -> Option<Confirmation> {
        self.state().outcomes.get(signature).cloned()
    }

    /// Executes one instruction atomically: on error no account changes.
    pub fn process(&self, instruction: &Instruction, signer: &Pubkey) -> Result<(), String> {
        let mut state = self.state();
        state.processed += 1;

        if instruction.program_id != self.program_id {
            return Err(format!("program {} does not exist", instruction.program_id));
        }
        let owner = instruction
            .accounts
            .first()
            .filter(|meta| meta.is_signer && meta.pubkey == *signer)
            .map(|meta| meta.pubkey)
            .ok_or_else(|| "missing required signature for instruction".to_string())?;

        let mut accounts = state.accounts.clone();
        match instruction.data.get(..8) {
            Some(tag) if tag == CREATE_TASK_DISCRIMINATOR => {
                self.create_task(&mut accounts, instruction, owner)?
            }
            Some(tag) if tag == RESOLVE_TASK_DISCRIMINATOR => {
                self.resolve_task(&mut accounts, instruction, owner)?
            }
            _ => return Err(program_error(ProgramErrorCode::InstructionDidNotDeserialize)),
        }
        state.accounts = accounts;
        Ok(())
    }

    fn create_task(
        &self,
        accounts: &mut HashMap<Pubkey, LedgerAccount>,
        instruction: &Instruction,
        owner: Pubkey,
    ) -> Result<(), String> {
        let args = CreateTaskInstructionArgs::from_data(&instruction.data)
            .map_err(|_| program_error(ProgramErrorCode::InstructionDidNotDeserialize))?;
        let task_address = account_at(instruction, 1)?;
        let vault_address = account_at(instruction, 2)?;

        let (expected_task, task_bump) =
            find_task_pda_with_program(&owner, args.task_id, &self.program_id)
                .map_err(|e| e.to_string())?;
        let (expected_vault, vault_bump) =
            find_vault_pda_with_program(&expected_task, &self.program_id)
                .map_err(|e| e.to_string())?;
        if task_address != expected_task || vault_address != expected_vault {
            return Err(program_error(ProgramErrorCode::ConstraintSeeds));
        }
        if accounts.contains_key(&task_address) {
            return Err(program_error(ProgramErrorCode::AccountAlreadyInUse));
        }
        if args.stake_amount == 0 {
            return Err(custom_program_error(INVALID_STAKE));
        }
        if args.duration <= 0 {
            return Err(custom_program_error(INVALID_DURATION));
        }

        debit(accounts, &owner, args.stake_amount)?;
        credit(accounts, &vault_address, args.stake_amount, SYSTEM_PROGRAM_ID);

        let task = Task {
            task_id: args.task_id,
            owner,
            description: args.description,
            stake_amount: args.stake_amount,
            expires_at: self.clock.now_secs() + args.duration,
            status: TaskStatus::Pending,
            task_bump,
            vault_bump,
        };
        accounts.insert(
            task_address,
            LedgerAccount {
                lamports: 1,
                owner: self.program_id,
                data: task.to_bytes(),
            },
        );
        Ok(())
    }

    fn resolve_task(
        &self,
        accounts: &mut HashMap<Pubkey, LedgerAccount>,
        instruction: &Instruction,
        owner: Pubkey,
    ) -> Result<(), String> {
        let args = ResolveTaskInstructionArgs::from_data(&instruction.data)
            .map_err(|_| program_error(ProgramErrorCode::InstructionDidNotDeserialize))?;
        let task_address = account_at(instruction, 1)?;
        let vault_address = account_at(instruction, 2)?;
        let charity = account_at(instruction, 3)?;
        let global_state_address = account_at(instruction, 4)?;

        let (expected_task, _) = find_task_pda_with_program(&owner, args.task_id, &self.program_id)
            .map_err(|e| e.to_string())?;
        if task_address != expected_task {
            return Err(program_error(ProgramErrorCode::ConstraintSeeds));
        }
        let mut task = accounts
            .get(&task_address)
            .ok_or_else(|| program_error(ProgramErrorCode::AccountNotInitialized))
            .and_then(|account| {
                Task::from_bytes(&account.data)
                    .map_err(|_| program_error(ProgramErrorCode::AccountDiscriminatorMismatch))
            })?;
        if task.owner != owner {
            return Err(program_error(ProgramErrorCode::ConstraintHasOne));
        }

        let (expected_vault, _) = find_vault_pda_with_program(&task_address, &self.program_id)
            .map_err(|e| e.to_string())?;
        let (expected_state, _) =
            find_global_state_pda_with_program(&self.program_id).map_err(|e| e.to_string())?;
        if vault_address != expected_vault || global_state_address != expected_state {
            return Err(program_error(ProgramErrorCode::ConstraintSeeds));
        }
        if charity != self.charity {
            return Err(program_error(ProgramErrorCode::ConstraintAddress));
        }
        let mut global_state = accounts
            .get(&global_state_address)
            .ok_or_else(|| program_error(ProgramErrorCode::AccountNotInitialized))
            .and_then(|account| {
                GlobalState::from_bytes(&account.data)
                    .map_err(|_| program_error(ProgramErrorCode::AccountDiscriminatorMismatch))
            })?;

        if task.status.is_terminal() {
            return Err(custom_program_error(TASK_ALREADY_RESOLVED));
        }
        if self.clock.now_secs() < task.expires_at {
            return Err(custom_program_error(TASK_NOT_EXPIRED));
        }

        let recipient = if args.completed { owner } else { charity };
        debit(accounts, &vault_address, task.stake_amount)?;
        credit(accounts, &recipient, task.stake_amount, SYSTEM_PROGRAM_ID);

        task.status = TaskStatus::from_outcome(args.completed);
        if let Some(account) = accounts.get_mut(&task_address) {
            account.data = task.to_bytes();
        }
        if !args.completed {
            global_state.total_donated += task.stake_amount;
            if let Some(account) = accounts.get_mut(&global_state_address) {
                account.data = global_state.to_bytes();
            }
        }
        Ok(())
    }
}

fn program_error(code: ProgramErrorCode) -> String {
    custom_program_error(code as u32)
}

fn account_at(instruction: &Instruction, index: usize) -> Result<Pubkey, String> {
    instruction
        .accounts
        .get(index)
        .map(|meta| meta.pubkey)
        .ok_or_else(|| "not enough account keys given to the instruction".to_string())
}

fn debit(
    accounts: &mut HashMap<Pubkey, LedgerAccount>,
    address: &Pubkey,
    lamports: u64,
) -> Result<(), String> {
    let account = accounts
        .get_mut(address)
        .filter(|account| account.lamports >= lamports)
        .ok_or_else(|| custom_program_error(INSUFFICIENT_FUNDS))?;
    account.lamports -= lamports;
    Ok(())
}

fn credit(
    accounts: &mut HashMap<Pubkey, LedgerAccount>,
    address: &Pubkey,
    lamports: u64,
    owner: Pubkey,
) {
    accounts
        .entry(*address)
        .or_insert_with(|| LedgerAccount {
            owner,
            ..LedgerAccount::default()
        })
        .lamports += lamports;
}

#[async_trait]
impl AccountStore for LocalLedger {
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> TransportResult<Vec<KeyedAccount>> {
        let accounts: Vec<KeyedAccount> = self
            .state()
            .accounts
            .iter()
            .filter(|(_, account)| account.owner == *program_id)
            .filter(|(_, account)| filters.iter().all(|filter| filter.matches(&account.data)))
            .map(|(address, account)| KeyedAccount {
                address: *address,
                data: account.data.clone(),
            })
            .collect();

        let gate = self
            .listing_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(accounts)
    }

    async fn get_account(&self, address: &Pubkey) -> TransportResult<Option<Vec<u8>>> {
        Ok(self
            .state()
            .accounts
            .get(address)
            .map(|account| account.data.clone()))
    }

    async fn get_balance(&self, address: &Pubkey) -> TransportResult<u64> {
        Ok(self.get_lamports(address))
    }
}
