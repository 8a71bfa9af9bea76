use discipline_client::accounts::{GlobalState, Task};
use discipline_client::constants::CHARITY_WALLET;
use discipline_client::{find_global_state_pda, find_task_pda, find_vault_pda};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;

use crate::setup::TestFixture;

pub trait Accounts {
    fn owner_pubkey(&self) -> Pubkey;
    fn find_task_pda(&self, owner: &Pubkey, task_id: u64) -> (Pubkey, u8);
    fn find_vault_pda(&self, task: &Pubkey) -> (Pubkey, u8);
    fn find_global_state_pda(&self) -> (Pubkey, u8);
    fn get_task(&self, owner: &Pubkey, task_id: u64) -> Task;
    fn get_global_state(&self) -> GlobalState;
    fn get_lamports(&self, address: &Pubkey) -> u64;
    fn charity_balance(&self) -> u64;
}

impl Accounts for TestFixture {
    fn owner_pubkey(&self) -> Pubkey {
        self.owner.keypair().pubkey()
    }

    fn find_task_pda(&self, owner: &Pubkey, task_id: u64) -> (Pubkey, u8) {
        find_task_pda(owner, task_id).expect("Failed to derive task address")
    }

    fn find_vault_pda(&self, task: &Pubkey) -> (Pubkey, u8) {
        find_vault_pda(task).expect("Failed to derive vault address")
    }

    fn find_global_state_pda(&self) -> (Pubkey, u8) {
        find_global_state_pda().expect("Failed to derive global state address")
    }

    fn get_task(&self, owner: &Pubkey, task_id: u64) -> Task {
        let address = self.find_task_pda(owner, task_id).0;
        let account = self
            .ledger
            .account(&address)
            .expect("Task account not found");

        Task::from_bytes(&account.data).expect("Failed to deserialize task account")
    }

    fn get_global_state(&self) -> GlobalState {
        self.ledger
            .global_state()
            .expect("Global state account not found")
    }

    fn get_lamports(&self, address: &Pubkey) -> u64 {
        self.ledger.get_lamports(address)
    }

    fn charity_balance(&self) -> u64 {
        self.ledger.get_lamports(&CHARITY_WALLET)
    }
}
