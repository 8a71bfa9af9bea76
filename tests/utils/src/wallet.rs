use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use discipline_client::ports::{TransportError, TransportResult};
use discipline_client::{Commitment, Confirmation, TransactionSender, WalletIdentity};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

use crate::{Gate, LocalLedger};

/// Signs with a throwaway keypair and executes straight against a [`LocalLedger`].
pub struct LocalWallet {
    ledger: Arc<LocalLedger>,
    keypair: Keypair,
    confirm_gate: Mutex<Option<Arc<Gate>>>,
}

impl LocalWallet {
    pub fn new(ledger: Arc<LocalLedger>, keypair: Keypair) -> Self {
        Self {
            ledger,
            keypair,
            confirm_gate: Mutex::new(None),
        }
    }

    /// Parks the next `confirm` at `gate`. The transaction itself has already
    /// landed by then.
    pub fn hold_next_confirm(&self, gate: Arc<Gate>) {
        *self
            .confirm_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(gate);
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl WalletIdentity for LocalWallet {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl TransactionSender for LocalWallet {
    async fn sign_and_send(&self, instruction: Instruction) -> TransportResult<Signature> {
        if let Some(reason) = self.ledger.take_send_failure() {
            return Err(TransportError::Request(reason));
        }

        let sequence = self.ledger.next_sequence();
        let mut message = instruction.data.clone();
        message.extend_from_slice(&sequence.to_le_bytes());
        let signature = self.keypair.sign_message(&message);

        let outcome = match self.ledger.process(&instruction, &self.keypair.pubkey()) {
            Ok(()) => Confirmation::Landed,
            Err(reason) => Confirmation::Rejected { reason },
        };
        self.ledger.record(signature, outcome);
        Ok(signature)
    }

    async fn confirm(
        &self,
        signature: &Signature,
        _commitment: Commitment,
    ) -> TransportResult<Confirmation> {
        let gate = self
            .confirm_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        self.ledger
            .outcome(signature)
            .ok_or_else(|| TransportError::Timeout(signature.to_string()))
    }
}
