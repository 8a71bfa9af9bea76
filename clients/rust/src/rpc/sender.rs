use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::ports::{
    Commitment, Confirmation, TransactionSender, TransportError, TransportResult, WalletIdentity,
};
use crate::rpc::RpcClient;

/// Signs with a local keypair and submits through [`RpcClient`].
pub struct KeypairSender {
    rpc: Arc<RpcClient>,
    keypair: Keypair,
    confirm_timeout: Duration,
    confirm_poll: Duration,
}

impl KeypairSender {
    pub fn new(rpc: Arc<RpcClient>, keypair: Keypair, config: &ClientConfig) -> Self {
        Self {
            rpc,
            keypair,
            confirm_timeout: config.confirm_timeout(),
            confirm_poll: config.confirm_poll(),
        }
    }

    pub fn from_file(
        rpc: Arc<RpcClient>,
        path: &Path,
        config: &ClientConfig,
    ) -> TransportResult<Self> {
        let keypair = read_keypair_file(path).map_err(|e| {
            TransportError::Signing(format!("cannot read keypair {}: {e}", path.display()))
        })?;
        Ok(Self::new(rpc, keypair, config))
    }
}

impl WalletIdentity for KeypairSender {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl TransactionSender for KeypairSender {
    async fn sign_and_send(&self, instruction: Instruction) -> TransportResult<Signature> {
        let payer = self.keypair.pubkey();
        let blockhash = self.rpc.latest_blockhash().await?;

        let message = Message::new(&[instruction], Some(&payer));
        let mut transaction = Transaction::new_unsigned(message);
        transaction
            .try_sign(&[&self.keypair], blockhash)
            .map_err(|e| TransportError::Signing(e.to_string()))?;

        let signature = self.rpc.send_transaction(&transaction).await?;
        info!(%signature, %payer, "transaction submitted");
        Ok(signature)
    }

    async fn confirm(
        &self,
        signature: &Signature,
        commitment: Commitment,
    ) -> TransportResult<Confirmation> {
        let deadline = Instant::now() + self.confirm_timeout;

        loop {
            if let Some(status) = self.rpc.signature_status(signature).await? {
                if let Some(err) = status.err {
                    return Ok(Confirmation::Rejected {
                        reason: err.to_string(),
                    });
                }
                if status
                    .confirmation_status
                    .is_some_and(|level| level >= commitment)
                {
                    debug!(%signature, %commitment, "signature confirmed");
                    return Ok(Confirmation::Landed);
                }
            }

            if Instant::now() >= deadline {
                return Err(TransportError::Timeout(format!(
                    "{signature} to reach {commitment}"
                )));
            }
            sleep(self.confirm_poll).await;
        }
    }
}
