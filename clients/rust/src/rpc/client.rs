use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tracing::debug;

use crate::ports::{
    AccountFilter, AccountStore, Commitment, KeyedAccount, TransportError, TransportResult,
};
use crate::rpc::wire::{
    filter_to_json, LatestBlockhash, ProgramAccount, RpcRequest, RpcResponse, SignatureStatus,
    UiAccount, WithContext,
};

/// Minimal Solana JSON-RPC client over HTTP.
pub struct RpcClient {
    http: Client,
    url: String,
    commitment: Commitment,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, commitment: Commitment) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            commitment,
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> TransportResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Request(format!("{method}: HTTP {status}: {text}")));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Response(format!("{method}: {e}")))?;

        match (body.result, body.error) {
            (_, Some(error)) => Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(TransportError::Response(format!(
                "{method}: neither result nor error"
            ))),
        }
    }

    pub async fn latest_blockhash(&self) -> TransportResult<Hash> {
        let response: WithContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;

        Hash::from_str(&response.value.blockhash)
            .map_err(|e| TransportError::Response(format!("invalid blockhash: {e}")))
    }

    pub async fn send_transaction(&self, transaction: &Transaction) -> TransportResult<Signature> {
        let wire = bincode::serialize(transaction)
            .map_err(|e| TransportError::Signing(format!("cannot serialize transaction: {e}")))?;

        let signature: String = self
            .call(
                "sendTransaction",
                json!([
                    STANDARD.encode(wire),
                    { "encoding": "base64", "preflightCommitment": self.commitment.as_str() }
                ]),
            )
            .await?;

        Signature::from_str(&signature)
            .map_err(|e| TransportError::Response(format!("invalid signature {signature}: {e}")))
    }

    pub(crate) async fn signature_status(
        &self,
        signature: &Signature,
    ) -> TransportResult<Option<SignatureStatus>> {
        let response: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": false }]),
            )
            .await?;

        Ok(response.value.into_iter().next().flatten())
    }
}

#[async_trait]
impl AccountStore for RpcClient {
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> TransportResult<Vec<KeyedAccount>> {
        let filters: Vec<Value> = filters.iter().map(filter_to_json).collect();
        let accounts: Vec<ProgramAccount> = self
            .call(
                "getProgramAccounts",
                json!([
                    program_id.to_string(),
                    {
                        "encoding": "base64",
                        "commitment": self.commitment.as_str(),
                        "filters": filters,
                    }
                ]),
            )
            .await?;
        debug!(%program_id, count = accounts.len(), "fetched program accounts");

        accounts
            .into_iter()
            .map(|account| {
                let address = Pubkey::from_str(&account.pubkey).map_err(|e| {
                    TransportError::Response(format!("invalid pubkey {}: {e}", account.pubkey))
                })?;
                Ok(KeyedAccount {
                    address,
                    data: account.account.decode_data()?,
                })
            })
            .collect()
    }

    async fn get_account(&self, address: &Pubkey) -> TransportResult<Option<Vec<u8>>> {
        let response: WithContext<Option<UiAccount>> = self
            .call(
                "getAccountInfo",
                json!([
                    address.to_string(),
                    { "encoding": "base64", "commitment": self.commitment.as_str() }
                ]),
            )
            .await?;

        response
            .value
            .map(|account| account.decode_data())
            .transpose()
    }

    async fn get_balance(&self, address: &Pubkey) -> TransportResult<u64> {
        let response: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), { "commitment": self.commitment.as_str() }]),
            )
            .await?;

        Ok(response.value)
    }
}
