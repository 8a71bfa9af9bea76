use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ports::{AccountFilter, Commitment, TransportError, TransportResult};

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithContext<T> {
    pub value: T,
}

/// Account as returned with `"encoding": "base64"`; `data` is `[payload, encoding]`.
#[derive(Debug, Deserialize)]
pub(crate) struct UiAccount {
    pub data: (String, String),
}

impl UiAccount {
    pub fn decode_data(&self) -> TransportResult<Vec<u8>> {
        let (payload, encoding) = &self.data;
        if encoding != "base64" {
            return Err(TransportError::Response(format!(
                "expected base64 account data, got {encoding}"
            )));
        }
        STANDARD
            .decode(payload)
            .map_err(|e| TransportError::Response(format!("invalid base64 account data: {e}")))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgramAccount {
    pub pubkey: String,
    pub account: UiAccount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LatestBlockhash {
    pub blockhash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignatureStatus {
    pub err: Option<Value>,
    pub confirmation_status: Option<Commitment>,
}

pub(crate) fn filter_to_json(filter: &AccountFilter) -> Value {
    match filter {
        AccountFilter::Memcmp { offset, bytes } => json!({
            "memcmp": {
                "offset": offset,
                "bytes": STANDARD.encode(bytes),
                "encoding": "base64",
            }
        }),
        AccountFilter::DataSize(size) => json!({ "dataSize": size }),
    }
}
