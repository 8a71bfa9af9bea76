//! Solana JSON-RPC implementations of the account store and transaction
//! sender ports.

mod client;
mod sender;
mod wire;

pub use client::RpcClient;
pub use sender::KeypairSender;
