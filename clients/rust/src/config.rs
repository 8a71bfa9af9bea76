use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::constants::{CHARITY_WALLET, PROGRAM_ID};
use crate::ports::Commitment;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

pub const RPC_URL_ENV: &str = "DISCIPLINE_RPC_URL";
pub const COMMITMENT_ENV: &str = "DISCIPLINE_COMMITMENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub rpc_url: String,
    #[serde(with = "pubkey_string")]
    pub program_id: Pubkey,
    #[serde(with = "pubkey_string")]
    pub charity: Pubkey,
    pub commitment: Commitment,
    /// Interval of the background refetch that reconciles the task list.
    pub poll_interval_ms: u64,
    pub confirm_timeout_ms: u64,
    pub confirm_poll_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            program_id: PROGRAM_ID,
            charity: CHARITY_WALLET,
            commitment: Commitment::Confirmed,
            poll_interval_ms: 5_000,
            confirm_timeout_ms: 60_000,
            confirm_poll_ms: 500,
        }
    }
}

impl ClientConfig {
    /// Reads `path` when given, otherwise starts from defaults, then applies
    /// `DISCIPLINE_RPC_URL` and `DISCIPLINE_COMMITMENT` from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config
            .with_overrides(|key| std::env::var(key).ok())?
            .validate()
    }

    /// Rejects zero intervals: the reconciler and the confirmation loop both
    /// need a non-zero period.
    pub fn validate(self) -> Result<Self, ConfigError> {
        for (key, value) in [
            ("poll_interval_ms", self.poll_interval_ms),
            ("confirm_timeout_ms", self.confirm_timeout_ms),
            ("confirm_poll_ms", self.confirm_poll_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(self)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(RPC_URL_ENV) {
            self.rpc_url = url;
        }
        if let Some(level) = lookup(COMMITMENT_ENV) {
            self.commitment = level.parse().map_err(|reason| ConfigError::InvalidValue {
                key: COMMITMENT_ENV,
                reason,
            })?;
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn confirm_poll(&self) -> Duration {
        Duration::from_millis(self.confirm_poll_ms)
    }
}

mod pubkey_string {
    use std::str::FromStr;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(pubkey)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let text = String::deserialize(deserializer)?;
        Pubkey::from_str(&text).map_err(|e| D::Error::custom(format!("{text}: {e}")))
    }
}
