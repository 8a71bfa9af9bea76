use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::duration::parse_duration;

/// Stake lamports on a task and get them back only if you finish it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured RPC endpoint
    #[arg(long, value_name = "URL", global = true)]
    pub rpc_url: Option<String>,

    /// Wallet keypair, defaults to ~/.config/solana/id.json
    #[arg(long, value_name = "FILE", global = true)]
    pub keypair: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List your tasks grouped by status
    List,
    /// Stake lamports on a new task
    ///
    /// Example: discipline create --description "Read 10 pages" --duration 90m --stake 100000000
    Create {
        #[arg(long)]
        description: String,
        /// Seconds, or a number suffixed with s, m or h
        #[arg(long, value_parser = parse_duration)]
        duration: i64,
        /// Stake in lamports
        #[arg(long)]
        stake: u64,
    },
    /// Resolve an expired task
    ///
    /// Example: discipline resolve --task-id 1718000000123 --completed
    Resolve {
        #[arg(long)]
        task_id: u64,
        #[command(flatten)]
        outcome: Outcome,
    },
    /// Show the total donated to charity
    Stats,
    /// Follow your tasks with live countdowns until interrupted
    Watch,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Outcome {
    /// Return the stake to your wallet
    #[arg(long)]
    pub completed: bool,
    /// Send the stake to charity
    #[arg(long)]
    pub failed: bool,
}
