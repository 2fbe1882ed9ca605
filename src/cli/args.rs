use clap::{Parser, Subcommand};

use std::path::PathBuf;

/// Proof-of-work ledger driven from the command line
#[derive(Debug, Parser)]
#[command(name = "pow-ledger", version, about)]
pub struct Cli {
    /// Snapshot file holding the ledger state
    #[arg(long, global = true, default_value = "ledger.json")]
    pub state: PathBuf,

    /// TOML file with difficulty, mining_reward and mining_workers
    #[arg(long, global = true, default_value = "ledger.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or import wallets
    #[command(subcommand)]
    Wallet(WalletCommand),

    /// Sign a transfer and add it to the pending pool
    Send {
        /// Sender's private key (hex)
        #[arg(long)]
        private_key: String,

        /// Recipient's address (hex public key)
        #[arg(long)]
        to: String,

        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },

    /// Mine the pending pool into a new block
    Mine {
        /// Address receiving the mining reward
        #[arg(long)]
        reward_address: String,
    },

    /// Confirmed balance and transaction history of an address
    Balance { address: String },

    /// List pending transactions
    Pending,

    /// Show one block by height
    Block { index: usize },

    /// Dump the full chain
    Chain,

    /// Check chain integrity
    Validate,

    /// Summary of the ledger
    Status,

    /// Discard the ledger and start from a fresh genesis block
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum WalletCommand {
    /// Generate new keypairs
    New {
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Derive the address of an existing private key
    Import { private_key: String },
}
