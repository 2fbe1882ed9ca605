//! A minimal single-process proof-of-work ledger.
//!
//! - [`blockchain`] - wallets, transactions, blocks and the ledger itself
//! - [`config`] - difficulty, reward and mining worker settings
//!
//! The ledger lives in memory. Callers persist it through
//! [`blockchain::LedgerSnapshot`], the serde record of the full state.

#![forbid(unsafe_code)]

pub mod blockchain;
pub mod config;

pub use blockchain::{Address, Block, Blockchain, Transaction, Wallet};
pub use config::LedgerConfig;
