// Blockchain module
//
// This module contains the core ledger implementation:
// - Wallet keys, signing and verification
// - Transaction structure
// - Block structure and proof of work
// - Blockchain structure (chain, pending pool, balances, validation)
// - A lock-guarded handle for shared use

pub mod block;
pub mod chain;
pub mod crypto;
pub mod shared;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::{Blockchain, BlockchainError, ChainStats, ChainViolation, LedgerSnapshot};
pub use crypto::{generate_wallets, verify_signature, Address, CryptoError, DigitalSignature, Wallet, WalletExport};
pub use shared::SharedBlockchain;
pub use transaction::{Transaction, TransactionError};
