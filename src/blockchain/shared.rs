use parking_lot::RwLock;

use std::sync::Arc;

use super::block::Block;
use super::chain::{Blockchain, BlockchainError, LedgerSnapshot};
use super::crypto::Address;
use super::transaction::Transaction;

/// Thread-safe handle to a [`Blockchain`].
///
/// Mutations take the write lock, so submissions and mining are serialized.
/// Reads take the read lock and always see a state between two mutations.
/// Mining holds the write lock for the whole proof-of-work search.
#[derive(Debug, Clone, Default)]
pub struct SharedBlockchain {
    inner: Arc<RwLock<Blockchain>>,
}

impl SharedBlockchain {
    pub fn new(blockchain: Blockchain) -> Self {
        SharedBlockchain {
            inner: Arc::new(RwLock::new(blockchain)),
        }
    }

    /// Adds a transaction to the pending pool
    pub fn add_transaction(&self, transaction: Transaction) -> Result<(), BlockchainError> {
        self.inner.write().add_transaction(transaction)
    }

    /// Mines the pending pool and returns a copy of the new block
    pub fn mine_pending_transactions(&self, reward_address: &Address) -> Block {
        self.inner
            .write()
            .mine_pending_transactions(reward_address)
            .clone()
    }

    pub fn get_balance(&self, address: &Address) -> f64 {
        self.inner.read().get_balance(address)
    }

    pub fn is_valid(&self) -> bool {
        self.inner.read().is_valid()
    }

    pub fn to_snapshot(&self) -> LedgerSnapshot {
        self.inner.read().to_snapshot()
    }

    /// Detached copy for longer analysis without holding the lock
    pub fn snapshot(&self) -> Blockchain {
        self.inner.read().clone()
    }

    /// Runs `f` against a consistent view of the ledger
    pub fn read<R>(&self, f: impl FnOnce(&Blockchain) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<Blockchain> for SharedBlockchain {
    fn from(blockchain: Blockchain) -> Self {
        Self::new(blockchain)
    }
}
