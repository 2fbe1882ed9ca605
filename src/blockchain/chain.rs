use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;

use super::block::Block;
use super::crypto::{short, Address};
use super::transaction::{unix_timestamp, Transaction, TransactionError};
use crate::config::{LedgerConfig, MAX_DIFFICULTY};

/// Timestamp of the genesis block (2017-01-01T00:00:00Z)
pub const GENESIS_TIMESTAMP: f64 = 1_483_228_800.0;

/// Previous-hash sentinel carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Errors that can occur during blockchain operations
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("Transaction must include from and to address")]
    MissingAddress,

    #[error("Cannot add invalid transaction to chain")]
    InvalidSignature,

    #[error("Transaction amount should be higher than 0, got {0}")]
    NonPositiveAmount(f64),

    #[error("Not enough balance: required {required}, available {available}")]
    InsufficientBalance { required: f64, available: f64 },

    #[error(
        "Pending transactions for this wallet exceed its balance: pending {pending}, requested {requested}, available {available}"
    )]
    PendingExceedsBalance {
        pending: f64,
        requested: f64,
        available: f64,
    },

    #[error("Transaction error: {0}")]
    TransactionError(#[from] TransactionError),

    #[error("Snapshot has no blocks")]
    EmptyChain,

    #[error("Difficulty {0} can never be met, the maximum is {max}", max = MAX_DIFFICULTY)]
    InvalidDifficulty(usize),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// First integrity failure found by [`Blockchain::check_integrity`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainViolation {
    #[error("Genesis block has been tampered with")]
    GenesisMismatch,

    #[error("Invalid previous hash at block {0}")]
    BrokenLink(usize),

    #[error("Invalid transactions at block {0}")]
    InvalidTransactions(usize),

    #[error("Invalid hash at block {0}")]
    HashMismatch(usize),

    #[error("Block {0} was not mined properly")]
    InsufficientWork(usize),
}

/// Serializable ledger state exchanged with the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub chain: Vec<Block>,
    pub difficulty: usize,
    pub mining_reward: f64,
    pub pending_transactions: Vec<Transaction>,
}

/// Summary figures for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainStats {
    pub total_blocks: usize,
    pub total_transactions: usize,
    pub pending_count: usize,
    pub difficulty: usize,
    pub mining_reward: f64,
    pub is_valid: bool,
}

/// Represents the blockchain
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks, genesis first
    chain: Vec<Block>,

    /// Pending transactions to be included in the next block
    pending_transactions: Vec<Transaction>,

    /// Mining difficulty (number of leading zero hex digits required in hash)
    difficulty: usize,

    /// Mining reward
    mining_reward: f64,

    /// Rayon workers used for mining new blocks; genesis always mines on one
    mining_workers: usize,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::with_config(&LedgerConfig::default())
    }
}

impl Blockchain {
    /// Creates a new blockchain with a mined genesis block
    ///
    /// # Arguments
    ///
    /// * `difficulty` - Leading zero hex digits required in every block hash
    /// * `mining_reward` - Amount minted to the miner of each block
    ///
    /// # Returns
    ///
    /// A new Blockchain with only the genesis block and an empty pending pool
    pub fn new(difficulty: usize, mining_reward: f64) -> Self {
        let genesis_block = Self::create_genesis_block(difficulty);
        info!("Genesis block created: {}", genesis_block);

        Blockchain {
            chain: vec![genesis_block],
            pending_transactions: Vec::new(),
            difficulty,
            mining_reward,
            mining_workers: 1,
        }
    }

    /// Creates a new blockchain from configuration
    pub fn with_config(config: &LedgerConfig) -> Self {
        Self::new(config.difficulty, config.mining_reward).with_mining_workers(config.mining_workers)
    }

    /// Sets how many workers search for a nonce when mining new blocks
    pub fn with_mining_workers(mut self, workers: usize) -> Self {
        self.mining_workers = workers.max(1);
        self
    }

    /// Builds the genesis block for `difficulty`.
    ///
    /// Always mined single-threaded so every ledger with the same difficulty
    /// derives a byte-identical genesis.
    pub fn create_genesis_block(difficulty: usize) -> Block {
        let mut genesis_block = Block::new(
            GENESIS_TIMESTAMP,
            Vec::new(),
            GENESIS_PREVIOUS_HASH.to_string(),
        );
        genesis_block.mine(difficulty);
        genesis_block
    }

    /// Gets the last block in the chain
    pub fn get_last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Gets a block by height
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.chain.get(index)
    }

    /// Gets the entire blockchain
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Mutable access to committed blocks; edits are tampering and make
    /// [`Blockchain::is_valid`] fail until reverted
    pub fn chain_mut(&mut self) -> &mut [Block] {
        &mut self.chain
    }

    /// Gets all pending transactions
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn mining_reward(&self) -> f64 {
        self.mining_reward
    }

    pub fn mining_workers(&self) -> usize {
        self.mining_workers
    }

    /// Adds a new transaction to the pending pool.
    ///
    /// Checks run in order and the first failure is returned; a rejected
    /// transaction leaves the pool untouched.
    ///
    /// # Arguments
    ///
    /// * `transaction` - A signed transfer
    ///
    /// # Returns
    ///
    /// `Ok(())` once the transaction is pending
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), BlockchainError> {
        if let Err(err) = self.check_transaction(&transaction) {
            warn!("Rejected {}: {}", transaction, err);
            return Err(err);
        }

        debug!("Transaction added: {}", transaction);
        self.pending_transactions.push(transaction);

        Ok(())
    }

    fn check_transaction(&self, transaction: &Transaction) -> Result<(), BlockchainError> {
        let sender = match &transaction.sender {
            Some(sender) if !sender.is_empty() && !transaction.recipient.is_empty() => sender,
            _ => return Err(BlockchainError::MissingAddress),
        };

        if !transaction.is_valid()? {
            return Err(BlockchainError::InvalidSignature);
        }

        // NaN fails this comparison too
        if !(transaction.amount > 0.0) {
            return Err(BlockchainError::NonPositiveAmount(transaction.amount));
        }

        let available = self.get_balance(sender);
        if available < transaction.amount {
            return Err(BlockchainError::InsufficientBalance {
                required: transaction.amount,
                available,
            });
        }

        let pending: f64 = self
            .pending_transactions
            .iter()
            .filter(|tx| tx.sender.as_ref() == Some(sender))
            .map(|tx| tx.amount)
            .sum();

        if available < pending + transaction.amount {
            return Err(BlockchainError::PendingExceedsBalance {
                pending,
                requested: transaction.amount,
                available,
            });
        }

        Ok(())
    }

    /// Mines the whole pending pool into a new block on top of the chain and
    /// clears the pool.
    ///
    /// The reward for this block is queued as the first transaction of the
    /// next one. It only counts towards `reward_address`'s balance once
    /// another block is mined, because balances only scan committed blocks.
    ///
    /// # Arguments
    ///
    /// * `reward_address` - The address receiving the mining reward
    ///
    /// # Returns
    ///
    /// The newly mined block, now the tip of the chain
    pub fn mine_pending_transactions(&mut self, reward_address: &Address) -> &Block {
        let transactions = std::mem::take(&mut self.pending_transactions);
        let reward_transaction = Transaction::new_reward(reward_address.clone(), self.mining_reward);

        let mut block = Block::new(
            unix_timestamp(),
            transactions,
            self.get_last_block().hash.clone(),
        );

        block.mine_parallel(self.difficulty, self.mining_workers);

        info!(
            "Block {} successfully mined with {} transactions: {}",
            self.chain.len(),
            block.transactions.len(),
            block.hash
        );

        self.chain.push(block);
        self.pending_transactions.push(reward_transaction);
        self.get_last_block()
    }

    /// Confirmed balance: every committed transaction, pending pool excluded
    pub fn get_balance(&self, address: &Address) -> f64 {
        let mut balance = 0.0;

        for block in &self.chain {
            for transaction in &block.transactions {
                if transaction.sender.as_ref() == Some(address) {
                    balance -= transaction.amount;
                }

                if &transaction.recipient == address {
                    balance += transaction.amount;
                }
            }
        }

        debug!("Balance of {}...: {}", short(address.as_str()), balance);
        balance
    }

    /// Committed transactions sent or received by `address`, in chain order
    pub fn get_transactions_for(&self, address: &Address) -> Vec<&Transaction> {
        self.chain
            .iter()
            .flat_map(|block| block.transactions.iter())
            .filter(|transaction| transaction.involves(address))
            .collect()
    }

    /// Validates the blockchain
    pub fn is_valid(&self) -> bool {
        match self.check_integrity() {
            Ok(()) => true,
            Err(violation) => {
                warn!("Chain validation failed: {}", violation);
                false
            }
        }
    }

    /// Walks the chain and reports the first integrity failure.
    ///
    /// Genesis is re-derived at this ledger's difficulty and compared by its
    /// serialized record. Each later block is then checked for linkage,
    /// transaction validity, hash integrity and proof of work, in that order.
    pub fn check_integrity(&self) -> Result<(), ChainViolation> {
        let stored_genesis = self.chain.first().ok_or(ChainViolation::GenesisMismatch)?;
        let real_genesis = Self::create_genesis_block(self.difficulty);

        let same_genesis = match (
            serde_json::to_vec(&real_genesis),
            serde_json::to_vec(stored_genesis),
        ) {
            (Ok(real), Ok(stored)) => real == stored,
            _ => false,
        };
        if !same_genesis {
            return Err(ChainViolation::GenesisMismatch);
        }

        for (index, pair) in self.chain.windows(2).enumerate() {
            let (previous_block, current_block) = (&pair[0], &pair[1]);
            let height = index + 1;

            if current_block.previous_hash != previous_block.hash {
                return Err(ChainViolation::BrokenLink(height));
            }

            if !current_block.has_valid_transactions() {
                return Err(ChainViolation::InvalidTransactions(height));
            }

            if current_block.hash != current_block.calculate_hash() {
                return Err(ChainViolation::HashMismatch(height));
            }

            if !current_block.meets_difficulty(self.difficulty) {
                return Err(ChainViolation::InsufficientWork(height));
            }
        }

        Ok(())
    }

    /// Summary figures (runs a full validation)
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            total_blocks: self.chain.len(),
            total_transactions: self.chain.iter().map(|b| b.transactions.len()).sum(),
            pending_count: self.pending_transactions.len(),
            difficulty: self.difficulty,
            mining_reward: self.mining_reward,
            is_valid: self.is_valid(),
        }
    }

    /// Captures the full state as a snapshot record
    pub fn to_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            chain: self.chain.clone(),
            difficulty: self.difficulty,
            mining_reward: self.mining_reward,
            pending_transactions: self.pending_transactions.clone(),
        }
    }

    /// Restores a ledger from a snapshot without re-validating it; call
    /// [`Blockchain::is_valid`] to audit untrusted input.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, BlockchainError> {
        if snapshot.chain.is_empty() {
            return Err(BlockchainError::EmptyChain);
        }

        if snapshot.difficulty > MAX_DIFFICULTY {
            return Err(BlockchainError::InvalidDifficulty(snapshot.difficulty));
        }

        Ok(Blockchain {
            chain: snapshot.chain,
            pending_transactions: snapshot.pending_transactions,
            difficulty: snapshot.difficulty,
            mining_reward: snapshot.mining_reward,
            mining_workers: 1,
        })
    }

    pub fn to_json(&self) -> Result<String, BlockchainError> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self, BlockchainError> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Blockchain(blocks={}, difficulty={}, pending={})",
            self.chain.len(),
            self.difficulty,
            self.pending_transactions.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::crypto::Wallet;

    /// Ledger where `wallet` holds one matured reward. The reward for the
    /// second block is still queued in the pool.
    fn funded_chain(reward: f64) -> (Blockchain, Wallet) {
        let mut blockchain = Blockchain::new(1, reward);
        let wallet = Wallet::generate();

        blockchain.mine_pending_transactions(wallet.address());
        blockchain.mine_pending_transactions(&Address::from("burn"));

        (blockchain, wallet)
    }

    fn transfer(from: &Wallet, to: &Address, amount: f64) -> Transaction {
        let mut transaction = Transaction::new(Some(from.address().clone()), to.clone(), amount);
        transaction.sign(from).unwrap();
        transaction
    }

    fn pending_from(blockchain: &Blockchain, wallet: &Wallet) -> usize {
        blockchain
            .pending_transactions()
            .iter()
            .filter(|tx| tx.sender.as_ref() == Some(wallet.address()))
            .count()
    }

    #[test]
    fn test_new_blockchain() {
        let blockchain = Blockchain::new(2, 100.0);

        assert_eq!(blockchain.len(), 1);
        let genesis = blockchain.get_last_block();
        assert_eq!(genesis.timestamp, GENESIS_TIMESTAMP);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.transactions.is_empty());
        assert!(genesis.hash.starts_with("00"));
        assert!(blockchain.pending_transactions().is_empty());
        assert!(blockchain.is_valid());
    }

    #[test]
    fn test_genesis_is_deterministic() {
        let first = Blockchain::new(2, 100.0);
        let second = Blockchain::new(2, 50.0).with_mining_workers(4);

        assert_eq!(first.chain()[0], second.chain()[0]);
    }

    #[test]
    fn test_reward_matures_after_next_block() {
        let mut blockchain = Blockchain::new(1, 100.0);
        let miner = Wallet::generate();

        blockchain.mine_pending_transactions(miner.address());
        assert_eq!(blockchain.get_balance(miner.address()), 0.0);
        assert!(blockchain.chain()[1].transactions.is_empty());

        let queued = blockchain.pending_transactions();
        assert_eq!(queued.len(), 1);
        assert!(queued[0].is_reward());
        assert_eq!(&queued[0].recipient, miner.address());

        let other = Address::from("someone-else");
        blockchain.mine_pending_transactions(&other);
        assert_eq!(blockchain.get_balance(miner.address()), 100.0);
        assert_eq!(blockchain.get_balance(&other), 0.0);
    }

    #[test]
    fn test_mine_block_links_chain() {
        let mut blockchain = Blockchain::new(2, 100.0);
        for _ in 0..3 {
            blockchain.mine_pending_transactions(&Address::from("miner"));
        }

        assert_eq!(blockchain.len(), 4);
        for pair in blockchain.chain().windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].hash);
            assert!(pair[1].hash.starts_with("00"));
        }
        assert!(blockchain.is_valid());
    }

    #[test]
    fn test_add_transaction() {
        let (mut blockchain, sender) = funded_chain(100.0);
        let recipient = Wallet::generate();

        blockchain
            .add_transaction(transfer(&sender, recipient.address(), 10.0))
            .unwrap();

        assert_eq!(pending_from(&blockchain, &sender), 1);
        // Pending spends do not move confirmed balances
        assert_eq!(blockchain.get_balance(sender.address()), 100.0);
        assert_eq!(blockchain.get_balance(recipient.address()), 0.0);
    }

    #[test]
    fn test_missing_address() {
        let (mut blockchain, sender) = funded_chain(100.0);
        let before = blockchain.pending_transactions().len();

        let reward = Transaction::new_reward(Address::from("anyone"), 5.0);
        assert!(matches!(
            blockchain.add_transaction(reward),
            Err(BlockchainError::MissingAddress)
        ));

        let no_recipient = transfer(&sender, &Address::from(""), 5.0);
        assert!(matches!(
            blockchain.add_transaction(no_recipient),
            Err(BlockchainError::MissingAddress)
        ));
        assert_eq!(blockchain.pending_transactions().len(), before);
    }

    #[test]
    fn test_invalid_and_missing_signature() {
        let (mut blockchain, sender) = funded_chain(100.0);

        let mut forged = transfer(&sender, &Address::from("bob"), 5.0);
        forged.amount = 50.0;
        assert!(matches!(
            blockchain.add_transaction(forged),
            Err(BlockchainError::InvalidSignature)
        ));

        let unsigned = Transaction::new(Some(sender.address().clone()), Address::from("bob"), 5.0);
        assert!(matches!(
            blockchain.add_transaction(unsigned),
            Err(BlockchainError::TransactionError(TransactionError::MissingSignature))
        ));
        assert_eq!(pending_from(&blockchain, &sender), 0);
    }

    #[test]
    fn test_non_positive_amount() {
        let (mut blockchain, sender) = funded_chain(100.0);

        for amount in [0.0, -5.0, f64::NAN] {
            let result = blockchain.add_transaction(transfer(&sender, &Address::from("bob"), amount));
            assert!(matches!(result, Err(BlockchainError::NonPositiveAmount(_))));
        }
        assert_eq!(pending_from(&blockchain, &sender), 0);
    }

    #[test]
    fn test_insufficient_balance_leaves_pool_unchanged() {
        let (mut blockchain, sender) = funded_chain(100.0);
        blockchain
            .add_transaction(transfer(&sender, &Address::from("bob"), 10.0))
            .unwrap();
        let before = blockchain.pending_transactions().len();

        let result = blockchain.add_transaction(transfer(&sender, &Address::from("bob"), 100.5));

        assert!(matches!(
            result,
            Err(BlockchainError::InsufficientBalance { required, available })
                if required == 100.5 && available == 100.0
        ));
        assert_eq!(blockchain.pending_transactions().len(), before);
    }

    #[test]
    fn test_pending_double_spend() {
        let (mut blockchain, sender) = funded_chain(100.0);

        blockchain
            .add_transaction(transfer(&sender, &Address::from("bob"), 60.0))
            .unwrap();
        let result = blockchain.add_transaction(transfer(&sender, &Address::from("carol"), 60.0));

        assert!(matches!(
            result,
            Err(BlockchainError::PendingExceedsBalance { pending, requested, available })
                if pending == 60.0 && requested == 60.0 && available == 100.0
        ));
        assert_eq!(pending_from(&blockchain, &sender), 1);

        // Spending exactly the remainder is fine
        blockchain
            .add_transaction(transfer(&sender, &Address::from("carol"), 40.0))
            .unwrap();
        assert_eq!(pending_from(&blockchain, &sender), 2);
    }

    #[test]
    fn test_transactions_for_address() {
        let (mut blockchain, sender) = funded_chain(100.0);
        let recipient = Address::from("bob");

        blockchain
            .add_transaction(transfer(&sender, &recipient, 25.0))
            .unwrap();
        blockchain.mine_pending_transactions(sender.address());

        let history = blockchain.get_transactions_for(sender.address());
        assert_eq!(history.len(), 2);
        assert!(history[0].is_reward());
        assert_eq!(history[1].recipient, recipient);

        assert_eq!(blockchain.get_transactions_for(&recipient).len(), 1);
        assert!(blockchain
            .get_transactions_for(&Address::from("stranger"))
            .is_empty());
    }

    #[test]
    fn test_tamper_detection() {
        let (mut blockchain, sender) = funded_chain(100.0);
        blockchain
            .add_transaction(transfer(&sender, &Address::from("bob"), 30.0))
            .unwrap();
        blockchain.mine_pending_transactions(&Address::from("miner"));
        assert!(blockchain.is_valid());

        // Block 3 holds [reward to burn, transfer]. A signed transfer trips
        // the signature check first.
        blockchain.chain_mut()[3].transactions[1].amount = 3.0;
        assert_eq!(
            blockchain.check_integrity(),
            Err(ChainViolation::InvalidTransactions(3))
        );
        blockchain.chain_mut()[3].transactions[1].amount = 30.0;
        assert!(blockchain.is_valid());

        // A reward carries no signature, so the hash check catches it
        blockchain.chain_mut()[2].transactions[0].amount = 1_000.0;
        assert_eq!(blockchain.check_integrity(), Err(ChainViolation::HashMismatch(2)));
        blockchain.chain_mut()[2].transactions[0].amount = 100.0;
        assert!(blockchain.is_valid());
    }

    #[test]
    fn test_relinking_is_detected() {
        let (mut blockchain, _) = funded_chain(100.0);

        blockchain.chain_mut()[2].previous_hash = "f".repeat(64);
        assert_eq!(blockchain.check_integrity(), Err(ChainViolation::BrokenLink(2)));
    }

    #[test]
    fn test_genesis_tampering() {
        let (mut blockchain, _) = funded_chain(100.0);

        blockchain.chain_mut()[0].timestamp += 1.0;
        assert_eq!(blockchain.check_integrity(), Err(ChainViolation::GenesisMismatch));
    }

    #[test]
    fn test_insufficient_work() {
        let mut blockchain = Blockchain::new(1, 100.0);
        blockchain.mine_pending_transactions(&Address::from("miner"));

        // Replace block 1 with an unmined block that still links correctly
        let previous_hash = blockchain.chain()[0].hash.clone();
        let mut block = Block::new(1_700_000_000.0, Vec::new(), previous_hash);
        while block.meets_difficulty(1) {
            block.nonce += 1;
            block.hash = block.calculate_hash();
        }
        blockchain.chain_mut()[1] = block;

        assert_eq!(
            blockchain.check_integrity(),
            Err(ChainViolation::InsufficientWork(1))
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut blockchain, sender) = funded_chain(100.0);
        blockchain
            .add_transaction(transfer(&sender, &Address::from("bob"), 12.5))
            .unwrap();

        let json = blockchain.to_json().unwrap();
        let restored = Blockchain::from_json(&json).unwrap();

        assert_eq!(restored.to_snapshot(), blockchain.to_snapshot());
        assert_eq!(restored.to_json().unwrap(), json);
        assert!(restored.is_valid());
        assert_eq!(
            restored.get_balance(sender.address()),
            blockchain.get_balance(sender.address())
        );
        assert_eq!(restored.pending_transactions(), blockchain.pending_transactions());
    }

    #[test]
    fn test_snapshot_shape() {
        let blockchain = Blockchain::new(1, 100.0);
        let value = serde_json::to_value(blockchain.to_snapshot()).unwrap();

        assert_eq!(value["difficulty"], 1);
        assert_eq!(value["mining_reward"], 100.0);
        assert!(value["pending_transactions"].as_array().unwrap().is_empty());
        let genesis = &value["chain"][0];
        for key in ["timestamp", "transactions", "previous_hash", "nonce", "hash"] {
            assert!(genesis.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_empty_snapshot_rejected() {
        let snapshot = LedgerSnapshot {
            chain: Vec::new(),
            difficulty: 2,
            mining_reward: 100.0,
            pending_transactions: Vec::new(),
        };

        assert!(matches!(
            Blockchain::from_snapshot(snapshot),
            Err(BlockchainError::EmptyChain)
        ));
        assert!(matches!(
            Blockchain::from_json("{not json"),
            Err(BlockchainError::SerializationError(_))
        ));
    }

    #[test]
    fn test_unreachable_difficulty_rejected() {
        let blockchain = Blockchain::new(1, 100.0);

        let mut snapshot = blockchain.to_snapshot();
        snapshot.difficulty = MAX_DIFFICULTY + 1;
        assert!(matches!(
            Blockchain::from_snapshot(snapshot),
            Err(BlockchainError::InvalidDifficulty(65))
        ));

        let mut value = serde_json::to_value(blockchain.to_snapshot()).unwrap();
        value["difficulty"] = serde_json::json!(1_000);
        assert!(matches!(
            Blockchain::from_json(&value.to_string()),
            Err(BlockchainError::InvalidDifficulty(1_000))
        ));
    }

    #[test]
    fn test_snapshot_with_other_difficulty_is_invalid() {
        let blockchain = Blockchain::new(1, 100.0);
        let mut snapshot = blockchain.to_snapshot();
        snapshot.difficulty = 3;

        let restored = Blockchain::from_snapshot(snapshot).unwrap();
        assert!(!restored.is_valid());
    }

    #[test]
    fn test_stats() {
        let (blockchain, _) = funded_chain(100.0);
        let stats = blockchain.stats();

        assert_eq!(stats.total_blocks, 3);
        assert_eq!(stats.total_transactions, 1);
        assert_eq!(stats.pending_count, 1);
        assert!(stats.is_valid);
        assert_eq!(
            blockchain.to_string(),
            "Blockchain(blocks=3, difficulty=1, pending=1)"
        );
    }
}
