use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use super::transaction::Transaction;

/// Represents a block in the blockchain
///
/// Serializes as the `{timestamp, transactions, previous_hash, nonce, hash}`
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Creation time, seconds since the Unix epoch
    pub timestamp: f64,

    /// Transactions in commit order; the order is part of the hash
    pub transactions: Vec<Transaction>,

    /// Hash of the previous block
    pub previous_hash: String,

    /// Proof of work
    pub nonce: u64,

    /// Hash of the current block (calculated)
    pub hash: String,
}

impl Block {
    /// Creates a new unmined block
    ///
    /// # Arguments
    ///
    /// * `timestamp` - Creation time, seconds since the Unix epoch
    /// * `transactions` - The transactions to include, in commit order
    /// * `previous_hash` - The hash of the previous block
    ///
    /// # Returns
    ///
    /// A Block with nonce 0 and its hash already computed
    pub fn new(timestamp: f64, transactions: Vec<Transaction>, previous_hash: String) -> Self {
        let mut block = Block {
            timestamp,
            transactions,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };

        block.hash = block.calculate_hash();
        block
    }

    /// Calculates the SHA-256 hash of the block as lowercase hex.
    ///
    /// The preimage is compact JSON with sorted keys:
    /// `{"nonce":..,"previous_hash":..,"timestamp":..,"transactions":[..]}`.
    pub fn calculate_hash(&self) -> String {
        hash_with_nonce(&self.preimage_tail(), self.nonce)
    }

    /// Everything in the preimage after the nonce. It does not change while
    /// mining, so the search serializes it once.
    fn preimage_tail(&self) -> String {
        let body = serde_json::json!({
            "previous_hash": self.previous_hash,
            "timestamp": self.timestamp,
            "transactions": self.transactions,
        })
        .to_string();

        match body.strip_prefix('{') {
            Some(rest) => rest.to_string(),
            None => body,
        }
    }

    /// Checks that the stored hash starts with `difficulty` zero hex digits
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        meets_target(&self.hash, difficulty)
    }

    /// Proof-of-work search: increments the nonce until the hash meets
    /// `difficulty`. Unbounded; an unreachable target never returns.
    pub fn mine(&mut self, difficulty: usize) {
        let tail = self.preimage_tail();
        self.hash = hash_with_nonce(&tail, self.nonce);

        while !meets_target(&self.hash, difficulty) {
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = hash_with_nonce(&tail, self.nonce);
        }

        debug!("Block mined: {} (nonce {})", self.hash, self.nonce);
    }

    /// Same search as [`Block::mine`] sharded over `workers` rayon tasks.
    ///
    /// Worker `w` tries nonces `start + 1 + w`, `start + 1 + w + workers`, ...
    /// The first hit wins and the other workers stop. The winning nonce need
    /// not be the smallest one.
    pub fn mine_parallel(&mut self, difficulty: usize, workers: usize) {
        let tail = self.preimage_tail();
        self.hash = hash_with_nonce(&tail, self.nonce);

        if workers <= 1 || meets_target(&self.hash, difficulty) {
            return self.mine(difficulty);
        }

        let start = self.nonce;
        let stride = workers as u64;
        let found = AtomicBool::new(false);

        let winner = (0..stride).into_par_iter().find_map_any(|worker| {
            let mut nonce = start.wrapping_add(1).wrapping_add(worker);

            while !found.load(Ordering::Relaxed) {
                let hash = hash_with_nonce(&tail, nonce);
                if meets_target(&hash, difficulty) {
                    found.store(true, Ordering::Relaxed);
                    return Some((nonce, hash));
                }
                nonce = nonce.wrapping_add(stride);
            }

            None
        });

        if let Some((nonce, hash)) = winner {
            self.nonce = nonce;
            self.hash = hash;
            debug!("Block mined by {} workers: {} (nonce {})", workers, self.hash, self.nonce);
        }
    }

    /// Checks every transaction; an unsigned transfer counts as invalid
    pub fn has_valid_transactions(&self) -> bool {
        self.transactions
            .iter()
            .all(|transaction| matches!(transaction.is_valid(), Ok(true)))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block(hash={}..., transactions={}, nonce={})",
            self.hash.get(..20).unwrap_or(&self.hash),
            self.transactions.len(),
            self.nonce
        )
    }
}

fn hash_with_nonce(tail: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"{\"nonce\":");
    hasher.update(nonce.to_string().as_bytes());
    hasher.update(b",");
    hasher.update(tail.as_bytes());
    hex::encode(hasher.finalize())
}

fn meets_target(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::crypto::{Address, Wallet};

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            Transaction::new_reward(Address::from("recipient1"), 10.0),
            Transaction::new_reward(Address::from("recipient2"), 20.0),
        ]
    }

    #[test]
    fn test_new_block() {
        let block = Block::new(1_700_000_000.0, sample_transactions(), "previous_hash".to_string());

        assert_eq!(block.nonce, 0);
        assert_eq!(block.previous_hash, "previous_hash");
        assert_eq!(block.hash, block.calculate_hash());
        assert_eq!(block.hash.len(), 64); // SHA-256 hash is 64 characters in hex
    }

    #[test]
    fn test_preimage_is_sorted_compact_json() {
        let block = Block::new(1483228800.0, Vec::new(), "0".to_string());

        let canonical = serde_json::json!({
            "nonce": 0,
            "previous_hash": "0",
            "timestamp": 1483228800.0,
            "transactions": [],
        })
        .to_string();
        assert_eq!(
            canonical,
            r#"{"nonce":0,"previous_hash":"0","timestamp":1483228800.0,"transactions":[]}"#
        );
        assert_eq!(block.hash, hex::encode(Sha256::digest(canonical.as_bytes())));
    }

    #[test]
    fn test_mining_produces_leading_zeros() {
        let mut block = Block::new(1_700_000_000.0, sample_transactions(), "prev".to_string());
        block.mine(2);

        assert!(block.hash.starts_with("00"));
        assert!(block.meets_difficulty(2));
        assert_eq!(block.hash, block.calculate_hash());
    }

    #[test]
    fn test_parallel_mining_produces_leading_zeros() {
        let mut block = Block::new(1_700_000_000.0, sample_transactions(), "prev".to_string());
        block.mine_parallel(3, 4);

        assert!(block.hash.starts_with("000"));
        assert_eq!(block.hash, block.calculate_hash());
    }

    #[test]
    fn test_mining_is_deterministic() {
        let mut first = Block::new(1483228800.0, Vec::new(), "0".to_string());
        let mut second = first.clone();
        first.mine(2);
        second.mine(2);

        assert_eq!(first, second);
    }

    #[test]
    fn test_order_is_part_of_hash() {
        let transactions = sample_transactions();
        let mut reversed = transactions.clone();
        reversed.reverse();

        let a = Block::new(1.0, transactions, "prev".to_string());
        let b = Block::new(1.0, reversed, "prev".to_string());
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_invalid_when_mutated() {
        let mut block = Block::new(1_700_000_000.0, sample_transactions(), "prev".to_string());
        block.mine(2);

        block.transactions[0].amount = 1_000.0;
        assert_ne!(block.hash, block.calculate_hash());

        block.transactions[0].amount = 10.0;
        assert_eq!(block.hash, block.calculate_hash());

        block.previous_hash = "other".to_string();
        assert_ne!(block.hash, block.calculate_hash());
    }

    #[test]
    fn test_has_valid_transactions() {
        let sender = Wallet::generate();
        let mut transfer =
            Transaction::new(Some(sender.address().clone()), Address::from("bob"), 5.0);

        let unsigned = Block::new(1.0, vec![transfer.clone()], "prev".to_string());
        assert!(!unsigned.has_valid_transactions());

        transfer.sign(&sender).unwrap();
        let mut signed = Block::new(1.0, vec![transfer], "prev".to_string());
        assert!(signed.has_valid_transactions());

        signed.transactions[0].amount = 6.0;
        assert!(!signed.has_valid_transactions());

        let empty = Block::new(1.0, Vec::new(), "prev".to_string());
        assert!(empty.has_valid_transactions());
    }

    #[test]
    fn test_record_round_trip() {
        let mut block = Block::new(1_700_000_000.25, sample_transactions(), "prev".to_string());
        block.mine(1);

        let record = serde_json::to_string(&block).unwrap();
        let decoded: Block = serde_json::from_str(&record).unwrap();

        assert_eq!(decoded, block);
        assert_eq!(decoded.calculate_hash(), block.hash);
    }
}
