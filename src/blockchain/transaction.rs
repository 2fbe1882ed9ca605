use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use std::fmt;

use super::crypto::{short, verify_signature, Address, CryptoError, DigitalSignature, Wallet};

/// Errors that can occur during transaction operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Wallet {wallet} cannot sign transactions sent from {sender}")]
    OwnershipMismatch { wallet: String, sender: String },

    #[error("No signature in this transaction")]
    MissingSignature,

    #[error("Transaction is already signed")]
    AlreadySigned,

    #[error("Crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}

/// Seconds since the Unix epoch with microsecond resolution
pub fn unix_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Represents a transaction in the blockchain
///
/// Serializes as the `{from, to, amount, timestamp, signature}` record; absent
/// sender and signature are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's address, `None` for a mining reward
    #[serde(rename = "from")]
    pub sender: Option<Address>,

    /// Recipient's address
    #[serde(rename = "to")]
    pub recipient: Address,

    /// Amount being transferred
    pub amount: f64,

    /// Creation time, seconds since the Unix epoch
    pub timestamp: f64,

    /// Signature over `content_hash()`
    pub signature: Option<DigitalSignature>,
}

impl Transaction {
    /// Creates a new unsigned transaction stamped with the current time
    pub fn new(sender: Option<Address>, recipient: Address, amount: f64) -> Self {
        Transaction {
            sender,
            recipient,
            amount,
            timestamp: unix_timestamp(),
            signature: None,
        }
    }

    /// Creates a new reward transaction (no sender, never signed)
    pub fn new_reward(recipient: Address, amount: f64) -> Self {
        Self::new(None, recipient, amount)
    }

    /// Checks if the transaction mints new value
    pub fn is_reward(&self) -> bool {
        self.sender.is_none()
    }

    /// SHA-256 over `sender || recipient || amount || timestamp`, lowercase hex.
    ///
    /// An absent sender contributes the empty string. Numbers use the shortest
    /// representation that round-trips, so a decoded record hashes the same.
    pub fn content_hash(&self) -> String {
        let sender = self.sender.as_ref().map(Address::as_str).unwrap_or("");
        let preimage = format!("{}{}{}{}", sender, self.recipient, self.amount, self.timestamp);

        hex::encode(Sha256::digest(preimage.as_bytes()))
    }

    /// Signs the transaction with the sender's wallet
    ///
    /// # Arguments
    ///
    /// * `wallet` - The wallet owning the sender address
    ///
    /// # Returns
    ///
    /// `OwnershipMismatch` if the wallet does not own the sender address (or
    /// there is no sender), `AlreadySigned` if a signature is already set
    pub fn sign(&mut self, wallet: &Wallet) -> Result<(), TransactionError> {
        match &self.sender {
            Some(sender) if sender == wallet.address() => {}
            other => {
                return Err(TransactionError::OwnershipMismatch {
                    wallet: wallet.public_address(),
                    sender: other.as_ref().map(|a| a.0.clone()).unwrap_or_default(),
                });
            }
        }

        if self.signature.is_some() {
            return Err(TransactionError::AlreadySigned);
        }

        let hash = self.content_hash();
        self.signature = Some(wallet.sign(hash.as_bytes()));

        Ok(())
    }

    /// Checks the transaction's authorization.
    ///
    /// Reward transactions are always valid. Otherwise an unsigned transaction
    /// is an error and a signed one reports the verification verdict.
    pub fn is_valid(&self) -> Result<bool, TransactionError> {
        let sender = match &self.sender {
            None => return Ok(true),
            Some(sender) => sender,
        };

        let signature = match &self.signature {
            Some(signature) if !signature.0.is_empty() => signature,
            _ => return Err(TransactionError::MissingSignature),
        };

        Ok(verify_signature(
            sender.as_str(),
            self.content_hash().as_bytes(),
            signature.as_str(),
        ))
    }

    /// Checks whether `address` sends or receives in this transaction
    pub fn involves(&self, address: &Address) -> bool {
        self.sender.as_ref() == Some(address) || &self.recipient == address
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sender = self
            .sender
            .as_ref()
            .map(|a| short(a.as_str()))
            .unwrap_or("MINING");
        write!(
            f,
            "Transaction({}... -> {}... : {})",
            sender,
            short(self.recipient.as_str()),
            self.amount
        )
    }
}
