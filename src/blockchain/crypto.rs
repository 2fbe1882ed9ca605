use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

/// Shared secp256k1 context; building one is expensive.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Bytes of an address: the raw `X || Y` coordinates, without the SEC1 tag
pub const ADDRESS_SIZE: usize = UNCOMPRESSED_PUBLIC_KEY_SIZE - 1;

/// SEC1 tag byte of an uncompressed point
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Represents a wallet address (raw 64-byte secp256k1 public point in
/// lowercase hex)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Creates a new address from a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Address(hex::encode(&public_key.serialize_uncompressed()[1..]))
    }

    /// Converts the address back into a public key
    pub fn to_public_key(&self) -> Result<PublicKey, CryptoError> {
        let bytes = hex::decode(&self.0).map_err(|e| CryptoError::DecodeError(e.to_string()))?;

        if bytes.len() != ADDRESS_SIZE {
            return Err(CryptoError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                ADDRESS_SIZE,
                bytes.len()
            )));
        }

        let mut encoded = [0u8; UNCOMPRESSED_PUBLIC_KEY_SIZE];
        encoded[0] = UNCOMPRESSED_TAG;
        encoded[1..].copy_from_slice(&bytes);

        PublicKey::from_slice(&encoded).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    /// Parses and normalizes an address; the result is always lowercase hex
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = Address(s.trim().to_ascii_lowercase());
        address.to_public_key()?;
        Ok(address)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}

/// Represents a hex-encoded compact ECDSA signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSignature(pub String);

impl DigitalSignature {
    /// Creates a new digital signature from a signature
    pub fn from_signature(signature: &Signature) -> Self {
        DigitalSignature(hex::encode(signature.serialize_compact()))
    }

    /// Converts the digital signature back into a signature
    pub fn to_signature(&self) -> Result<Signature, CryptoError> {
        let bytes = hex::decode(&self.0).map_err(|e| CryptoError::DecodeError(e.to_string()))?;

        if bytes.len() != COMPACT_SIGNATURE_SIZE {
            return Err(CryptoError::DecodeError(format!(
                "signature must be {} bytes, got {}",
                COMPACT_SIGNATURE_SIZE,
                bytes.len()
            )));
        }

        Signature::from_compact(&bytes).map_err(|e| CryptoError::DecodeError(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DigitalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wallet export record: the only place a private key leaves a `Wallet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletExport {
    pub public_key: String,
    pub private_key: String,
}

/// Represents a wallet with a secp256k1 keypair
#[derive(Debug, Clone)]
pub struct Wallet {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl Wallet {
    /// Creates a new wallet with a random keypair
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    /// Reconstructs a wallet from a hex-encoded private scalar
    ///
    /// Fails with [`CryptoError::DecodeError`] when the input is not hex or is
    /// not a valid scalar for the curve (zero, out of range, wrong length).
    pub fn from_private_key(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| CryptoError::DecodeError(format!("private key is not hex: {}", e)))?;

        let secret_key = SecretKey::from_slice(&bytes)
            .map_err(|e| CryptoError::DecodeError(format!("invalid private key: {}", e)))?;

        Ok(Self::from_secret_key(secret_key))
    }

    fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        let address = Address::from_public_key(&public_key);

        Wallet {
            secret_key,
            public_key,
            address,
        }
    }

    /// Gets the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Gets the wallet's address as a hex string
    pub fn public_address(&self) -> String {
        self.address.0.clone()
    }

    /// Gets the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Signs SHA-256(message) with the wallet's private key (RFC 6979 nonce)
    pub fn sign(&self, message: &[u8]) -> DigitalSignature {
        let message = message_digest(message);
        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &self.secret_key);
        DigitalSignature::from_signature(&signature)
    }

    /// Exports the private scalar as lowercase hex
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    pub fn export(&self) -> WalletExport {
        WalletExport {
            public_key: self.public_address(),
            private_key: self.private_key_hex(),
        }
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wallet(address={}...)", short(self.address.as_str()))
    }
}

/// Generates `count` fresh wallets and returns their export records
pub fn generate_wallets(count: usize) -> Vec<WalletExport> {
    (0..count).map(|_| Wallet::generate().export()).collect()
}

/// Verifies a hex signature over `message` against a hex address.
///
/// Total over arbitrary input: malformed hex, keys or signatures all yield
/// `false`.
pub fn verify_signature(public_address: &str, message: &[u8], signature_hex: &str) -> bool {
    let public_key = match Address(public_address.to_string()).to_public_key() {
        Ok(key) => key,
        Err(_) => return false,
    };

    let signature = match DigitalSignature(signature_hex.to_string()).to_signature() {
        Ok(signature) => signature,
        Err(_) => return false,
    };

    SECP256K1_CONTEXT
        .verify_ecdsa(&message_digest(message), &signature, &public_key)
        .is_ok()
}

fn message_digest(message: &[u8]) -> Message {
    Message::from_digest(Sha256::digest(message).into())
}

/// First 20 characters of an address, for log lines and summaries
pub(crate) fn short(address: &str) -> &str {
    address.get(..20).unwrap_or(address)
}
