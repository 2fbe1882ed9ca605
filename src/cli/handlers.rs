use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;

use pow_ledger::blockchain::{generate_wallets, ChainStats, WalletExport};
use pow_ledger::{Address, Block, Blockchain, Transaction, Wallet};

/// Response for the chain command
#[derive(Serialize)]
pub struct ChainResponse<'a> {
    /// The length of the chain
    pub length: usize,

    /// The blocks in the chain
    pub chain: &'a [Block],

    /// Whether the chain is valid
    pub is_valid: bool,
}

/// Response for the send command
#[derive(Serialize)]
pub struct TransactionResponse {
    pub message: String,
    pub transaction: Transaction,
    pub pending_count: usize,
}

/// Response for the mine command
#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub block: Block,
}

/// Response for the balance command
#[derive(Serialize)]
pub struct BalanceResponse<'a> {
    pub address: String,
    pub balance: f64,
    pub transactions: Vec<&'a Transaction>,
}

/// Response for the block command
#[derive(Serialize)]
pub struct BlockResponse<'a> {
    pub index: usize,
    pub block: &'a Block,
    pub previous_block: Option<usize>,
    pub next_block: Option<usize>,
}

/// Response for the status and reset commands
#[derive(Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub stats: ChainStats,
    pub latest_hash: String,
}

fn parse_address(address: &str) -> Result<Address> {
    address
        .parse()
        .with_context(|| format!("Invalid address: {}", address))
}

/// Generates `count` wallets; the private keys must be stored by the caller
pub fn create_wallets(count: usize) -> Result<Value> {
    if count == 0 {
        return Err(anyhow!("count must be at least 1"));
    }

    let wallets: Vec<WalletExport> = generate_wallets(count);
    Ok(serde_json::to_value(wallets)?)
}

pub fn import_wallet(private_key: &str) -> Result<Value> {
    let wallet = Wallet::from_private_key(private_key).context("Invalid private key")?;
    Ok(serde_json::to_value(wallet.export())?)
}

/// Signs a transfer with `private_key` and submits it to the pending pool
pub fn new_transaction(
    blockchain: &mut Blockchain,
    private_key: &str,
    to: &str,
    amount: f64,
) -> Result<Value> {
    let wallet = Wallet::from_private_key(private_key).context("Invalid private key")?;
    let recipient = parse_address(to)?;

    let mut transaction = Transaction::new(Some(wallet.address().clone()), recipient, amount);
    transaction.sign(&wallet)?;

    blockchain
        .add_transaction(transaction.clone())
        .context("Failed to add transaction")?;

    Ok(serde_json::to_value(TransactionResponse {
        message: "Transaction added to the pending pool".to_string(),
        transaction,
        pending_count: blockchain.pending_transactions().len(),
    })?)
}

pub fn mine_block(blockchain: &mut Blockchain, reward_address: &str) -> Result<Value> {
    let reward_address = parse_address(reward_address)?;
    let block = blockchain.mine_pending_transactions(&reward_address).clone();

    Ok(serde_json::to_value(MineResponse {
        message: format!("New block mined at height {}", blockchain.len() - 1),
        block,
    })?)
}

pub fn get_wallet_balance(blockchain: &Blockchain, address: &str) -> Result<Value> {
    let address = parse_address(address)?;

    Ok(serde_json::to_value(BalanceResponse {
        balance: blockchain.get_balance(&address),
        transactions: blockchain.get_transactions_for(&address),
        address: address.0,
    })?)
}

pub fn get_pending_transactions(blockchain: &Blockchain) -> Result<Value> {
    Ok(serde_json::to_value(blockchain.pending_transactions())?)
}

pub fn get_block(blockchain: &Blockchain, index: usize) -> Result<Value> {
    let block = blockchain
        .block(index)
        .ok_or_else(|| anyhow!("Block {} not found, chain has {} blocks", index, blockchain.len()))?;

    Ok(serde_json::to_value(BlockResponse {
        index,
        block,
        previous_block: index.checked_sub(1),
        next_block: Some(index + 1).filter(|next| *next < blockchain.len()),
    })?)
}

pub fn get_chain(blockchain: &Blockchain) -> Result<Value> {
    Ok(serde_json::to_value(ChainResponse {
        length: blockchain.len(),
        chain: blockchain.chain(),
        is_valid: blockchain.is_valid(),
    })?)
}

pub fn validate_chain(blockchain: &Blockchain) -> Result<Value> {
    let response = match blockchain.check_integrity() {
        Ok(()) => serde_json::json!({ "is_valid": true }),
        Err(violation) => serde_json::json!({
            "is_valid": false,
            "reason": violation.to_string(),
        }),
    };

    Ok(response)
}

pub fn get_status(blockchain: &Blockchain) -> Result<Value> {
    Ok(serde_json::to_value(StatusResponse {
        stats: blockchain.stats(),
        latest_hash: blockchain.get_last_block().hash.clone(),
    })?)
}
