// CLI module
//
// The command-line caller of the ledger: it owns persistence (a JSON snapshot
// file) and presentation (JSON on stdout), the two concerns the core leaves
// to its caller.

pub mod args;
pub mod handlers;
pub mod store;

use anyhow::{Context, Result};
use log::info;
use serde_json::Value;

use pow_ledger::{Blockchain, LedgerConfig};

use args::{Cli, Command, WalletCommand};
use store::SnapshotStore;

/// Runs one command and returns its JSON response
pub fn run(cli: Cli) -> Result<Value> {
    let config = LedgerConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let store = SnapshotStore::new(&cli.state);

    match cli.command {
        Command::Wallet(WalletCommand::New { count }) => handlers::create_wallets(count),
        Command::Wallet(WalletCommand::Import { private_key }) => {
            handlers::import_wallet(&private_key)
        }
        Command::Send {
            private_key,
            to,
            amount,
        } => {
            let mut blockchain = store.load_or_init(&config)?;
            let response = handlers::new_transaction(&mut blockchain, &private_key, &to, amount)?;
            store.save(&blockchain)?;
            Ok(response)
        }
        Command::Mine { reward_address } => {
            let mut blockchain = store.load_or_init(&config)?;
            let response = handlers::mine_block(&mut blockchain, &reward_address)?;
            store.save(&blockchain)?;
            Ok(response)
        }
        Command::Balance { address } => {
            handlers::get_wallet_balance(&store.load_or_init(&config)?, &address)
        }
        Command::Pending => handlers::get_pending_transactions(&store.load_or_init(&config)?),
        Command::Block { index } => handlers::get_block(&store.load_or_init(&config)?, index),
        Command::Chain => handlers::get_chain(&store.load_or_init(&config)?),
        Command::Validate => handlers::validate_chain(&store.load_or_init(&config)?),
        Command::Status => handlers::get_status(&store.load_or_init(&config)?),
        Command::Reset => {
            store.reset()?;
            info!("Starting a fresh ledger at {}", store.path().display());
            let blockchain = Blockchain::with_config(&config);
            store.save(&blockchain)?;
            handlers::get_status(&blockchain)
        }
    }
}
