use anyhow::{Context, Result};
use log::{info, warn};

use std::fs;
use std::path::{Path, PathBuf};

use pow_ledger::{Blockchain, LedgerConfig};

/// Keeps the ledger snapshot in a JSON file between invocations
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        SnapshotStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored ledger, or creates a fresh one from `config` when no
    /// snapshot exists yet
    pub fn load_or_init(&self, config: &LedgerConfig) -> Result<Blockchain> {
        if !self.path.exists() {
            info!(
                "No existing ledger found at {}, creating genesis block",
                self.path.display()
            );
            return Ok(Blockchain::with_config(config));
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let blockchain = Blockchain::from_json(&json)
            .with_context(|| format!("Failed to decode snapshot {}", self.path.display()))?
            .with_mining_workers(config.mining_workers);

        if blockchain.difficulty() != config.difficulty {
            warn!(
                "Snapshot difficulty {} overrides configured difficulty {}",
                blockchain.difficulty(),
                config.difficulty
            );
        }

        info!("Loaded {} from {}", blockchain, self.path.display());
        Ok(blockchain)
    }

    /// Writes the snapshot next to the target and renames it into place
    pub fn save(&self, blockchain: &Blockchain) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&blockchain.to_snapshot())?;
        let temp_path = self.path.with_extension("json.tmp");

        fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }

    /// Deletes the stored snapshot if there is one
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
            info!("Removed ledger snapshot {}", self.path.display());
        }

        Ok(())
    }
}
