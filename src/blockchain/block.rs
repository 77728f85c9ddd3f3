use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Sentinel sender address used for mining rewards.
pub const MINING_SENDER: &str = "0";
/// Amount credited to a miner per sealed block.
pub const MINING_REWARD: u64 = 1;

/// A transfer between two opaque addresses. Nothing economic is checked
/// here; the ledger only cares about structure and proof-of-work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// The coinbase-style transaction crediting a miner.
    pub fn reward(recipient: &str) -> Self {
        Transaction::new(MINING_SENDER, recipient, MINING_REWARD)
    }
}

/// One committed entry of the ledger. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Block {
        Block {
            index,
            timestamp: unix_timestamp(),
            transactions,
            proof,
            previous_hash,
        }
    }
}

/// Seconds since the epoch, with sub-second resolution.
fn unix_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
