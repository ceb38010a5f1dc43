use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::mining::MiningLimits;
use super::{GENESIS_PREVIOUS_HASH, GENESIS_TIMESTAMP, HASH_HEX_LEN};
use crate::error::{MiningError, TransactionError};
use crate::transaction::Transaction;
use crate::wallet::CurveContext;

/// A single block in the blockchain holding a list of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: i64, // Unix timestamp (UTC)
    pub previous_hash: String,
    pub nonce: u64,   // Proof-of-Work nonce
    pub hash: String, // Cached hash of the block
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create the genesis block (first block in the chain). Always identical.
    pub fn genesis() -> Self {
        Self::with_timestamp(GENESIS_TIMESTAMP, GENESIS_PREVIOUS_HASH.to_string(), Vec::new())
    }

    /// Create a new block (not mined yet). Call `mine()` to perform PoW.
    pub fn new(previous_hash: String, transactions: Vec<Transaction>) -> Self {
        Self::with_timestamp(Utc::now().timestamp(), previous_hash, transactions)
    }

    pub fn with_timestamp(
        timestamp: i64,
        previous_hash: String,
        transactions: Vec<Transaction>,
    ) -> Self {
        let mut block = Self {
            timestamp,
            previous_hash,
            nonce: 0,
            hash: String::new(),
            transactions,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Hex SHA-256 of `"{timestamp}:{previous_hash}:{nonce}:{txs}"`, where
    /// `txs` is the JSON array of `Transaction::canonical_json` records in
    /// block order.
    pub fn compute_hash(&self) -> String {
        let txs: Vec<serde_json::Value> = self
            .transactions
            .iter()
            .map(Transaction::canonical_json)
            .collect();
        let preimage = format!(
            "{}:{}:{}:{}",
            self.timestamp,
            self.previous_hash,
            self.nonce,
            serde_json::Value::Array(txs)
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Perform Proof-of-Work by finding a nonce that yields a hash
    /// starting with `difficulty` leading zeros (in hex).
    ///
    /// Returns the number of hashes tried.
    pub fn mine(&mut self, difficulty: u32, limits: &MiningLimits) -> Result<u64, MiningError> {
        if difficulty as usize > HASH_HEX_LEN {
            return Err(MiningError::UnreachableDifficulty(difficulty));
        }

        let mut attempts: u64 = 0;
        loop {
            self.hash = self.compute_hash();
            attempts += 1;
            if meets_difficulty(&self.hash, difficulty) {
                info!("Mining done: {} (nonce {}, {} attempts)", self.hash, self.nonce, attempts);
                return Ok(attempts);
            }
            limits.check(attempts)?;
            self.nonce = self
                .nonce
                .checked_add(1)
                .ok_or(MiningError::NonceSpaceExhausted)?;
        }
    }

    /// True when every transaction verifies. Stops at the first failure.
    pub fn has_valid_transactions(&self, curve: &CurveContext) -> Result<bool, TransactionError> {
        for tx in &self.transactions {
            if !tx.is_valid(curve)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Whether the first `difficulty` hex chars of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let d = difficulty as usize;
    hash.len() >= d && hash.bytes().take(d).all(|b| b == b'0')
}
