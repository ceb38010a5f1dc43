use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::{debug, warn};

use super::mining::MiningLimits;
use super::{Block, Blockchain};
use crate::error::{ChainError, TransactionError};
use crate::transaction::Transaction;

/// Thread-safe handle around a `Blockchain`.
///
/// Submissions only hold the lock briefly. Mining drains the pending queue in
/// one locked step, searches for a nonce without the lock, then relocks to
/// append, so transactions submitted meanwhile stay queued behind the reward.
#[derive(Debug, Default)]
pub struct SharedBlockchain {
    inner: Mutex<Blockchain>,
}

impl SharedBlockchain {
    pub fn new(blockchain: Blockchain) -> Self {
        Self {
            inner: Mutex::new(blockchain),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Blockchain> {
        // A panic elsewhere never leaves the chain half-written: every
        // mutation is a single push or swap.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_transaction(&self, tx: Transaction) -> Result<(), ChainError> {
        self.lock().add_transaction(tx)
    }

    /// Mine the current queue. Returns a copy of the appended block.
    pub fn mine_pending_transactions(
        &self,
        miner_address: &str,
        limits: &MiningLimits,
    ) -> Result<Block, ChainError> {
        let (mut block, difficulty) = {
            let mut bc = self.lock();
            (bc.begin_round(), bc.difficulty())
        };

        let t0 = Instant::now();
        let mined = block.mine(difficulty, limits);
        debug!(
            "nonce search over {} transactions took {} ms",
            block.transactions.len(),
            t0.elapsed().as_millis()
        );

        let mut bc = self.lock();
        if let Err(e) = mined {
            warn!("mining stopped: {e}");
            bc.requeue(block.transactions);
            return Err(e.into());
        }

        let appended = block.clone();
        bc.finish_round(block, miner_address)?;
        Ok(appended)
    }

    pub fn is_valid(&self) -> Result<bool, TransactionError> {
        self.lock().is_blockchain_valid()
    }

    pub fn balance_of(&self, address: &str) -> i128 {
        self.lock().get_balance_of_address(address)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending_transactions().len()
    }

    /// Run `f` against the chain while holding the lock.
    pub fn snapshot<R>(&self, f: impl FnOnce(&Blockchain) -> R) -> R {
        f(&self.lock())
    }
}
