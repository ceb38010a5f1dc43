use log::{debug, info, warn};

use super::mining::MiningLimits;
use super::{Block, DEFAULT_DIFFICULTY, MINING_REWARD};
use crate::config::LedgerConfig;
use crate::error::{ChainError, ConfigError, TransactionError};
use crate::transaction::Transaction;
use crate::wallet::CurveContext;

/// Simple in-memory blockchain with Proof-of-Work.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: u32,
    pending_transactions: Vec<Transaction>,
    mining_reward: i64,
    mining_limits: MiningLimits,
    curve: CurveContext,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl Blockchain {
    /// Initialize a new blockchain with a genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: vec![Block::genesis()],
            difficulty,
            pending_transactions: Vec::new(),
            mining_reward: MINING_REWARD,
            mining_limits: MiningLimits::unbounded(),
            curve: CurveContext::new(),
        }
    }

    /// Build a chain from validated settings.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut bc = Self::new(config.difficulty);
        bc.mining_reward = config.mining_reward;
        bc.mining_limits = config.mining_limits();
        Ok(bc)
    }

    /// Return the last block in the chain.
    pub fn latest_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Validate and queue a signed transfer.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<(), ChainError> {
        let has_sender = tx.from.account().is_some_and(|from| !from.is_empty());
        if !has_sender || tx.to.is_empty() {
            warn!("rejected transaction {}: missing from/to address", tx.hash());
            return Err(ChainError::IncompleteTransaction);
        }

        if !tx.is_valid(&self.curve)? {
            warn!("rejected transaction {}: signature does not verify", tx.hash());
            return Err(ChainError::InvalidSignature);
        }

        if tx.amount < 0 {
            warn!("rejected transaction {}: negative amount {}", tx.hash(), tx.amount);
            return Err(ChainError::NegativeAmount(tx.amount));
        }

        // Balance sufficiency is not checked; spending beyond the balance is allowed.
        debug!(
            "transaction {} accepted (pending: {} -> {})",
            tx.hash(),
            self.pending_transactions.len(),
            self.pending_transactions.len() + 1
        );
        self.pending_transactions.push(tx);
        Ok(())
    }

    /// Mine the pending queue into a new block using the configured limits.
    pub fn mine_pending_transactions(&mut self, miner_address: &str) -> Result<&Block, ChainError> {
        let limits = self.mining_limits.clone();
        self.mine_pending_transactions_with(miner_address, &limits)
    }

    /// Mine the pending queue with explicit stop conditions.
    ///
    /// On success the queue is replaced by the miner's reward. On failure the
    /// chain is untouched and the queue is restored.
    pub fn mine_pending_transactions_with(
        &mut self,
        miner_address: &str,
        limits: &MiningLimits,
    ) -> Result<&Block, ChainError> {
        let mut block = self.begin_round();
        debug!(
            "mining block #{} with {} transactions at difficulty {}",
            self.chain.len(),
            block.transactions.len(),
            self.difficulty
        );

        if let Err(e) = block.mine(self.difficulty, limits) {
            warn!("mining block #{} stopped: {}", self.chain.len(), e);
            self.requeue(block.transactions);
            return Err(e.into());
        }

        self.finish_round(block, miner_address)?;
        Ok(self.latest_block())
    }

    /// Take the whole pending queue and wrap it into a candidate block on top
    /// of the current tip.
    pub(crate) fn begin_round(&mut self) -> Block {
        let transactions = std::mem::take(&mut self.pending_transactions);
        Block::new(self.latest_block().hash.clone(), transactions)
    }

    /// Put transactions back at the front of the queue, ahead of anything
    /// submitted since they were taken.
    pub(crate) fn requeue(&mut self, mut transactions: Vec<Transaction>) {
        transactions.append(&mut self.pending_transactions);
        self.pending_transactions = transactions;
    }

    /// Append a mined block and queue the miner's reward.
    pub(crate) fn finish_round(&mut self, block: Block, miner_address: &str) -> Result<(), ChainError> {
        if block.previous_hash != self.latest_block().hash {
            warn!("discarding stale block {}", block.hash);
            self.requeue(block.transactions);
            return Err(ChainError::StaleBlock);
        }

        let mut pending = vec![Transaction::reward(miner_address, self.mining_reward)];
        pending.append(&mut self.pending_transactions);
        self.pending_transactions = pending;

        info!("block #{} appended: {}", self.chain.len(), block.hash);
        self.chain.push(block);
        Ok(())
    }

    /// Validate the entire chain: genesis, hashes, linkage and signatures.
    pub fn is_blockchain_valid(&self) -> Result<bool, TransactionError> {
        // Genesis is fixed and never checked against a predecessor
        let genesis = &self.chain[0];
        if genesis.hash != genesis.compute_hash() || *genesis != Block::genesis() {
            warn!("genesis block has been altered");
            return Ok(false);
        }

        for i in 1..self.chain.len() {
            let current = &self.chain[i];
            let prev = &self.chain[i - 1];

            if current.hash != current.compute_hash() {
                warn!("block #{i}: stored hash does not match contents");
                return Ok(false);
            }

            if current.previous_hash != prev.hash {
                warn!("block #{i}: previous hash does not link to block #{}", i - 1);
                return Ok(false);
            }

            if !current.has_valid_transactions(&self.curve)? {
                warn!("block #{i}: contains an invalid transaction");
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Net balance of `address`, replayed from every block.
    ///
    /// Summed as `i128`, which any number of `i64` amounts cannot overflow.
    pub fn get_balance_of_address(&self, address: &str) -> i128 {
        let mut balance: i128 = 0;
        for tx in self.chain.iter().flat_map(|b| &b.transactions) {
            if tx.from.account() == Some(address) {
                balance -= i128::from(tx.amount);
            }
            if tx.to == address {
                balance += i128::from(tx.amount);
            }
        }
        balance
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    pub fn curve(&self) -> &CurveContext {
        &self.curve
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: u32) {
        // NOTE: Changing difficulty affects future blocks only.
        self.difficulty = difficulty;
    }

    pub fn mining_reward(&self) -> i64 {
        self.mining_reward
    }
}
