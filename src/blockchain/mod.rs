pub mod block;
pub mod mining;
pub mod model;
pub mod shared;

pub use block::{Block, meets_difficulty};
pub use mining::{CancelFlag, MiningLimits};
pub use model::Blockchain;
pub use shared::SharedBlockchain;

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Reward credited to the miner of each block.
pub const MINING_REWARD: i64 = 50;

/// Length of a block hash in hex characters; no difficulty can exceed it.
pub const HASH_HEX_LEN: usize = 64;

/// Genesis block timestamp: 2019-01-01T00:00:00Z.
pub const GENESIS_TIMESTAMP: i64 = 1_546_300_800;

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0000";
