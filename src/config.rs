use std::env;
use std::str::FromStr;

use crate::blockchain::{DEFAULT_DIFFICULTY, HASH_HEX_LEN, MINING_REWARD, MiningLimits};
use crate::error::ConfigError;

pub const DIFFICULTY_VAR: &str = "LEDGER_DIFFICULTY";
pub const MINING_REWARD_VAR: &str = "LEDGER_MINING_REWARD";
pub const MAX_MINING_ATTEMPTS_VAR: &str = "LEDGER_MAX_MINING_ATTEMPTS";
pub const MINER_SECRET_VAR: &str = "LEDGER_MINER_SECRET";

/// Ledger settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub difficulty: u32,
    pub mining_reward: i64,
    /// Unset means mining searches until it succeeds.
    pub max_mining_attempts: Option<u64>,
    /// Hex secret key of the miner; a fresh key is generated when unset.
    pub miner_secret: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining_reward: MINING_REWARD,
            max_mining_attempts: None,
            miner_secret: None,
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            difficulty: parse_var(&lookup, DIFFICULTY_VAR)?.unwrap_or(defaults.difficulty),
            mining_reward: parse_var(&lookup, MINING_REWARD_VAR)?.unwrap_or(defaults.mining_reward),
            max_mining_attempts: parse_var(&lookup, MAX_MINING_ATTEMPTS_VAR)?,
            miner_secret: parse_var(&lookup, MINER_SECRET_VAR)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.difficulty as usize > HASH_HEX_LEN {
            return Err(ConfigError::DifficultyOutOfRange(self.difficulty));
        }
        if self.mining_reward < 0 {
            return Err(ConfigError::NegativeReward(self.mining_reward));
        }
        Ok(())
    }

    pub fn mining_limits(&self) -> MiningLimits {
        MiningLimits {
            max_attempts: self.max_mining_attempts,
            cancel: None,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
