//! A small proof-of-work ledger: signed transfers, blocks linked by SHA-256,
//! brute-force nonce search and balances replayed from the whole chain.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod transaction;
pub mod wallet;

pub use blockchain::{Block, Blockchain, CancelFlag, MiningLimits, SharedBlockchain};
pub use config::LedgerConfig;
pub use error::{ChainError, ConfigError, MiningError, TransactionError, WalletError};
pub use transaction::{Origin, Transaction};
pub use wallet::{CurveContext, KeyPair};
