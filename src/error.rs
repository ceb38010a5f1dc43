use thiserror::Error;

/// Failures while handling keys and signatures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}

/// Failures while signing or checking a single transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// The signing key does not belong to the transaction's sender.
    #[error("key {signer} is not allowed to sign for this sender")]
    Unauthorized { signer: String },

    #[error("no signature found")]
    MissingSignature,
}

/// Reasons a nonce search stops without a solution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MiningError {
    #[error("no valid nonce found within {attempts} attempts")]
    Exhausted { attempts: u64 },

    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("nonce space exhausted")]
    NonceSpaceExhausted,

    #[error("difficulty {0} exceeds the hash length")]
    UnreachableDifficulty(u32),
}

/// Errors surfaced by chain operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("transaction must include from and to address")]
    IncompleteTransaction,

    #[error("cannot add invalid transaction to chain")]
    InvalidSignature,

    #[error("transaction amount must not be negative, got {0}")]
    NegativeAmount(i64),

    #[error("mined block no longer extends the chain tip")]
    StaleBlock,

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Mining(#[from] MiningError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("difficulty {0} is out of range (0..=64)")]
    DifficultyOutOfRange(u32),

    #[error("mining reward must not be negative, got {0}")]
    NegativeReward(i64),
}
