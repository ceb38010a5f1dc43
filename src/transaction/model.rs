use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TransactionError;
use crate::wallet::{CurveContext, KeyPair};

/// Where the value of a transaction comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Issued by the ledger itself (mining rewards). Has no signer.
    Sentinel,
    /// Hex address (compressed public key) of the sending account.
    Account(String),
}

impl Origin {
    pub fn account(&self) -> Option<&str> {
        match self {
            Origin::Sentinel => None,
            Origin::Account(addr) => Some(addr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Origin,
    pub to: String,
    pub amount: i64,
    /// Hex-encoded DER ECDSA signature
    pub signature: Option<String>,
}

impl Transaction {
    pub fn new(from: Origin, to: impl Into<String>, amount: i64) -> Self {
        Self {
            from,
            to: to.into(),
            amount,
            signature: None,
        }
    }

    /// Unsigned transfer between two accounts.
    pub fn transfer(from: impl Into<String>, to: impl Into<String>, amount: i64) -> Self {
        Self::new(Origin::Account(from.into()), to, amount)
    }

    /// Reward issued to a miner; needs no signature.
    pub fn reward(miner: impl Into<String>, amount: i64) -> Self {
        Self::new(Origin::Sentinel, miner, amount)
    }

    /// Canonical signing payload (JSON) covering sender, recipient and amount.
    /// The signature itself is excluded.
    pub fn signing_payload(&self) -> Vec<u8> {
        let payload = serde_json::json!({
            "from": self.from.account(),
            "to": self.to,
            "amount": self.amount,
        });
        payload.to_string().into_bytes()
    }

    /// SHA-256 of the signing payload.
    pub fn sighash(&self) -> [u8; 32] {
        Sha256::digest(self.signing_payload()).into()
    }

    pub fn hash(&self) -> String {
        hex::encode(self.sighash())
    }

    /// Full record as hashed into a block, signature included.
    pub fn canonical_json(&self) -> serde_json::Value {
        serde_json::json!({
            "from": self.from.account(),
            "to": self.to,
            "amount": self.amount,
            "signature": self.signature,
        })
    }

    /// Sign with `key`, which must belong to the sending account.
    pub fn sign(&mut self, key: &KeyPair, curve: &CurveContext) -> Result<(), TransactionError> {
        let signer = key.address();
        if self.from.account() != Some(signer.as_str()) {
            return Err(TransactionError::Unauthorized { signer });
        }
        self.signature = Some(curve.sign_digest(key, self.sighash()));
        Ok(())
    }

    /// Check the signature against the sender's public key.
    ///
    /// Sentinel-origin transactions carry no signature and are accepted as is.
    /// A sender address or signature that does not parse never verifies.
    pub fn is_valid(&self, curve: &CurveContext) -> Result<bool, TransactionError> {
        let from = match &self.from {
            Origin::Sentinel => return Ok(true),
            Origin::Account(addr) => addr,
        };

        let signature = match self.signature.as_deref() {
            Some(sig) if !sig.is_empty() => sig,
            _ => return Err(TransactionError::MissingSignature),
        };

        match curve.verify_digest(from, signature, self.sighash()) {
            Ok(ok) => Ok(ok),
            Err(e) => {
                debug!("transaction {} does not verify: {}", self.hash(), e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_transfer_is_valid() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let mut tx = Transaction::transfer(alice.address(), "bob", 10);
        tx.sign(&alice, &curve).unwrap();

        assert!(tx.signature.is_some());
        assert_eq!(tx.is_valid(&curve), Ok(true));
    }

    #[test]
    fn signing_with_foreign_key_is_unauthorized() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let mallory = curve.generate_keypair();
        let mut tx = Transaction::transfer(alice.address(), "bob", 10);

        let err = tx.sign(&mallory, &curve).unwrap_err();
        assert_eq!(
            err,
            TransactionError::Unauthorized {
                signer: mallory.address()
            }
        );
        assert!(tx.signature.is_none());
    }

    #[test]
    fn reward_cannot_be_signed() {
        let curve = CurveContext::new();
        let miner = curve.generate_keypair();
        let mut tx = Transaction::reward(miner.address(), 50);
        assert!(matches!(
            tx.sign(&miner, &curve),
            Err(TransactionError::Unauthorized { .. })
        ));
    }

    #[test]
    fn unsigned_transfer_reports_missing_signature() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let mut tx = Transaction::transfer(alice.address(), "bob", 10);
        assert_eq!(tx.is_valid(&curve), Err(TransactionError::MissingSignature));

        tx.signature = Some(String::new());
        assert_eq!(tx.is_valid(&curve), Err(TransactionError::MissingSignature));
    }

    #[test]
    fn reward_is_valid_without_signature() {
        let curve = CurveContext::new();
        let tx = Transaction::reward("miner", 50);
        assert_eq!(tx.is_valid(&curve), Ok(true));
    }

    #[test]
    fn tampered_amount_fails_verification() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let mut tx = Transaction::transfer(alice.address(), "bob", 10);
        tx.sign(&alice, &curve).unwrap();

        tx.amount = 1_000;
        assert_eq!(tx.is_valid(&curve), Ok(false));
    }

    #[test]
    fn signature_does_not_verify_under_other_key() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let bob = curve.generate_keypair();
        let mut tx = Transaction::transfer(alice.address(), "carol", 5);
        tx.sign(&alice, &curve).unwrap();

        // Same signature, sender swapped for another real key.
        tx.from = Origin::Account(bob.address());
        assert_eq!(tx.is_valid(&curve), Ok(false));
    }

    #[test]
    fn garbage_signature_is_invalid_not_an_error() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let mut tx = Transaction::transfer(alice.address(), "bob", 1);
        tx.signature = Some("not a signature".into());
        assert_eq!(tx.is_valid(&curve), Ok(false));
    }

    #[test]
    fn malformed_sender_address_is_invalid() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let mut tx = Transaction::transfer(alice.address(), "bob", 1);
        tx.sign(&alice, &curve).unwrap();

        // odd-length hex, then valid hex that is not a curve point
        for sender in ["alice", "abcd"] {
            tx.from = Origin::Account(sender.into());
            assert_eq!(tx.is_valid(&curve), Ok(false));
        }
    }

    #[test]
    fn sighash_ignores_signature() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let mut tx = Transaction::transfer(alice.address(), "bob", 3);
        let before = tx.hash();
        tx.sign(&alice, &curve).unwrap();
        assert_eq!(before, tx.hash());
        assert_eq!(tx.hash().len(), 64);
    }
}
