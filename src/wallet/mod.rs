use rand::rngs::OsRng;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey, ecdsa::Signature};

use crate::error::WalletError;

/// A secp256k1 key pair. The address is the hex of the compressed public key.
#[derive(Debug, Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Hex of the compressed (33 byte) public key.
    pub fn address(&self) -> String {
        hex::encode(self.public.serialize())
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret.secret_bytes())
    }
}

/// Curve context used for every signing and verification step.
///
/// Built once by the owner (usually the `Blockchain`) and passed by reference
/// to whoever needs it.
#[derive(Debug, Clone)]
pub struct CurveContext {
    secp: Secp256k1<All>,
}

impl Default for CurveContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CurveContext {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Generate a fresh key pair from the OS random source.
    pub fn generate_keypair(&self) -> KeyPair {
        let (secret, public) = self.secp.generate_keypair(&mut OsRng);
        KeyPair { secret, public }
    }

    /// Restore a key pair from a hex-encoded 32 byte secret.
    pub fn keypair_from_secret_hex(&self, secret_hex: &str) -> Result<KeyPair, WalletError> {
        let bytes = hex::decode(secret_hex)
            .map_err(|e| WalletError::InvalidSecretKey(e.to_string()))?;
        let secret =
            SecretKey::from_slice(&bytes).map_err(|e| WalletError::InvalidSecretKey(e.to_string()))?;
        let public = PublicKey::from_secret_key(&self.secp, &secret);
        Ok(KeyPair { secret, public })
    }

    /// Sign a 32 byte digest and return the hex-encoded DER signature.
    pub fn sign_digest(&self, key: &KeyPair, digest: [u8; 32]) -> String {
        let msg = Message::from_digest(digest);
        let signature = self.secp.sign_ecdsa(&msg, &key.secret);
        hex::encode(signature.serialize_der().to_vec())
    }

    /// Verify a hex DER signature over `digest` against a hex public key.
    ///
    /// `Ok(false)` means the signature parsed but does not match.
    pub fn verify_digest(
        &self,
        pubkey_hex: &str,
        sig_hex: &str,
        digest: [u8; 32],
    ) -> Result<bool, WalletError> {
        let public = parse_public_key(pubkey_hex)?;

        let sig_bytes =
            hex::decode(sig_hex).map_err(|e| WalletError::MalformedSignature(e.to_string()))?;
        let signature = Signature::from_der(&sig_bytes)
            .map_err(|e| WalletError::MalformedSignature(e.to_string()))?;

        let msg = Message::from_digest(digest);
        Ok(self.secp.verify_ecdsa(&msg, &signature, &public).is_ok())
    }
}

fn parse_public_key(pubkey_hex: &str) -> Result<PublicKey, WalletError> {
    let bytes =
        hex::decode(pubkey_hex).map_err(|e| WalletError::InvalidPublicKey(e.to_string()))?;
    PublicKey::from_slice(&bytes).map_err(|e| WalletError::InvalidPublicKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    fn digest(data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    #[test]
    fn address_is_compressed_pubkey_hex() {
        let curve = CurveContext::new();
        let key = curve.generate_keypair();
        let addr = key.address();
        assert_eq!(addr.len(), 66);
        assert!(addr.starts_with("02") || addr.starts_with("03"));
    }

    #[test]
    fn keypair_restores_from_secret_hex() {
        let curve = CurveContext::new();
        let key = curve.generate_keypair();
        let restored = curve.keypair_from_secret_hex(&key.secret_hex()).unwrap();
        assert_eq!(key.address(), restored.address());
    }

    #[test]
    fn rejects_bad_secret() {
        let curve = CurveContext::new();
        assert!(matches!(
            curve.keypair_from_secret_hex("zz"),
            Err(WalletError::InvalidSecretKey(_))
        ));
        // all-zero scalar is not a valid secret
        assert!(matches!(
            curve.keypair_from_secret_hex(&"00".repeat(32)),
            Err(WalletError::InvalidSecretKey(_))
        ));
    }

    #[test]
    fn signature_verifies_only_for_signer() {
        let curve = CurveContext::new();
        let alice = curve.generate_keypair();
        let bob = curve.generate_keypair();
        let msg = digest(b"alice pays bob");

        let sig = curve.sign_digest(&alice, msg);
        assert!(curve.verify_digest(&alice.address(), &sig, msg).unwrap());
        assert!(!curve.verify_digest(&bob.address(), &sig, msg).unwrap());
        assert!(!curve
            .verify_digest(&alice.address(), &sig, digest(b"other"))
            .unwrap());
    }

    #[test]
    fn malformed_inputs_are_errors() {
        let curve = CurveContext::new();
        let key = curve.generate_keypair();
        let msg = digest(b"x");

        assert!(matches!(
            curve.verify_digest("not-hex", "00", msg),
            Err(WalletError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            curve.verify_digest(&key.address(), "deadbeef", msg),
            Err(WalletError::MalformedSignature(_))
        ));
    }
}
