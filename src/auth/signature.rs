//! Wallet signature verification.
//!
//! Clients sign a plain-text message with `personal_sign` (EIP-191). The
//! server recovers the secp256k1 public key from the 65-byte signature,
//! derives its address and compares it with the claimed wallet.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature is not valid hex")]
    Encoding,
    #[error("signature must be 65 bytes, got {0}")]
    Length(usize),
    #[error("unsupported recovery id {0}")]
    RecoveryId(u8),
    #[error("signature does not recover to a public key")]
    Recovery,
    #[error("signer {recovered} does not match wallet {claimed}")]
    Mismatch { claimed: String, recovered: String },
}

/// Keccak-256 of the EIP-191 envelope around `message`.
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message.as_bytes());
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Lowercase `0x`-prefixed address of an uncompressed secp256k1 key.
pub fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Recovers the address that produced `signature` over `message`.
pub fn recover_signer(message: &str, signature: &str) -> Result<String, SignatureError> {
    let raw = signature.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).map_err(|_| SignatureError::Encoding)?;
    if bytes.len() != 65 {
        return Err(SignatureError::Length(bytes.len()));
    }

    // Wallets emit v as 27/28; some hardware signers emit 0/1.
    let v = bytes[64];
    let parity = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        other => return Err(SignatureError::RecoveryId(other)),
    };
    let mut recovery_id = RecoveryId::from_byte(parity).ok_or(SignatureError::RecoveryId(v))?;
    let mut sig = Signature::from_slice(&bytes[..64]).map_err(|_| SignatureError::Recovery)?;
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let prehash = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|_| SignatureError::Recovery)?;
    Ok(address_of(&key))
}

/// Checks that `signature` over `message` was produced by `wallet_address`.
pub fn verify_wallet_signature(
    wallet_address: &str,
    message: &str,
    signature: &str,
) -> Result<(), SignatureError> {
    let recovered = recover_signer(message, signature)?;
    if recovered.eq_ignore_ascii_case(wallet_address.trim()) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch {
            claimed: wallet_address.to_string(),
            recovered,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_wallet {
    use k256::ecdsa::SigningKey;

    use super::{address_of, personal_message_hash};

    pub fn key(seed: u8) -> SigningKey {
        SigningKey::from_slice(&[seed; 32]).expect("valid scalar")
    }

    pub fn address(key: &SigningKey) -> String {
        address_of(key.verifying_key())
    }

    /// `personal_sign` output as a wallet would return it.
    pub fn sign(key: &SigningKey, message: &str) -> String {
        let (sig, recid) = key
            .sign_prehash_recoverable(&personal_message_hash(message))
            .expect("sign");
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recid.to_byte() + 27);
        format!("0x{}", hex::encode(bytes))
    }
}
