// bot/src/utils/encoding.rs
// Кодирование транзакций: base64 для swap API и симуляции, base58 для sendBundle

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use solana_sdk::transaction::VersionedTransaction;

use crate::error::SwapError;

/// Подписанная транзакция в обоих текстовых представлениях
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTransaction {
    pub base64: String,
    pub base58: String,
}

impl EncodedTransaction {
    pub fn from_transaction(tx: &VersionedTransaction) -> Result<Self, SwapError> {
        let base64 = to_base64(&serialize_transaction(tx)?);
        let base58 = base64_to_base58(&base64)?;
        Ok(Self { base64, base58 })
    }
}

/// Сериализация в wire-формат
pub fn serialize_transaction(tx: &VersionedTransaction) -> Result<Vec<u8>, SwapError> {
    bincode::serialize(tx).map_err(|e| SwapError::InvalidTransaction(e.to_string()))
}

pub fn to_base64(bytes: &[u8]) -> String {
    BASE64_ENGINE.encode(bytes)
}

pub fn to_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Перекодирование для sendBundle: relay принимает только base58
pub fn base64_to_base58(encoded: &str) -> Result<String, SwapError> {
    let bytes = BASE64_ENGINE
        .decode(encoded.trim())
        .map_err(|e| SwapError::InvalidTransaction(format!("base64: {}", e)))?;
    Ok(to_base58(&bytes))
}

/// Декодирование транзакции, пришедшей от swap API
pub fn decode_transaction_base64(encoded: &str) -> Result<VersionedTransaction, SwapError> {
    let bytes = BASE64_ENGINE
        .decode(encoded.trim())
        .map_err(|e| SwapError::InvalidTransaction(format!("base64: {}", e)))?;

    bincode::deserialize(&bytes)
        .map_err(|e| SwapError::InvalidTransaction(format!("wire format: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        message::{Message, VersionedMessage},
        pubkey::Pubkey,
        signature::{Keypair, Signer},
    };

    #[allow(deprecated)]
    fn signed_transfer() -> VersionedTransaction {
        let payer = Keypair::new();
        let ix = solana_sdk::system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 42);
        let message = Message::new_with_blockhash(&[ix], Some(&payer.pubkey()), &Hash::new_unique());
        VersionedTransaction::try_new(VersionedMessage::Legacy(message), &[&payer]).unwrap()
    }

    #[test]
    fn test_both_encodings_carry_the_same_bytes() {
        let tx = signed_transfer();
        let encoded = EncodedTransaction::from_transaction(&tx).unwrap();

        let raw = serialize_transaction(&tx).unwrap();
        assert_eq!(bs58::decode(&encoded.base58).into_vec().unwrap(), raw);
        assert_eq!(base64_to_base58(&encoded.base64).unwrap(), encoded.base58);
    }

    #[test]
    fn test_decode_swap_api_payload() {
        let tx = signed_transfer();
        let encoded = to_base64(&serialize_transaction(&tx).unwrap());

        let decoded = decode_transaction_base64(&encoded).unwrap();
        assert_eq!(decoded.signatures, tx.signatures);
        assert_eq!(decoded.message, tx.message);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_transaction_base64("не base64!"),
            Err(SwapError::InvalidTransaction(_))
        ));
        // валидный base64, но не транзакция
        assert!(matches!(
            decode_transaction_base64(&to_base64(&[1, 2, 3])),
            Err(SwapError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_base58_known_value() {
        assert_eq!(to_base58(&[0, 0, 1]), "112");
        assert_eq!(base64_to_base58("AAAB").unwrap(), "112");
    }
}
