// bot/src/executor/signer.rs
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;

use crate::error::SwapError;

/// Подписывает транзакции ключом кошелька. Ключ живёт только в памяти.
pub struct TransactionSigner {
    keypair: Arc<Keypair>,
}

impl TransactionSigner {
    pub fn new(keypair: Arc<Keypair>) -> Self {
        Self { keypair }
    }

    pub fn pubkey(&self) -> solana_sdk::pubkey::Pubkey {
        self.keypair.pubkey()
    }

    /// Подпись заново собирает транзакцию из сообщения, поэтому
    /// плейсхолдеры подписей из swap API отбрасываются.
    pub fn sign(&self, unsigned: VersionedTransaction) -> Result<VersionedTransaction, SwapError> {
        VersionedTransaction::try_new(unsigned.message, &[self.keypair.as_ref()])
            .map_err(|e| SwapError::InvalidTransaction(format!("подпись: {}", e)))
    }
}
