// bot/src/executor/transaction_builder.rs
use solana_sdk::{
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::SwapError;
use crate::executor::quote_client::{Quote, SwapApi};
use crate::executor::simulator::ChainRpc;
use crate::utils::encoding::decode_transaction_base64;

pub struct TransactionBuilder {
    swap_api: Arc<dyn SwapApi>,
    rpc: Arc<dyn ChainRpc>,
}

impl TransactionBuilder {
    pub fn new(swap_api: Arc<dyn SwapApi>, rpc: Arc<dyn ChainRpc>) -> Self {
        Self { swap_api, rpc }
    }

    /// Неподписанная swap-транзакция от swap API.
    /// Blockhash проставляет сервис.
    pub async fn build_swap_transaction(
        &self,
        quote: &Quote,
        payer: &Pubkey,
        priority_fee: u64,
    ) -> Result<VersionedTransaction, SwapError> {
        info!("🔨 Запрос swap-транзакции для {}", payer);

        let encoded = self
            .swap_api
            .get_swap_transaction(quote, payer, priority_fee)
            .await?;
        let tx = decode_transaction_base64(&encoded)?;

        debug!(
            "   Swap tx: {} подписей, blockhash {}",
            tx.signatures.len(),
            tx.message.recent_blockhash()
        );
        Ok(tx)
    }

    /// Tip-транзакция: один transfer на tip-аккаунт relay.
    /// Blockhash запрашивается прямо перед возвратом, подпись следует сразу.
    pub async fn build_tip_transaction(
        &self,
        payer: &Pubkey,
        tip_account: &Pubkey,
        tip_lamports: u64,
        fee_payer: &Pubkey,
    ) -> Result<VersionedTransaction, SwapError> {
        info!("💸 Создание tip-транзакции: {} lamports → {}", tip_lamports, tip_account);

        let ix = create_tip_instruction(payer, tip_account, tip_lamports);
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let message = Message::new_with_blockhash(&[ix], Some(fee_payer), &blockhash);

        let signatures = vec![Signature::default(); message.header.num_required_signatures as usize];
        Ok(VersionedTransaction {
            signatures,
            message: VersionedMessage::Legacy(message),
        })
    }
}

/// Инструкция перевода tip для Jito
#[allow(deprecated)]
pub fn create_tip_instruction(
    from: &Pubkey,
    tip_account: &Pubkey,
    lamports: u64,
) -> solana_sdk::instruction::Instruction {
    solana_sdk::system_instruction::transfer(from, tip_account, lamports)
}
