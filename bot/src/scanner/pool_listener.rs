// bot/src/scanner/pool_listener.rs
// Листенер новых пулов Raydium AMM: logsSubscribe → initialize2 → заявка в очередь

use anyhow::{Context, Result};
use futures::StreamExt;
use serde_json::Value;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{
    RpcTransactionConfig, RpcTransactionLogsConfig, RpcTransactionLogsFilter,
};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_transaction_status::UiTransactionEncoding;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ListenerConfig;
use crate::queue::WorkQueue;
use crate::types::{SwapRequest, SwapStatus};
use crate::utils::is_valid_pubkey;

/// Позиции mint-аккаунтов в инструкции initialize2
const TOKEN_A_INDEX: usize = 8;
const TOKEN_B_INDEX: usize = 9;

pub struct PoolListener {
    config: ListenerConfig,
    rpc_client: Arc<RpcClient>,
    queue: WorkQueue,
}

impl PoolListener {
    pub fn new(config: ListenerConfig, queue: WorkQueue) -> Self {
        let rpc_client = Arc::new(RpcClient::new_with_commitment(
            config.http_url.clone(),
            CommitmentConfig::confirmed(),
        ));
        Self {
            config,
            rpc_client,
            queue,
        }
    }

    /// Подписка на логи программы до отмены или закрытия потока
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        info!("👂 Мониторинг логов программы {}", self.config.raydium_program_id);
        info!("   WebSocket: {}", self.config.ws_url);

        let pubsub = PubsubClient::new(&self.config.ws_url)
            .await
            .context("Не удалось подключиться к WebSocket")?;

        let (mut stream, unsubscribe) = pubsub
            .logs_subscribe(
                RpcTransactionLogsFilter::Mentions(vec![self.config.raydium_program_id.clone()]),
                RpcTransactionLogsConfig {
                    commitment: Some(CommitmentConfig::finalized()),
                },
            )
            .await
            .context("logsSubscribe")?;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("⏹️  Листенер остановлен");
                    break;
                }
                next = stream.next() => {
                    let Some(response) = next else {
                        warn!("⚠️  Поток логов закрыт");
                        break;
                    };
                    let logs = response.value;
                    if logs.err.is_some() || !contains_instruction(&logs.logs, &self.config.instruction_name) {
                        continue;
                    }

                    info!(
                        "🆕 {}: https://explorer.solana.com/tx/{}",
                        self.config.instruction_name, logs.signature
                    );
                    if let Err(e) = self.handle_signature(&logs.signature).await {
                        error!("   ❌ Ошибка обработки транзакции {}: {:#}", logs.signature, e);
                    }
                }
            }
        }

        unsubscribe().await;
        Ok(())
    }

    async fn handle_signature(&self, signature: &str) -> Result<()> {
        let signature = Signature::from_str(signature).context("Неверная подпись")?;

        let tx = self
            .rpc_client
            .get_transaction_with_config(
                &signature,
                RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::JsonParsed),
                    commitment: Some(CommitmentConfig::confirmed()),
                    max_supported_transaction_version: Some(0),
                },
            )
            .await
            .context("getTransaction")?;

        let transaction = serde_json::to_value(&tx.transaction.transaction)?;
        let Some(accounts) = program_accounts(&transaction, &self.config.raydium_program_id) else {
            warn!("   Инструкция Raydium не найдена в транзакции");
            return Ok(());
        };
        let Some((token_a, token_b)) = pool_mints_from_accounts(&accounts) else {
            warn!("   В инструкции нет mint-аккаунтов ({} аккаунтов)", accounts.len());
            return Ok(());
        };

        let request = swap_request_for_pool(&self.config, &token_a, &token_b);
        info!("💧 Новый пул: {}", request.label());
        self.queue.append(request).await?;
        Ok(())
    }
}

pub fn contains_instruction(logs: &[String], instruction_name: &str) -> bool {
    logs.iter().any(|line| line.contains(instruction_name))
}

/// Аккаунты первой инструкции программы из jsonParsed-транзакции
pub fn program_accounts(transaction: &Value, program_id: &str) -> Option<Vec<String>> {
    let instructions = transaction.pointer("/message/instructions")?.as_array()?;

    let instruction = instructions
        .iter()
        .find(|ix| ix.get("programId").and_then(Value::as_str) == Some(program_id))?;
    debug!("   Инструкция программы найдена");

    instruction
        .get("accounts")?
        .as_array()?
        .iter()
        .map(|account| account.as_str().map(str::to_string))
        .collect()
}

/// (token A, token B) по позициям 8 и 9
pub fn pool_mints_from_accounts(accounts: &[String]) -> Option<(String, String)> {
    let token_a = accounts.get(TOKEN_A_INDEX)?;
    let token_b = accounts.get(TOKEN_B_INDEX)?;

    if !is_valid_pubkey(token_a) || !is_valid_pubkey(token_b) {
        return None;
    }
    Some((token_a.clone(), token_b.clone()))
}

/// Покупка token A за token B с параметрами листенера
pub fn swap_request_for_pool(config: &ListenerConfig, token_a: &str, token_b: &str) -> SwapRequest {
    SwapRequest {
        input_mint: token_b.to_string(),
        output_mint: token_a.to_string(),
        amount: config.amount,
        slippage_bps: config.slippage_bps,
        priority_fee: config.priority_fee,
        compute_units: config.compute_units,
        jito_tip: config.jito_tip,
        status: SwapStatus::Pending,
    }
}
