// bot/src/executor/mod.rs
// Оркестратор исполнения свопа: quote → swap tx → симуляция → tip → bundle → опрос

pub mod bundle_poller;
pub mod jito_client;
pub mod quote_client;
pub mod signer;
pub mod simulator;
pub mod transaction_builder;

#[cfg(test)]
pub mod mocks;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Keypair;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{BotConfig, PollingConfig};
use crate::error::SwapError;
use crate::types::{SwapReport, SwapRequest};
use crate::utils::encoding::EncodedTransaction;
use crate::utils::lamports_to_sol;
use bundle_poller::BundlePoller;
use jito_client::{BundleSubmitter, JitoClient, RelayApi};
use quote_client::{JupiterClient, QuoteRequest, SwapApi};
use signer::TransactionSigner;
use simulator::{ChainRpc, SolanaRpc, TransactionSimulator};
use transaction_builder::TransactionBuilder;

/// Внешние сервисы конвейера
pub struct SwapServices {
    pub swap_api: Arc<dyn SwapApi>,
    pub rpc: Arc<dyn ChainRpc>,
    pub relay: Arc<dyn RelayApi>,
}

impl SwapServices {
    pub fn from_config(config: &BotConfig) -> Result<Self, SwapError> {
        let timeout = Duration::from_secs(config.rpc.timeout_seconds);
        let rpc_client = Arc::new(RpcClient::new_with_timeout_and_commitment(
            config.rpc.url.clone(),
            timeout,
            CommitmentConfig::confirmed(),
        ));

        Ok(Self {
            swap_api: Arc::new(JupiterClient::new(&config.jupiter.api_url, timeout)?),
            rpc: Arc::new(SolanaRpc::new(rpc_client)),
            relay: Arc::new(JitoClient::new(&config.jito.block_engine_url, timeout)?),
        })
    }
}

/// Исполнитель одной заявки. Не хранит состояния между заявками.
pub struct SwapExecutor {
    swap_api: Arc<dyn SwapApi>,
    builder: TransactionBuilder,
    signer: TransactionSigner,
    simulator: TransactionSimulator,
    submitter: BundleSubmitter,
    poller: BundlePoller,
    default_tip_lamports: u64,
}

impl SwapExecutor {
    pub fn new(
        services: SwapServices,
        keypair: Arc<Keypair>,
        default_tip_lamports: u64,
        polling: PollingConfig,
    ) -> Self {
        Self {
            builder: TransactionBuilder::new(services.swap_api.clone(), services.rpc.clone()),
            signer: TransactionSigner::new(keypair),
            simulator: TransactionSimulator::new(services.rpc),
            submitter: BundleSubmitter::new(services.relay.clone()),
            poller: BundlePoller::new(services.relay, polling),
            swap_api: services.swap_api,
            default_tip_lamports,
        }
    }

    /// Внешняя отмена ожидания bundle (Ctrl-C)
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.poller = self.poller.with_cancellation(token);
        self
    }

    pub async fn execute_swap(&self, request: &SwapRequest) -> Result<SwapReport, SwapError> {
        let payer = self.signer.pubkey();
        info!(
            "🚀 Старт свопа {} (amount {}, CU {})",
            request.label(),
            request.amount,
            request.compute_units
        );
        info!("   Кошелёк: {}", payer);

        // Шаг 1: котировка
        info!("📈 Запрос котировки...");
        let quote_request = QuoteRequest::new(
            &request.input_mint,
            &request.output_mint,
            request.amount,
            request.slippage_bps,
        );
        let quote = self.swap_api.get_quote(&quote_request).await?;

        // Шаг 2: swap-транзакция
        let unsigned_swap = self
            .builder
            .build_swap_transaction(&quote, &payer, request.priority_fee)
            .await?;
        let swap_tx = self.signer.sign(unsigned_swap)?;
        let swap_encoded = EncodedTransaction::from_transaction(&swap_tx)?;
        debug!("   Swap tx (base64): {}", swap_encoded.base64);

        // Шаг 3: симуляция только swap-транзакции
        info!("🧪 Симуляция транзакции...");
        let simulation = self.simulator.simulate(&swap_tx).await?;
        if !simulation.ok {
            return Err(SwapError::SimulationRejected {
                err: simulation.err.unwrap_or_else(|| "unknown".to_string()),
                logs: simulation.logs,
            });
        }

        // Шаг 4: tip
        let tip_account = self.submitter.get_tip_account().await?;
        info!("   Tip-аккаунт Jito: {}", tip_account);
        let tip_lamports = if request.jito_tip > 0 {
            request.jito_tip
        } else {
            self.default_tip_lamports
        };
        info!("   Tip: {} SOL", lamports_to_sol(tip_lamports, 6));
        let unsigned_tip = self
            .builder
            .build_tip_transaction(&payer, &tip_account, tip_lamports, &payer)
            .await?;
        let tip_tx = self.signer.sign(unsigned_tip)?;
        let tip_encoded = EncodedTransaction::from_transaction(&tip_tx)?;

        // Шаг 5: bundle [swap, tip]
        let bundle_id = self.submitter.send_bundle(&[swap_encoded, tip_encoded]).await?;

        // Шаг 6: ожидание посадки
        let landed_slot = self.poller.poll_bundle_status(&bundle_id).await?;
        info!("   Explorer: https://explorer.jito.wtf/bundle/{}", bundle_id);

        Ok(SwapReport {
            bundle_id,
            landed_slot,
            swap_signature: swap_tx.signatures[0].to_string(),
            tip_signature: tip_tx.signatures[0].to_string(),
        })
    }
}
