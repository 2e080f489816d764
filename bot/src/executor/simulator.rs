// bot/src/executor/simulator.rs
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSimulateTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::SwapError;
use crate::types::SimulationOutcome;

/// Стандартный RPC сети: только то, что нужно конвейеру
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<Hash, SwapError>;

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationOutcome, SwapError>;
}

pub struct SolanaRpc {
    rpc_client: Arc<RpcClient>,
}

impl SolanaRpc {
    pub fn new(rpc_client: Arc<RpcClient>) -> Self {
        Self { rpc_client }
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn get_latest_blockhash(&self) -> Result<Hash, SwapError> {
        self.rpc_client
            .get_latest_blockhash()
            .await
            .map_err(|e| SwapError::upstream("getLatestBlockhash", e.to_string()))
    }

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationOutcome, SwapError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: false,
            commitment: Some(CommitmentConfig::confirmed()),
            ..Default::default()
        };

        let simulation = self
            .rpc_client
            .simulate_transaction_with_config(transaction, config)
            .await
            .map_err(|e| SwapError::upstream("simulateTransaction", e.to_string()))?;

        let err = simulation.value.err.map(|e| format!("{:?}", e));
        Ok(SimulationOutcome {
            ok: err.is_none(),
            err,
            logs: simulation.value.logs.unwrap_or_default(),
            units_consumed: simulation.value.units_consumed,
        })
    }
}

/// Симуляция транзакции
pub struct TransactionSimulator {
    rpc: Arc<dyn ChainRpc>,
}

impl TransactionSimulator {
    pub fn new(rpc: Arc<dyn ChainRpc>) -> Self {
        Self { rpc }
    }

    pub async fn simulate(&self, transaction: &VersionedTransaction) -> Result<SimulationOutcome, SwapError> {
        let result = self.rpc.simulate_transaction(transaction).await?;

        if let Some(ref err) = result.err {
            error!("   ❌ Симуляция завершилась с ошибкой: {}", err);
            for log in &result.logs {
                debug!("  Log: {}", log);
            }
        } else {
            info!("   ✅ Симуляция успешна (CU: {})", result.units_consumed.unwrap_or(0));
            for log in &result.logs {
                debug!("  Log: {}", log);
            }
        }

        Ok(result)
    }
}
