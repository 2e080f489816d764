// bot/src/executor/mocks.rs
// Тестовые реализации внешних сервисов конвейера

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::SwapError;
use crate::executor::jito_client::{InflightBundleStatus, RelayApi};
use crate::executor::quote_client::{Quote, QuoteRequest, SwapApi};
use crate::executor::simulator::ChainRpc;
use crate::executor::transaction_builder::create_tip_instruction;
use crate::types::SimulationOutcome;
use crate::utils::encoding::{serialize_transaction, to_base64};

// ============================================================================
// CHAIN RPC
// ============================================================================

pub struct MockChainRpc {
    blockhash: Option<Hash>,
    simulation: Option<SimulationOutcome>,
    blockhash_calls: AtomicUsize,
    simulate_calls: AtomicUsize,
}

impl Default for MockChainRpc {
    fn default() -> Self {
        Self::with_blockhash(Hash::new_unique())
    }
}

impl MockChainRpc {
    pub fn with_blockhash(blockhash: Hash) -> Self {
        Self {
            blockhash: Some(blockhash),
            simulation: Some(SimulationOutcome {
                ok: true,
                err: None,
                logs: vec!["Program log: Instruction: Route".to_string()],
                units_consumed: Some(120_000),
            }),
            blockhash_calls: AtomicUsize::new(0),
            simulate_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_blockhash() -> Self {
        Self {
            blockhash: None,
            ..Self::default()
        }
    }

    pub fn rejecting_simulation(logs: &[&str]) -> Self {
        Self {
            simulation: Some(SimulationOutcome {
                ok: false,
                err: Some("InstructionError(2, Custom(1))".to_string()),
                logs: logs.iter().map(|l| l.to_string()).collect(),
                units_consumed: Some(3_000),
            }),
            ..Self::default()
        }
    }

    pub fn unreachable_simulation() -> Self {
        Self {
            simulation: None,
            ..Self::default()
        }
    }

    pub fn blockhash_calls(&self) -> usize {
        self.blockhash_calls.load(Ordering::SeqCst)
    }

    pub fn simulate_calls(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn get_latest_blockhash(&self) -> Result<Hash, SwapError> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        self.blockhash
            .ok_or_else(|| SwapError::upstream("getLatestBlockhash", "connection refused"))
    }

    async fn simulate_transaction(
        &self,
        _transaction: &VersionedTransaction,
    ) -> Result<SimulationOutcome, SwapError> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        self.simulation
            .clone()
            .ok_or_else(|| SwapError::upstream("simulateTransaction", "connection reset"))
    }
}

// ============================================================================
// SWAP API
// ============================================================================

#[derive(Default)]
pub struct MockSwapApi {
    no_route: bool,
    swap_transaction: Option<String>,
    quote_calls: AtomicUsize,
    swap_calls: AtomicUsize,
    last_quote_request: Mutex<Option<QuoteRequest>>,
}

impl MockSwapApi {
    pub fn with_swap_transaction(swap_transaction: Option<String>) -> Self {
        Self {
            swap_transaction,
            ..Self::default()
        }
    }

    /// Swap API, отдающий неподписанный перевод от имени `payer`
    pub fn for_payer(payer: &Pubkey) -> Self {
        Self::with_swap_transaction(Some(unsigned_swap_base64(payer)))
    }

    pub fn without_route() -> Self {
        Self {
            no_route: true,
            ..Self::default()
        }
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn swap_calls(&self) -> usize {
        self.swap_calls.load(Ordering::SeqCst)
    }

    pub fn last_quote_request(&self) -> Option<QuoteRequest> {
        self.last_quote_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwapApi for MockSwapApi {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_quote_request.lock().unwrap() = Some(request.clone());

        if self.no_route {
            return Err(SwapError::NoQuoteAvailable);
        }
        Ok(Quote::from_value(serde_json::json!({
            "inputMint": request.input_mint,
            "outputMint": request.output_mint,
            "inAmount": request.amount.to_string(),
            "outAmount": "171000",
            "routePlan": [{"percent": 100}],
        })))
    }

    async fn get_swap_transaction(
        &self,
        _quote: &Quote,
        _user_public_key: &Pubkey,
        _priority_fee: u64,
    ) -> Result<String, SwapError> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        self.swap_transaction.clone().ok_or(SwapError::NoSwapTransaction)
    }
}

pub fn unsigned_swap_base64(payer: &Pubkey) -> String {
    let ix = create_tip_instruction(payer, &Pubkey::new_unique(), 1_000_000);
    let message = Message::new_with_blockhash(&[ix], Some(payer), &Hash::new_unique());
    let tx = VersionedTransaction {
        signatures: vec![Signature::default()],
        message: VersionedMessage::Legacy(message),
    };
    to_base64(&serialize_transaction(&tx).unwrap())
}

// ============================================================================
// RELAY
// ============================================================================

#[derive(Debug, Clone)]
pub enum SendBehaviour {
    Accept(String),
    Reject,
    TransportError,
}

#[derive(Debug, Clone)]
pub enum StatusStep {
    Status(&'static str, Option<u64>),
    Error,
}

pub struct MockRelay {
    tip_accounts: Vec<String>,
    send: SendBehaviour,
    /// Последний шаг повторяется, когда сценарий исчерпан
    statuses: Mutex<VecDeque<StatusStep>>,
    sent_bundles: Mutex<Vec<Vec<String>>>,
    tip_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockRelay {
    pub fn new(send: SendBehaviour, statuses: Vec<StatusStep>) -> Self {
        Self {
            tip_accounts: (0..8).map(|_| Pubkey::new_unique().to_string()).collect(),
            send,
            statuses: Mutex::new(statuses.into()),
            sent_bundles: Mutex::new(Vec::new()),
            tip_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn landing(slot: u64) -> Self {
        Self::new(
            SendBehaviour::Accept("bundle-123".to_string()),
            vec![
                StatusStep::Status("Pending", None),
                StatusStep::Status("Pending", None),
                StatusStep::Status("Landed", Some(slot)),
            ],
        )
    }

    pub fn tip_accounts(&self) -> &[String] {
        &self.tip_accounts
    }

    pub fn sent_bundles(&self) -> Vec<Vec<String>> {
        self.sent_bundles.lock().unwrap().clone()
    }

    pub fn tip_calls(&self) -> usize {
        self.tip_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelayApi for MockRelay {
    async fn get_tip_accounts(&self) -> Result<Vec<String>, SwapError> {
        self.tip_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tip_accounts.clone())
    }

    async fn send_bundle(&self, transactions: &[String]) -> Result<String, SwapError> {
        self.sent_bundles.lock().unwrap().push(transactions.to_vec());
        match &self.send {
            SendBehaviour::Accept(id) => Ok(id.clone()),
            SendBehaviour::Reject => Err(SwapError::RelayRejected("sendBundle: bundle rejected".to_string())),
            SendBehaviour::TransportError => Err(SwapError::upstream("sendBundle", "connection reset by peer")),
        }
    }

    async fn get_inflight_bundle_statuses(
        &self,
        bundle_ids: &[String],
    ) -> Result<Vec<InflightBundleStatus>, SwapError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().cloned()
            }
        };

        match step {
            Some(StatusStep::Status(status, landed_slot)) => Ok(vec![InflightBundleStatus {
                bundle_id: bundle_ids.first().cloned().unwrap_or_default(),
                status: status.to_string(),
                landed_slot,
            }]),
            Some(StatusStep::Error) => Err(SwapError::upstream("getInflightBundleStatuses", "timeout")),
            None => Ok(vec![]),
        }
    }
}
