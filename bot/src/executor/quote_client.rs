// bot/src/executor/quote_client.rs
// Клиент Jupiter/Metis: котировки и сборка swap-транзакций

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::SwapError;

/// Коды ошибок Jupiter, означающие отсутствие маршрута
const NO_ROUTE_CODES: &[&str] = &["COULD_NOT_FIND_ANY_ROUTE", "NO_ROUTES_FOUND", "TOKEN_NOT_TRADABLE"];

/// Параметры запроса котировки
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    pub slippage_bps: u16,
    /// Маршрут только через ликвидные промежуточные токены
    pub restrict_intermediate_tokens: bool,
}

impl QuoteRequest {
    pub fn new(input_mint: &str, output_mint: &str, amount: u64, slippage_bps: u16) -> Self {
        Self {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            amount,
            slippage_bps,
            restrict_intermediate_tokens: true,
        }
    }
}

/// Непрозрачный ответ /quote, передаётся в /swap без изменений
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quote(serde_json::Value);

impl Quote {
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn out_amount(&self) -> Option<u64> {
        self.0.get("outAmount")?.as_str()?.parse().ok()
    }

    pub fn route_len(&self) -> usize {
        self.0
            .get("routePlan")
            .and_then(|plan| plan.as_array())
            .map(|plan| plan.len())
            .unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapRequestBody<'a> {
    quote_response: &'a Quote,
    user_public_key: String,
    wrap_and_unwrap_sol: bool,
    dynamic_compute_unit_limit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    prioritization_fee_lamports: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    swap_transaction: Option<String>,
    last_valid_block_height: Option<u64>,
}

/// Routing/swap сервис
#[async_trait]
pub trait SwapApi: Send + Sync {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError>;

    /// Возвращает неподписанную транзакцию в base64
    async fn get_swap_transaction(
        &self,
        quote: &Quote,
        user_public_key: &Pubkey,
        priority_fee: u64,
    ) -> Result<String, SwapError>;
}

pub struct JupiterClient {
    api_url: String,
    http_client: Client,
}

impl JupiterClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, SwapError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwapError::Configuration(format!("HTTP клиент: {}", e)))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl SwapApi for JupiterClient {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
        let endpoint = format!("{}/quote", self.api_url);
        debug!("   Endpoint: {}", endpoint);

        let response = self
            .http_client
            .get(&endpoint)
            .query(request)
            .send()
            .await
            .map_err(|e| SwapError::upstream("quote", e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SwapError::upstream("quote", e.to_string()))?;

        if !status.is_success() {
            if NO_ROUTE_CODES.iter().any(|code| body.contains(code)) {
                return Err(SwapError::NoQuoteAvailable);
            }
            return Err(SwapError::upstream("quote", format!("{}: {}", status, body)));
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| SwapError::upstream("quote", format!("невалидный JSON: {} ({})", e, body)))?;

        let quote = Quote::from_value(value);
        if quote.as_value().is_null() || quote.route_len() == 0 {
            return Err(SwapError::NoQuoteAvailable);
        }

        info!(
            "   📈 Котировка: {} → {} ({} шагов маршрута)",
            request.amount,
            quote.out_amount().map(|v| v.to_string()).unwrap_or_else(|| "?".to_string()),
            quote.route_len()
        );
        Ok(quote)
    }

    async fn get_swap_transaction(
        &self,
        quote: &Quote,
        user_public_key: &Pubkey,
        priority_fee: u64,
    ) -> Result<String, SwapError> {
        let endpoint = format!("{}/swap", self.api_url);

        let body = SwapRequestBody {
            quote_response: quote,
            user_public_key: user_public_key.to_string(),
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            prioritization_fee_lamports: (priority_fee > 0).then_some(priority_fee),
        };

        let response = self
            .http_client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SwapError::upstream("swap", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SwapError::upstream("swap", format!("{}: {}", status, error_text)));
        }

        let swap_response: SwapResponse = response
            .json()
            .await
            .map_err(|e| SwapError::upstream("swap", format!("не удалось распарсить ответ: {}", e)))?;

        debug!("   lastValidBlockHeight: {:?}", swap_response.last_valid_block_height);

        swap_response
            .swap_transaction
            .filter(|tx| !tx.trim().is_empty())
            .ok_or(SwapError::NoSwapTransaction)
    }
}
