// bot/src/executor/jito_client.rs
// Клиент для Jito Block Engine: tip-аккаунты, bundle, статусы

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::SwapError;
use crate::utils::encoding::EncodedTransaction;

/// Relay как отдельный типизированный клиент, не путать со стандартным RPC
#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn get_tip_accounts(&self) -> Result<Vec<String>, SwapError>;

    /// Транзакции в base58, порядок сохраняется
    async fn send_bundle(&self, transactions: &[String]) -> Result<String, SwapError>;

    async fn get_inflight_bundle_statuses(
        &self,
        bundle_ids: &[String],
    ) -> Result<Vec<InflightBundleStatus>, SwapError>;
}

/// Клиент Jito Block Engine
pub struct JitoClient {
    endpoint: String,
    http_client: Client,
}

impl JitoClient {
    pub fn new(block_engine_url: &str, timeout: Duration) -> Result<Self, SwapError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwapError::Configuration(format!("HTTP клиент: {}", e)))?;

        Ok(Self {
            endpoint: block_engine_url.trim().to_string(),
            http_client,
        })
    }

    async fn call<P, T>(&self, method: &'static str, params: P) -> Result<T, SwapError>
    where
        P: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SwapError::upstream(method, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SwapError::upstream(method, e.to_string()))?;

        // Лимит запросов и сбои relay не являются отказом по bundle
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(SwapError::upstream(method, format!("{}: {}", status, body)));
        }

        let parsed: JsonRpcResponse<T> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Err(SwapError::upstream(
                    method,
                    format!("{}: не удалось распарсить ответ ({}): {}", status, e, body),
                ))
            }
        };

        if let Some(error) = parsed.error {
            return Err(SwapError::RelayRejected(format!(
                "{}: {} (code {})",
                method, error.message, error.code
            )));
        }
        if !status.is_success() {
            return Err(SwapError::upstream(method, format!("{}: {}", status, body)));
        }

        parsed
            .result
            .ok_or_else(|| SwapError::upstream(method, format!("нет result в ответе: {}", body)))
    }
}

#[async_trait]
impl RelayApi for JitoClient {
    async fn get_tip_accounts(&self) -> Result<Vec<String>, SwapError> {
        self.call("getTipAccounts", Vec::<String>::new()).await
    }

    async fn send_bundle(&self, transactions: &[String]) -> Result<String, SwapError> {
        self.call("sendBundle", [transactions]).await
    }

    async fn get_inflight_bundle_statuses(
        &self,
        bundle_ids: &[String],
    ) -> Result<Vec<InflightBundleStatus>, SwapError> {
        let result: InflightStatusResult = self.call("getInflightBundleStatuses", [bundle_ids]).await?;
        Ok(result.value)
    }
}

/// Выбор tip-аккаунта и отправка bundle
pub struct BundleSubmitter {
    relay: std::sync::Arc<dyn RelayApi>,
}

impl BundleSubmitter {
    pub fn new(relay: std::sync::Arc<dyn RelayApi>) -> Self {
        Self { relay }
    }

    /// Случайный tip-аккаунт из списка relay
    pub async fn get_tip_account(&self) -> Result<Pubkey, SwapError> {
        let accounts = self.relay.get_tip_accounts().await?;
        let mut rng = rand::thread_rng();
        pick_tip_account(&accounts, &mut rng)
    }

    /// Отправка bundle. Порядок транзакций сохраняется.
    pub async fn send_bundle(&self, transactions: &[EncodedTransaction]) -> Result<String, SwapError> {
        info!("📦 Отправка bundle из {} транзакций в Jito...", transactions.len());

        let encoded: Vec<String> = transactions.iter().map(|tx| tx.base58.clone()).collect();
        let bundle_id = self.relay.send_bundle(&encoded).await?;

        info!("   ✅ Bundle отправлен, ID: {}", bundle_id);
        Ok(bundle_id)
    }
}

pub fn pick_tip_account<R: Rng + ?Sized>(accounts: &[String], rng: &mut R) -> Result<Pubkey, SwapError> {
    let account = accounts
        .choose(rng)
        .ok_or_else(|| SwapError::RelayRejected("relay вернул пустой список tip-аккаунтов".to_string()))?;

    debug!("   Tip-аккаунт выбран из {}", accounts.len());
    Pubkey::from_str(account)
        .map_err(|e| SwapError::RelayRejected(format!("невалидный tip-аккаунт {}: {}", account, e)))
}

// ============================================================================
// JSON-RPC СТРУКТУРЫ
// ============================================================================

#[derive(Serialize)]
struct JsonRpcRequest<P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: P,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct InflightStatusResult {
    value: Vec<InflightBundleStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InflightBundleStatus {
    pub bundle_id: String,
    pub status: String,
    pub landed_slot: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use std::collections::HashSet;

    fn client(url: &str) -> JitoClient {
        JitoClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_bundle_wire_format() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/bundles")
            .match_body(Matcher::PartialJson(json!({
                "method": "sendBundle",
                "params": [["swapB58", "tipB58"]],
            })))
            .with_status(200)
            .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": "bundle-123"}).to_string())
            .create_async()
            .await;

        let relay = client(&format!("{}/api/v1/bundles", server.url()));
        let id = relay
            .send_bundle(&["swapB58".to_string(), "tipB58".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(id, "bundle-123");
    }

    #[tokio::test]
    async fn test_relay_error_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(400)
            .with_body(
                json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "bundle contains an expired blockhash"}})
                    .to_string(),
            )
            .create_async()
            .await;

        let result = client(&server.url()).send_bundle(&["x".to_string()]).await;
        match result {
            Err(SwapError::RelayRejected(message)) => assert!(message.contains("expired blockhash")),
            other => panic!("ожидался RelayRejected, получено {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(429)
            .with_body(
                json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32097, "message": "Network congested. Endpoint is globally rate limited."}})
                    .to_string(),
            )
            .create_async()
            .await;

        let result = client(&server.url()).send_bundle(&["x".to_string()]).await;
        match result {
            Err(SwapError::Upstream { stage, message }) => {
                assert_eq!(stage, "sendBundle");
                assert!(message.contains("rate limited"));
            }
            other => panic!("ожидалась UpstreamError, получено {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_failure_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .with_body("service unavailable")
            .create_async()
            .await;

        let result = client(&server.url()).get_tip_accounts().await;
        assert!(matches!(result, Err(SwapError::Upstream { stage: "getTipAccounts", .. })));
    }

    #[tokio::test]
    async fn test_inflight_statuses() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "getInflightBundleStatuses",
                "params": [["bundle-123"]],
            })))
            .with_status(200)
            .with_body(
                json!({"jsonrpc": "2.0", "id": 1, "result": {
                    "context": {"slot": 12350},
                    "value": [{"bundle_id": "bundle-123", "status": "Landed", "landed_slot": 12345}]
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let statuses = client(&server.url())
            .get_inflight_bundle_statuses(&["bundle-123".to_string()])
            .await
            .unwrap();
        assert_eq!(
            statuses,
            vec![InflightBundleStatus {
                bundle_id: "bundle-123".to_string(),
                status: "Landed".to_string(),
                landed_slot: Some(12345),
            }]
        );
    }

    #[test]
    fn test_pick_tip_account_spreads_choice() {
        let accounts: Vec<String> = (0..8).map(|_| Pubkey::new_unique().to_string()).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let mut seen = HashSet::new();
        for _ in 0..400 {
            let chosen = pick_tip_account(&accounts, &mut rng).unwrap();
            assert!(accounts.contains(&chosen.to_string()));
            seen.insert(chosen);
        }
        assert_eq!(seen.len(), accounts.len());
    }

    #[test]
    fn test_pick_tip_account_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            pick_tip_account(&[], &mut rng),
            Err(SwapError::RelayRejected(_))
        ));
    }
}
