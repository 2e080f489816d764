// bot/src/config.rs
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SwapError;

pub const DEFAULT_METIS_ENDPOINT: &str = "https://public.jupiterapi.com";
pub const RAYDIUM_AMM_V4_MAINNET: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
pub const RAYDIUM_AMM_V4_DEVNET: &str = "DRaya7Kj3aMWQSy19kSjvmuwq9docCHofyP9kanQGaav";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub rpc: RpcConfig,
    pub wallet: WalletConfig,
    pub jupiter: JupiterConfig,
    pub jito: JitoConfig,
    pub polling: PollingConfig,
    pub queue: QueueConfig,
    pub listener: ListenerConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Стандартный RPC: blockhash и симуляция
    pub url: String,
    pub ws_url: String,
    pub timeout_seconds: u64,
}

#[derive(Clone, Default)]
pub struct WalletConfig {
    pub path: Option<PathBuf>,
    /// JSON массив байт из WALLET_SECRET
    pub secret: Option<String>,
}

// Секрет никогда не попадает в логи
impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("path", &self.path)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct JupiterConfig {
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct JitoConfig {
    /// JSON-RPC endpoint relay, используется как есть
    pub block_engine_url: String,
    /// Tip по умолчанию, если в заявке jitoTip = 0
    pub tip_lamports: u64,
}

/// Параметры опроса статуса bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub warmup: Duration,
    pub interval: Duration,
    /// Общий дедлайн ожидания от отправки bundle, warmup входит в него
    pub timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            warmup: Duration::from_millis(5_000),
            interval: Duration::from_millis(3_000),
            timeout: Duration::from_millis(30_000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub http_url: String,
    pub ws_url: String,
    pub raydium_program_id: String,
    pub instruction_name: String,
    pub amount: u64,
    pub slippage_bps: u16,
    pub priority_fee: u64,
    pub compute_units: u32,
    pub jito_tip: u64,
}

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub log_level: String,
}

impl BotConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Сборка конфигурации из произвольного источника переменных
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // ПОДДЕРЖКА КЛАСТЕРОВ
        let cluster = var("SOLANA_CLUSTER").unwrap_or_else(|| "mainnet".to_string());
        let is_devnet = cluster.eq_ignore_ascii_case("devnet");

        let (default_rpc, default_ws) = if is_devnet {
            ("https://api.devnet.solana.com", "wss://api.devnet.solana.com")
        } else {
            ("https://api.mainnet-beta.solana.com", "wss://api.mainnet-beta.solana.com")
        };

        let rpc_url = var("JITO_ENDPOINTALTERNATIVE")
            .or_else(|| var("SOLANA_RPC_URL"))
            .unwrap_or_else(|| default_rpc.to_string());
        let ws_url = var("SOLANA_WS_URL").unwrap_or_else(|| default_ws.to_string());

        let (http_key, wss_key, raydium_key, raydium_default) = if is_devnet {
            ("HTTP_URL_DEVNET", "WSS_URL_DEVNET", "RAYDIUM_PUBLIC_KEY_DEVNET", RAYDIUM_AMM_V4_DEVNET)
        } else {
            ("HTTP_URL", "WSS_URL", "RAYDIUM_PUBLIC_KEY", RAYDIUM_AMM_V4_MAINNET)
        };

        let listener = ListenerConfig {
            http_url: var(http_key).unwrap_or_else(|| rpc_url.clone()),
            ws_url: var(wss_key).unwrap_or_else(|| ws_url.clone()),
            raydium_program_id: var(raydium_key).unwrap_or_else(|| raydium_default.to_string()),
            instruction_name: var("LISTENER_INSTRUCTION").unwrap_or_else(|| "initialize2".to_string()),
            amount: parse_or(&var, "LISTENER_AMOUNT", 1_000_000_000)?,
            slippage_bps: parse_or(&var, "LISTENER_SLIPPAGE_BPS", 50)?,
            priority_fee: parse_or(&var, "LISTENER_PRIORITY_FEE", 1_000)?,
            compute_units: parse_or(&var, "LISTENER_COMPUTE_UNITS", 400_000)?,
            jito_tip: parse_or(&var, "LISTENER_JITO_TIP", 100_000)?,
        };

        let polling = PollingConfig {
            warmup: Duration::from_millis(parse_or(&var, "DEFAULT_WAIT_BEFORE_POLL_MS", 5_000)?),
            interval: Duration::from_millis(parse_or(&var, "POLL_INTERVAL_MS", 3_000)?),
            timeout: Duration::from_millis(parse_or(&var, "POLL_TIMEOUT_MS", 30_000)?),
        };

        Ok(Self {
            rpc: RpcConfig {
                url: rpc_url,
                ws_url,
                timeout_seconds: parse_or(&var, "RPC_TIMEOUT_SECONDS", 30)?,
            },
            wallet: WalletConfig {
                path: var("WALLET_PATH").map(PathBuf::from),
                secret: var("WALLET_SECRET"),
            },
            jupiter: JupiterConfig {
                api_url: var("METIS_ENDPOINT").unwrap_or_else(|| DEFAULT_METIS_ENDPOINT.to_string()),
            },
            jito: JitoConfig {
                block_engine_url: var("JITO_ENDPOINT").unwrap_or_default(),
                tip_lamports: parse_or(&var, "JITO_TIP_LAMPORTS", 500_000)?,
            },
            polling,
            queue: QueueConfig {
                path: var("WORK_QUEUE_PATH")
                    .unwrap_or_else(|| "output.json".to_string())
                    .into(),
            },
            listener,
            monitoring: MonitoringConfig {
                log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
        })
    }

    /// Проверка обязательных параметров исполнения свопов.
    /// Отсутствие ключа или endpoint relay фатально при старте.
    pub fn validate(&self) -> Result<(), SwapError> {
        if self.wallet.secret.is_none() && self.wallet.path.is_none() {
            return Err(SwapError::Configuration(
                "не задан ключ кошелька (WALLET_SECRET или WALLET_PATH)".to_string(),
            ));
        }
        if self.jito.block_engine_url.trim().is_empty() {
            return Err(SwapError::Configuration("не задан JITO_ENDPOINT".to_string()));
        }
        if self.jupiter.api_url.trim().is_empty() {
            return Err(SwapError::Configuration("не задан METIS_ENDPOINT".to_string()));
        }
        if self.polling.interval.is_zero() {
            return Err(SwapError::Configuration("POLL_INTERVAL_MS должен быть > 0".to_string()));
        }
        Ok(())
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", key)),
        None => Ok(default),
    }
}
