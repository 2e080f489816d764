// bot/src/error.rs
// Таксономия ошибок конвейера свопа

use thiserror::Error;

/// Ошибка одного этапа исполнения свопа.
///
/// Любой вариант, кроме `Configuration`, завершает только текущую заявку:
/// батч помечает её `Failed` и идёт дальше.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("маршрут не найден: котировка недоступна")]
    NoQuoteAvailable,

    #[error("сервис свопа не вернул транзакцию")]
    NoSwapTransaction,

    #[error("некорректная транзакция: {0}")]
    InvalidTransaction(String),

    #[error("симуляция отклонила транзакцию: {err} (логов: {})", logs.len())]
    SimulationRejected { err: String, logs: Vec<String> },

    #[error("relay отклонил запрос: {0}")]
    RelayRejected(String),

    #[error("bundle {bundle_id} провалился")]
    BundleFailed { bundle_id: String },

    #[error("таймаут ожидания bundle {bundle_id} ({elapsed_ms} мс)")]
    PollingTimeout { bundle_id: String, elapsed_ms: u128 },

    #[error("ожидание bundle {bundle_id} отменено")]
    PollingCancelled { bundle_id: String },

    #[error("ошибка upstream на этапе {stage}: {message}")]
    Upstream { stage: &'static str, message: String },

    #[error("ошибка конфигурации: {0}")]
    Configuration(String),
}

impl SwapError {
    pub fn upstream(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            stage,
            message: message.into(),
        }
    }

    /// Короткая стабильная метка для логов и сводки
    pub fn kind(&self) -> &'static str {
        match self {
            SwapError::NoQuoteAvailable => "NoQuoteAvailable",
            SwapError::NoSwapTransaction => "NoSwapTransaction",
            SwapError::InvalidTransaction(_) => "InvalidTransaction",
            SwapError::SimulationRejected { .. } => "SimulationRejected",
            SwapError::RelayRejected(_) => "RelayRejected",
            SwapError::BundleFailed { .. } => "BundleFailed",
            SwapError::PollingTimeout { .. } => "PollingTimeout",
            SwapError::PollingCancelled { .. } => "PollingCancelled",
            SwapError::Upstream { .. } => "UpstreamError",
            SwapError::Configuration(_) => "ConfigurationError",
        }
    }
}
