// bot/src/types.rs
// Shared types and structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Статус заявки в очереди. В файле хранится строчными буквами,
/// отсутствие поля означает `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl SwapStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SwapStatus::Pending)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapStatus::Pending => write!(f, "pending"),
            SwapStatus::Completed => write!(f, "completed"),
            SwapStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Заявка на своп, созданная листенером пулов
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// В минимальных единицах входного токена
    pub amount: u64,
    pub slippage_bps: u16,
    pub priority_fee: u64,
    pub compute_units: u32,
    pub jito_tip: u64,
    #[serde(default, skip_serializing_if = "SwapStatus::is_pending")]
    pub status: SwapStatus,
}

impl SwapRequest {
    pub fn label(&self) -> String {
        format!("{} → {}", self.input_mint, self.output_mint)
    }
}

/// Результат симуляции транзакции
#[derive(Debug, Clone, Default)]
pub struct SimulationOutcome {
    pub ok: bool,
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

/// Статус bundle в relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleStatus {
    Pending,
    Landed { slot: Option<u64> },
    Failed,
}

impl BundleStatus {
    /// `Invalid` означает, что индекс relay ещё не видит bundle,
    /// поэтому он, как и неизвестные значения, считается `Pending`.
    pub fn from_relay(status: &str, landed_slot: Option<u64>) -> Self {
        match status {
            "Landed" => BundleStatus::Landed { slot: landed_slot },
            "Failed" => BundleStatus::Failed,
            _ => BundleStatus::Pending,
        }
    }
}

/// Итог успешно исполненного свопа
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReport {
    pub bundle_id: String,
    pub landed_slot: Option<u64>,
    pub swap_signature: String,
    pub tip_signature: String,
}
