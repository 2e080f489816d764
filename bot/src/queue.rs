// bot/src/queue.rs
// Очередь заявок на своп (JSON-файл) и пакетный запуск исполнителя

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::SwapError;
use crate::executor::SwapExecutor;
use crate::types::{SwapRequest, SwapStatus};

/// Файл очереди: JSON-массив SwapRequest
pub struct WorkQueue {
    path: PathBuf,
}

impl WorkQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Отсутствующий файл = пустая очередь
    pub async fn load(&self) -> Result<Vec<SwapRequest>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Не удалось прочитать {}", self.path.display()))
            }
        };

        serde_json::from_slice(&raw)
            .with_context(|| format!("Неверный формат очереди {}", self.path.display()))
    }

    /// Полная перезапись файла через временный файл и rename
    pub async fn save(&self, requests: &[SwapRequest]) -> Result<()> {
        let json = serde_json::to_string_pretty(requests)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("Не удалось записать {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Не удалось заменить {}", self.path.display()))?;
        Ok(())
    }

    /// Добавление заявки в конец. Повреждённый файл сбрасывается в пустой массив.
    pub async fn append(&self, request: SwapRequest) -> Result<usize> {
        let mut requests = match self.load().await {
            Ok(requests) => requests,
            Err(e) => {
                error!("❌ Очередь {} повреждена, сброс: {:#}", self.path.display(), e);
                Vec::new()
            }
        };

        requests.push(request);
        self.save(&requests).await?;
        info!("✅ Заявка добавлена в {} (всего {})", self.path.display(), requests.len());
        Ok(requests.len())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Повторно исполнять заявки со статусом failed
    pub retry_failed: bool,
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub executed: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Ожидание bundle прервано, исход неизвестен, заявка остаётся pending
    pub interrupted: usize,
}

/// Последовательное исполнение всех ожидающих заявок.
/// Файл сохраняется после каждой исполненной заявки.
pub async fn run_batch(
    queue: &WorkQueue,
    executor: &SwapExecutor,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    let mut requests = queue.load().await?;
    let mut summary = BatchSummary {
        total: requests.len(),
        ..BatchSummary::default()
    };

    info!("📋 В очереди {} заявок ({})", requests.len(), queue.path().display());

    for index in 0..requests.len() {
        let runnable = match requests[index].status {
            SwapStatus::Pending => true,
            SwapStatus::Failed => options.retry_failed,
            SwapStatus::Completed => false,
        };
        if !runnable {
            summary.skipped += 1;
            continue;
        }

        if options.cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
            warn!("⏹️  Остановка по сигналу, оставшиеся заявки не исполнены");
            summary.skipped += requests.len() - index;
            break;
        }

        info!("{}", "═".repeat(80));
        info!(
            "▶️  Заявка #{} [{}]: {}",
            index + 1,
            requests[index].status,
            requests[index].label()
        );
        summary.executed += 1;

        match executor.execute_swap(&requests[index]).await {
            Ok(report) => {
                info!(
                    "   ✅ СВОП УСПЕШЕН! bundle {} (слот {:?}, swap {})",
                    report.bundle_id, report.landed_slot, report.swap_signature
                );
                requests[index].status = SwapStatus::Completed;
                summary.completed += 1;
            }
            Err(e @ SwapError::PollingCancelled { .. }) => {
                warn!("   ⏹️  {}: заявка остаётся pending", e);
                requests[index].status = SwapStatus::Pending;
                summary.interrupted += 1;
            }
            Err(e) => {
                error!("   ❌ [{}] {}", e.kind(), e);
                requests[index].status = SwapStatus::Failed;
                summary.failed += 1;
            }
        }

        queue.save(&requests).await?;
    }

    info!(
        "📊 Итог: всего {}, исполнено {}, успешно {}, ошибок {}, прервано {}, пропущено {}",
        summary.total,
        summary.executed,
        summary.completed,
        summary.failed,
        summary.interrupted,
        summary.skipped
    );
    Ok(summary)
}
