// bot/src/executor/bundle_poller.rs
// Ожидание посадки bundle: warmup → опрос с фиксированным интервалом → дедлайн
//
// AwaitingFirstCheck --warmup--> Polling --Landed--> успех (слот)
//                                        --Failed--> BundleFailed
//                                        --дедлайн--> PollingTimeout
//
// Ошибки сети при опросе не меняют состояние: логируются, опрос продолжается.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollingConfig;
use crate::error::SwapError;
use crate::executor::jito_client::RelayApi;
use crate::types::BundleStatus;

pub struct BundlePoller {
    relay: Arc<dyn RelayApi>,
    config: PollingConfig,
    cancel: Option<CancellationToken>,
}

impl BundlePoller {
    pub fn new(relay: Arc<dyn RelayApi>, config: PollingConfig) -> Self {
        Self {
            relay,
            config,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Возвращает слот посадки (если relay его сообщил).
    /// Дедлайн `timeout` общий и включает warmup.
    pub async fn poll_bundle_status(&self, bundle_id: &str) -> Result<Option<u64>, SwapError> {
        let start = Instant::now();
        let deadline = start + self.config.timeout;

        self.pause(self.config.warmup, bundle_id).await?;

        let ids = [bundle_id.to_string()];
        let mut last_status: Option<String> = None;

        while Instant::now() < deadline {
            match self.relay.get_inflight_bundle_statuses(&ids).await {
                Ok(statuses) => match statuses.into_iter().next() {
                    Some(entry) => {
                        if status_changed(&mut last_status, &entry.status) {
                            info!("   🔄 Статус bundle: {}", entry.status);
                        }

                        match BundleStatus::from_relay(&entry.status, entry.landed_slot) {
                            BundleStatus::Landed { slot } => {
                                info!("   🎯 Bundle приземлился в слоте {:?}", slot);
                                return Ok(slot);
                            }
                            BundleStatus::Failed => {
                                return Err(SwapError::BundleFailed {
                                    bundle_id: bundle_id.to_string(),
                                });
                            }
                            BundleStatus::Pending => {}
                        }
                    }
                    None => debug!("   Relay не вернул статус для {}", bundle_id),
                },
                Err(e) => warn!("   ⚠️  Ошибка опроса статуса bundle: {}", e),
            }

            self.pause(self.config.interval, bundle_id).await?;
        }

        Err(SwapError::PollingTimeout {
            bundle_id: bundle_id.to_string(),
            elapsed_ms: start.elapsed().as_millis(),
        })
    }

    async fn pause(&self, duration: Duration, bundle_id: &str) -> Result<(), SwapError> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(SwapError::PollingCancelled {
                    bundle_id: bundle_id.to_string(),
                }),
                _ = sleep(duration) => Ok(()),
            },
            None => {
                sleep(duration).await;
                Ok(())
            }
        }
    }
}

/// Запоминает статус и сообщает, отличается ли он от предыдущего
fn status_changed(last: &mut Option<String>, status: &str) -> bool {
    if last.as_deref() == Some(status) {
        return false;
    }
    *last = Some(status.to_string());
    true
}
