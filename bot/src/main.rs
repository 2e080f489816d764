// bot/src/main.rs
// Точка входа: исполнение очереди свопов через Jito bundle и листенер новых пулов
mod config;
mod error;
mod executor;
mod queue;
mod scanner;
mod types;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::signature::Signer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::BotConfig;
use executor::{SwapExecutor, SwapServices};
use queue::{run_batch, BatchOptions, WorkQueue};
use scanner::PoolListener;
use utils::load_wallet;

#[derive(Parser)]
#[command(name = "jito-sniper-bot", about = "Свопы Jupiter через Jito bundle")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Исполнить ожидающие заявки из очереди
    Execute {
        #[arg(long, env = "WORK_QUEUE_PATH")]
        queue: Option<PathBuf>,
        /// Повторить заявки со статусом failed
        #[arg(long)]
        retry_failed: bool,
    },
    /// Слушать новые пулы Raydium и добавлять заявки в очередь
    Listen {
        #[arg(long, env = "WORK_QUEUE_PATH")]
        queue: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Загрузка конфигурации
    let config = BotConfig::load()?;
    init_logging(&config.monitoring.log_level);

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║    JITO BUNDLE SWAP BOT - RUST EDITION                         ║");
    println!("║    Jupiter quote → swap → tip → sendBundle                     ║");
    println!("╚════════════════════════════════════════════════════════════════╝\n");

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⏹️  Получен Ctrl-C, завершение после текущего шага...");
            signal_token.cancel();
        }
    });

    match cli.command.unwrap_or(Command::Execute {
        queue: None,
        retry_failed: false,
    }) {
        Command::Execute {
            queue,
            retry_failed,
        } => {
            let queue = WorkQueue::new(queue.unwrap_or_else(|| config.queue.path.clone()));
            execute(&config, queue, retry_failed, cancel).await
        }
        Command::Listen { queue } => {
            let queue = WorkQueue::new(queue.unwrap_or_else(|| config.queue.path.clone()));
            PoolListener::new(config.listener.clone(), queue).run(cancel).await
        }
    }
}

async fn execute(
    config: &BotConfig,
    queue: WorkQueue,
    retry_failed: bool,
    cancel: CancellationToken,
) -> Result<()> {
    info!("📋 Проверка конфигурации...");
    if let Err(e) = config.validate() {
        error!("❌ [{}] {}", e.kind(), e);
        return Err(e.into());
    }

    // Загрузка кошелька
    info!("🔑 Загрузка кошелька...");
    let keypair = Arc::new(load_wallet(&config.wallet).context("Не удалось загрузить кошелёк")?);
    info!("   Публичный ключ: {}", keypair.pubkey());

    info!("🌐 RPC: {}", config.rpc.url);
    info!("   Jupiter: {}", config.jupiter.api_url);
    info!("   Jito: {}", config.jito.block_engine_url);

    let services = SwapServices::from_config(config)?;
    let executor = SwapExecutor::new(services, keypair, config.jito.tip_lamports, config.polling)
        .with_cancellation(cancel.clone());

    info!("✅ Все компоненты инициализированы\n");

    let options = BatchOptions {
        retry_failed,
        cancel: Some(cancel),
    };
    let started = chrono::Local::now();
    let summary = run_batch(&queue, &executor, &options).await?;
    info!(
        "🏁 Завершено за {} с ({} успешно из {})",
        (chrono::Local::now() - started).num_seconds(),
        summary.completed,
        summary.executed
    );
    Ok(())
}

/// Инициализация системы логирования
fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_line_number(false))
        .init();
}
