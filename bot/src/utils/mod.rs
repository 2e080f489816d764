// bot/src/utils/mod.rs
pub mod encoding;

use anyhow::{Context, Result};
use solana_sdk::signature::Keypair;
use std::fs;
use std::str::FromStr;
use solana_sdk::pubkey::Pubkey;

use crate::config::WalletConfig;

/// Загрузка keypair из файла
pub fn load_keypair_from_file(path: &str) -> Result<Keypair> {
    let expanded_path = shellexpand::tilde(path).into_owned();

    let keypair_bytes = fs::read(&expanded_path)
        .context(format!("Не удалось прочитать файл кошелька: {}", expanded_path))?;

    keypair_from_json(&keypair_bytes)
}

/// Разбор JSON-массива байт (формат `solana-keygen` и переменной WALLET_SECRET)
pub fn keypair_from_json(raw: &[u8]) -> Result<Keypair> {
    let keypair_data: Vec<u8> = serde_json::from_slice(raw)
        .context("Неверный формат ключа (ожидается JSON массив байт)")?;

    Keypair::try_from(&keypair_data[..])
        .map_err(|e| anyhow::anyhow!("Не удалось создать keypair из байтов: {}. Ожидается 64 байта.", e))
}

/// Кошелёк из WALLET_SECRET, иначе из файла WALLET_PATH
pub fn load_wallet(wallet: &WalletConfig) -> Result<Keypair> {
    if let Some(secret) = &wallet.secret {
        return keypair_from_json(secret.as_bytes()).context("WALLET_SECRET");
    }

    let path = wallet
        .path
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Не задан ни WALLET_SECRET, ни WALLET_PATH"))?;
    let path = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Неверный путь к кошельку"))?;
    load_keypair_from_file(path)
}

/// Форматирование lamports в SOL с заданной точностью
pub fn lamports_to_sol(lamports: u64, decimals: usize) -> String {
    let sol = lamports as f64 / 1_000_000_000.0;
    format!("{:.decimals$}", sol, decimals = decimals)
}

/// Проверка валидности Pubkey
pub fn is_valid_pubkey(address: &str) -> bool {
    Pubkey::from_str(address).is_ok()
}
