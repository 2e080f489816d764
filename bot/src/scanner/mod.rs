// bot/src/scanner/mod.rs
// Источники заявок на своп
pub mod pool_listener;

pub use pool_listener::PoolListener;
