//! Data models: receipts and configuration.

pub mod config;
pub mod receipt;
