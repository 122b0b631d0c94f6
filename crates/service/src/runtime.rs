//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server crate prepares storage
//! through `service::runtime` alongside the rest of its startup calls.

/// Ensure the data directory and invoice output directory exist.
pub async fn ensure_storage(data_dir: &str, invoice_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_dirs(data_dir, &[invoice_dir]).await
}
