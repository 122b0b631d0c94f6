//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Create the data directory and every listed subdirectory.
pub async fn ensure_dirs(data_dir: &str, subdirs: &[&str]) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    for sub in subdirs {
        tokio::fs::create_dir_all(sub)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {sub}: {e}"))?;
    }
    info!(%data_dir, count = subdirs.len(), "runtime directories ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_dirs() {
        let base = std::env::temp_dir().join(format!("servicedir-env-{}", std::process::id()));
        let base_s = base.to_string_lossy().to_string();
        let sub = base.join("invoices");
        let sub_s = sub.to_string_lossy().to_string();
        ensure_dirs(&base_s, &[sub_s.as_str()]).await.unwrap();
        assert!(sub.is_dir());
        let _ = std::fs::remove_dir_all(&base);
    }
}
