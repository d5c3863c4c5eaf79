//! Platform bootstrap for the native adapter.
//!
//! Before the first connection can be opened, the pre-populated database
//! file has to exist at a writable, openable location. Each platform has
//! its own way of getting it there; the policy is selected once at adapter
//! construction and exposes a single `resolve` operation that returns the
//! path to open.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{NativeConfig, Platform};
use crate::error::{DbError, DbResult};

/// One bootstrap policy per platform.
#[derive(Debug, Clone)]
pub enum BootstrapPolicy {
    /// Copy the packaged asset to a writable location on first run; later
    /// runs find the copy already present and skip the copy.
    CopyOnFirstRun { source: PathBuf, target: PathBuf },
    /// Open the bundled database directly; the driver works on the bundle
    /// resource without a separate copy step.
    DirectOpen { source: PathBuf },
    /// Same shape as `CopyOnFirstRun`, but sourced from the app bundle's
    /// resource directory instead of the packaged asset directory.
    BundleCopy { source: PathBuf, target: PathBuf },
}

impl BootstrapPolicy {
    /// Select the policy for a platform's file layout.
    pub fn for_config(config: &NativeConfig) -> Self {
        match config.platform {
            Platform::Android => Self::CopyOnFirstRun {
                source: config.source_path(),
                target: config.writable_path(),
            },
            Platform::Ios => Self::DirectOpen {
                source: config.source_path(),
            },
            Platform::Windows => Self::BundleCopy {
                source: config.source_path(),
                target: config.writable_path(),
            },
        }
    }

    /// Make the database file available and return the path to open.
    pub async fn resolve(&self) -> DbResult<PathBuf> {
        match self {
            Self::CopyOnFirstRun { source, target } | Self::BundleCopy { source, target } => {
                if tokio::fs::try_exists(target)
                    .await
                    .map_err(|e| DbError::bootstrap(e.to_string(), target.display().to_string()))?
                {
                    debug!(path = %target.display(), "Writable database already present, skipping copy");
                    return Ok(target.clone());
                }
                copy_asset(source, target).await?;
                Ok(target.clone())
            }
            Self::DirectOpen { source } => {
                if !tokio::fs::try_exists(source)
                    .await
                    .map_err(|e| DbError::bootstrap(e.to_string(), source.display().to_string()))?
                {
                    return Err(DbError::bootstrap(
                        "bundled database not found",
                        source.display().to_string(),
                    ));
                }
                debug!(path = %source.display(), "Opening bundled database directly");
                Ok(source.clone())
            }
        }
    }
}

/// Copy the bundled asset into place, creating the target directory if
/// needed.
async fn copy_asset(source: &Path, target: &Path) -> DbResult<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DbError::bootstrap(e.to_string(), parent.display().to_string()))?;
    }

    tokio::fs::copy(source, target)
        .await
        .map_err(|e| DbError::bootstrap(e.to_string(), source.display().to_string()))?;

    info!(
        source = %source.display(),
        target = %target.display(),
        "Copied bundled database to writable location"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_selection() {
        let cfg = NativeConfig::new(Platform::Android, "/assets", "/bundle", "/docs");
        assert!(matches!(
            BootstrapPolicy::for_config(&cfg),
            BootstrapPolicy::CopyOnFirstRun { .. }
        ));

        let cfg = NativeConfig::new(Platform::Ios, "/assets", "/bundle", "/docs");
        assert!(matches!(
            BootstrapPolicy::for_config(&cfg),
            BootstrapPolicy::DirectOpen { .. }
        ));

        let cfg = NativeConfig::new(Platform::Windows, "/assets", "/bundle", "/docs");
        assert!(matches!(
            BootstrapPolicy::for_config(&cfg),
            BootstrapPolicy::BundleCopy { .. }
        ));
    }

    #[test]
    fn test_copy_sources_differ_by_platform() {
        let android = NativeConfig::new(Platform::Android, "/assets", "/bundle", "/docs");
        let windows = NativeConfig::new(Platform::Windows, "/assets", "/bundle", "/docs");

        let BootstrapPolicy::CopyOnFirstRun { source: a, .. } =
            BootstrapPolicy::for_config(&android)
        else {
            panic!("expected copy policy");
        };
        let BootstrapPolicy::BundleCopy { source: w, .. } = BootstrapPolicy::for_config(&windows)
        else {
            panic!("expected copy policy");
        };
        assert!(a.starts_with("/assets"));
        assert!(w.starts_with("/bundle"));
    }

    #[tokio::test]
    async fn test_direct_open_missing_source() {
        let policy = BootstrapPolicy::DirectOpen {
            source: PathBuf::from("/nonexistent/loadmaster.db"),
        };
        let err = policy.resolve().await.unwrap_err();
        assert!(matches!(err, DbError::Bootstrap { .. }));
    }

    #[tokio::test]
    async fn test_copy_on_first_run_then_skip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("asset.db");
        let target = dir.path().join("docs").join("loadmaster.db");
        tokio::fs::write(&source, b"seed").await.unwrap();

        let policy = BootstrapPolicy::CopyOnFirstRun {
            source: source.clone(),
            target: target.clone(),
        };

        let resolved = policy.resolve().await.unwrap();
        assert_eq!(resolved, target);
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"seed");

        // Writable copy diverges; a second resolve must not clobber it.
        tokio::fs::write(&target, b"modified").await.unwrap();
        let resolved = policy.resolve().await.unwrap();
        assert_eq!(resolved, target);
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"modified");
    }
}
