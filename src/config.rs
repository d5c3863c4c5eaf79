//! Configuration for adapter selection and the native bootstrap.
//!
//! Adapter selection is an explicit configuration value handed to the
//! factory, not an ambient environment flag: the process that owns the
//! factory decides once, at construction, which adapter it wants and where
//! the platform keeps its database files.

use std::path::{Path, PathBuf};

/// Fixed database file name shipped with the application bundle.
pub const DATABASE_FILE_NAME: &str = "loadmaster.db";

/// Platform identity, decided once at adapter construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Windows,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Android => write!(f, "android"),
            Platform::Ios => write!(f, "ios"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

/// File locations for the native adapter's bootstrap, parameterized by
/// platform.
#[derive(Debug, Clone)]
pub struct NativeConfig {
    pub platform: Platform,
    /// Database file name within the asset/bundle/document directories.
    pub file_name: String,
    /// Read-only packaged assets (Android copy-on-first-run source).
    pub asset_dir: PathBuf,
    /// Application bundle resources (iOS direct open, Windows copy source).
    pub bundle_dir: PathBuf,
    /// Writable per-app documents directory (copy target).
    pub document_dir: PathBuf,
}

impl NativeConfig {
    /// Create a native config with the standard database file name.
    pub fn new(
        platform: Platform,
        asset_dir: impl Into<PathBuf>,
        bundle_dir: impl Into<PathBuf>,
        document_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform,
            file_name: DATABASE_FILE_NAME.to_string(),
            asset_dir: asset_dir.into(),
            bundle_dir: bundle_dir.into(),
            document_dir: document_dir.into(),
        }
    }

    /// Override the database file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Path of the bundled asset for this platform's copy source.
    pub fn source_path(&self) -> PathBuf {
        match self.platform {
            Platform::Android => self.asset_dir.join(&self.file_name),
            Platform::Ios | Platform::Windows => self.bundle_dir.join(&self.file_name),
        }
    }

    /// Path of the writable working copy.
    pub fn writable_path(&self) -> PathBuf {
        self.document_dir.join(&self.file_name)
    }
}

/// Which adapter the factory should construct.
#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    /// Production adapter backed by a platform-bootstrapped database file.
    Native(NativeConfig),
    /// Test adapter backed by a pure in-memory store.
    InMemory,
    /// Test adapter backed by a durable file.
    File { path: PathBuf, read_only: bool },
}

impl DatabaseConfig {
    /// Convenience constructor for the file-backed test adapter.
    pub fn file(path: impl AsRef<Path>, read_only: bool) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
            read_only,
        }
    }
}
