//! Per-domain override records.
//!
//! # Responsibilities
//! - Look up the override record for one domain
//! - Distinguish "no record" (normal) from "record is broken" (an error)
//!
//! The filesystem implementation reads `<config-path>/conf.d/<domain>`, one
//! JSON [`TargetSet`] per file.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use crate::resolve::target::TargetSet;

/// Why an existing override record could not be used.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of per-domain override records.
pub trait DomainSource: Send + Sync + 'static {
    /// Load the override for `domain`.
    ///
    /// `Ok(None)` means the domain has no record of its own.
    fn load(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Option<TargetSet>, LoadError>> + Send;
}

/// Reads override records from a `conf.d` directory.
#[derive(Debug, Clone)]
pub struct FsDomainSource {
    dir: PathBuf,
}

impl FsDomainSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Source rooted at `<config_path>/conf.d`.
    pub fn under(config_path: &Path) -> Self {
        Self::new(config_path.join("conf.d"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a domain, or `None` if the name could escape the directory.
    fn record_path(&self, domain: &str) -> Option<PathBuf> {
        let unsafe_name = domain.is_empty()
            || domain.starts_with('.')
            || domain.contains(['/', '\\', '\0']);
        if unsafe_name {
            return None;
        }
        Some(self.dir.join(domain))
    }
}

impl DomainSource for FsDomainSource {
    async fn load(&self, domain: &str) -> Result<Option<TargetSet>, LoadError> {
        let Some(path) = self.record_path(domain) else {
            tracing::debug!(domain = %domain, "Domain name not usable as a record path");
            return Ok(None);
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(LoadError::Read { path, source }),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| LoadError::Decode {
                origin: path.display().to_string(),
                source,
            })
    }
}

/// In-memory records, keyed by domain, stored as raw JSON.
///
/// Keeping the raw text means a malformed record behaves exactly like a
/// malformed file would.
#[derive(Debug, Clone, Default)]
pub struct StaticDomainSource {
    records: HashMap<String, String>,
}

impl StaticDomainSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, domain: impl Into<String>, json: impl Into<String>) -> Self {
        self.records.insert(domain.into(), json.into());
        self
    }
}

impl DomainSource for StaticDomainSource {
    async fn load(&self, domain: &str) -> Result<Option<TargetSet>, LoadError> {
        let Some(json) = self.records.get(domain) else {
            return Ok(None);
        };
        serde_json::from_str(json)
            .map(Some)
            .map_err(|source| LoadError::Decode {
                origin: format!("record for {domain}"),
                source,
            })
    }
}
