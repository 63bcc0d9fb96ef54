//! Domain resolution: cache, then load + merge, then protocol lookup.

use std::sync::Arc;

use crate::config::GlobalConfig;
use crate::observability::metrics;
use crate::resolve::cache::ResolutionCache;
use crate::resolve::merge::merge;
use crate::resolve::source::{DomainSource, LoadError};
use crate::resolve::target::{Protocol, TargetSet};

/// Failures a lookup can report to the boundary layer.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A per-domain record exists but is unusable. Never downgraded to the
    /// default targets.
    #[error("unable to load proxy config for {domain}: {source}")]
    ConfigDecode {
        domain: String,
        #[source]
        source: LoadError,
    },

    #[error("unable to find proxy server or port for protocol: '{protocol}'")]
    UnknownProtocolOrTarget { protocol: String },
}

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// A resolved backend for one (domain, protocol) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub host: String,
    pub port: u16,
    pub cache: CacheStatus,
}

/// Resolves domains to backend targets.
pub struct Resolver<S> {
    global: Arc<GlobalConfig>,
    cache: Arc<ResolutionCache>,
    source: S,
}

impl<S: DomainSource> Resolver<S> {
    pub fn new(global: Arc<GlobalConfig>, cache: Arc<ResolutionCache>, source: S) -> Self {
        Self {
            global,
            cache,
            source,
        }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Resolve `domain` to the backend serving `protocol`.
    pub async fn resolve(&self, domain: &str, protocol: &str) -> Result<Resolution, ResolveError> {
        let (resolved, status) = match self.cache.get(domain) {
            Some(resolved) => (resolved, CacheStatus::Hit),
            None => {
                let merged = self.effective_targets(domain).await?;
                (self.cache.put(domain, merged), CacheStatus::Miss)
            }
        };
        metrics::record_cache_lookup(status == CacheStatus::Hit);

        tracing::debug!(
            domain = %domain,
            protocol = %protocol,
            cache = status.as_str(),
            "Domain resolved"
        );

        let target = protocol
            .parse::<Protocol>()
            .ok()
            .and_then(|p| resolved.get(p))
            .filter(|target| !target.host.trim().is_empty())
            .ok_or_else(|| ResolveError::UnknownProtocolOrTarget {
                protocol: protocol.to_string(),
            })?;

        Ok(Resolution {
            host: target.host.clone(),
            port: target.port.get(),
            cache: status,
        })
    }

    /// Load the domain's record and merge it over the configured layers.
    async fn effective_targets(&self, domain: &str) -> Result<TargetSet, ResolveError> {
        let record = self
            .source
            .load(domain)
            .await
            .map_err(|source| ResolveError::ConfigDecode {
                domain: domain.to_string(),
                source,
            })?;

        let Some(record) = record else {
            return Ok(merge(&self.global.default, None, None));
        };

        let template = match record.template.as_deref() {
            Some(name) => {
                let found = self.global.templates.get(name);
                if found.is_none() {
                    tracing::warn!(
                        domain = %domain,
                        template = %name,
                        "Domain config names an unknown template, ignoring it"
                    );
                    metrics::record_template_missing();
                }
                found
            }
            None => None,
        };

        Ok(merge(&self.global.default, template, Some(&record)))
    }
}
