//! Domain-to-target resolution subsystem.
//!
//! # Data Flow
//! ```text
//! resolve(domain, protocol)
//!     → cache.rs (hit: refresh expiry, return)
//!     → source.rs (miss: load per-domain record)
//!     → merge.rs (default → template → record)
//!     → cache.rs (store merged set)
//!     → pick (host, port) for protocol
//!
//! Background:
//!     sweeper.rs → cache.rs evict_expired, every cleanup interval
//! ```
//!
//! # Design Decisions
//! - The cache is an explicitly constructed object shared via Arc
//! - Expired entries read as misses; only the sweeper deletes them
//! - A broken domain record is an error, never a silent fallback
//! - Resolved sets are stored behind Arc so readers never see a partial update

pub mod cache;
pub mod merge;
pub mod resolver;
pub mod source;
pub mod sweeper;
pub mod target;

pub use cache::ResolutionCache;
pub use merge::merge;
pub use resolver::{CacheStatus, Resolution, ResolveError, Resolver};
pub use source::{DomainSource, FsDomainSource, LoadError, StaticDomainSource};
pub use sweeper::Sweeper;
pub use target::{Protocol, Target, TargetSet, UnknownProtocol};
