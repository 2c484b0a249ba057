//! Shared types, error model, and configuration for RankScope.
//!
//! This crate is the foundation depended on by all other RankScope crates.
//! It provides:
//! - [`RankScopeError`] as the unified error type
//! - Record types ([`KeywordRecord`], [`AiEngineRecord`]) and closed value sets
//! - Query identity ([`Domain`], [`QueryId`], [`Region`]) and report envelopes
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod query;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, SourceConfig, SourceKind, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{RankScopeError, Result};
pub use query::{AiVisibilityReport, Domain, KeywordReport, QueryId, Region, normalize_domain};
pub use types::{
    AiEngine, AiEngineRecord, KeywordRecord, MaxPosition, PositionTier, SortKey, Trend,
    display_url,
};
