//! Record Sources: where raw keyword and AI-engine records come from.
//!
//! The engine never talks to a data provider directly. It consumes the
//! [`RecordSource`] capability, so the synthesizing [`MockSource`] can be
//! swapped for a real provider ([`HttpSource`]) without touching the
//! aggregation, view, or export code.
//!
//! Records cross into the engine through [`fetch_keyword_report`] and
//! [`fetch_ai_report`], which enforce the data contract: a malformed record
//! rejects the whole round trip instead of being tolerated downstream.

mod http;
mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use rankscope_shared::{
    AiEngineRecord, AiVisibilityReport, Domain, KeywordRecord, KeywordReport, Region, Result,
    SourceConfig, SourceKind,
};

pub use http::HttpSource;
pub use mock::{MockSource, synthesize_ai_records, synthesize_keywords};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A provider of raw per-domain ranking and visibility records.
///
/// Both methods return records in source order; transport failures surface
/// as `SourceUnavailable`.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch classic search-engine keyword rankings for `domain`.
    async fn fetch_keyword_records(
        &self,
        domain: &Domain,
        region: Region,
    ) -> Result<Vec<KeywordRecord>>;

    /// Fetch AI answer-engine visibility records for `domain`.
    async fn fetch_ai_engine_records(
        &self,
        domain: &Domain,
        region: Region,
    ) -> Result<Vec<AiEngineRecord>>;

    /// Human-readable source name for tracing.
    fn name(&self) -> &str;
}

/// Build the configured Record Source.
pub fn build_source(config: &SourceConfig) -> Result<Arc<dyn RecordSource>> {
    match config.kind {
        SourceKind::Mock => Ok(Arc::new(MockSource::from_config(config))),
        SourceKind::Http => Ok(Arc::new(HttpSource::new(
            &config.base_url,
            config.timeout(),
        )?)),
    }
}

// ---------------------------------------------------------------------------
// Boundary
// ---------------------------------------------------------------------------

/// Fetch keyword records, enforce the data contract, and wrap them in a report.
#[instrument(skip_all, fields(source = source.name(), %domain, %region))]
pub async fn fetch_keyword_report(
    source: &dyn RecordSource,
    domain: &Domain,
    region: Region,
) -> Result<KeywordReport> {
    let records = source.fetch_keyword_records(domain, region).await?;
    for record in &records {
        if let Err(e) = record.validate() {
            warn!(error = %e, "rejecting keyword record set");
            return Err(e);
        }
    }

    info!(count = records.len(), "keyword records received");
    Ok(KeywordReport::new(domain.clone(), records))
}

/// Fetch AI-engine records, enforce the data contract, and wrap them in a report.
#[instrument(skip_all, fields(source = source.name(), %domain, %region))]
pub async fn fetch_ai_report(
    source: &dyn RecordSource,
    domain: &Domain,
    region: Region,
) -> Result<AiVisibilityReport> {
    let records = source.fetch_ai_engine_records(domain, region).await?;
    for record in &records {
        if let Err(e) = record.validate() {
            warn!(error = %e, "rejecting AI engine record set");
            return Err(e);
        }
    }

    info!(count = records.len(), "AI engine records received");
    Ok(AiVisibilityReport::new(domain.clone(), records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankscope_shared::{AiEngine, RankScopeError, Trend};

    /// Returns fixed records, optionally with a contract violation.
    struct FixedSource {
        keywords: Vec<KeywordRecord>,
        ai: Vec<AiEngineRecord>,
    }

    #[async_trait]
    impl RecordSource for FixedSource {
        async fn fetch_keyword_records(
            &self,
            _domain: &Domain,
            _region: Region,
        ) -> Result<Vec<KeywordRecord>> {
            Ok(self.keywords.clone())
        }

        async fn fetch_ai_engine_records(
            &self,
            _domain: &Domain,
            _region: Region,
        ) -> Result<Vec<AiEngineRecord>> {
            Ok(self.ai.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn keyword(position: u32, url: &str) -> KeywordRecord {
        KeywordRecord {
            keyword: "lead generation".into(),
            position,
            url: url.into(),
            search_volume: 2_000,
            trend: Trend::Down,
            change: 1,
        }
    }

    fn ai(confidence: u8) -> AiEngineRecord {
        AiEngineRecord {
            engine: AiEngine::Claude,
            found: true,
            citations: 2,
            snippet: "cited".into(),
            url: "https://example.com/guides".into(),
            position: 2,
            confidence,
        }
    }

    fn domain() -> Domain {
        Domain::new("example.com").unwrap()
    }

    #[tokio::test]
    async fn valid_records_become_reports() {
        let source = FixedSource {
            keywords: vec![keyword(1, "https://example.com/a"), keyword(9, "https://example.com/b")],
            ai: vec![ai(77)],
        };

        let report = fetch_keyword_report(&source, &domain(), Region::Us)
            .await
            .unwrap();
        assert_eq!(report.total_keywords, 2);
        assert_eq!(report.domain, domain());

        let ai_report = fetch_ai_report(&source, &domain(), Region::Us).await.unwrap();
        assert_eq!(ai_report.visible_engines, 1);
    }

    #[tokio::test]
    async fn empty_record_set_is_not_an_error() {
        let source = FixedSource {
            keywords: vec![],
            ai: vec![],
        };
        let report = fetch_keyword_report(&source, &domain(), Region::Global)
            .await
            .unwrap();
        assert_eq!(report.total_keywords, 0);
    }

    #[tokio::test]
    async fn malformed_records_are_rejected_at_the_boundary() {
        let source = FixedSource {
            keywords: vec![keyword(3, "https://example.com/a"), keyword(4, "not a url")],
            ai: vec![ai(101)],
        };

        let err = fetch_keyword_report(&source, &domain(), Region::Us)
            .await
            .unwrap_err();
        assert!(matches!(err, RankScopeError::Contract { .. }));

        let err = fetch_ai_report(&source, &domain(), Region::Us).await.unwrap_err();
        assert!(err.to_string().contains("confidence 101"));
    }

    #[test]
    fn build_source_selects_kind() {
        let mock = build_source(&SourceConfig::default()).unwrap();
        assert_eq!(mock.name(), "mock");

        let http = build_source(&SourceConfig {
            kind: SourceKind::Http,
            base_url: "https://ranks.example.net".into(),
            ..SourceConfig::default()
        })
        .unwrap();
        assert_eq!(http.name(), "http");

        let bad = build_source(&SourceConfig {
            kind: SourceKind::Http,
            base_url: "not a url".into(),
            ..SourceConfig::default()
        });
        assert!(bad.is_err());
    }
}
