//! Synthesizing Record Source: pseudo-random records, no network.

use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use rankscope_shared::{
    AiEngine, AiEngineRecord, Domain, KeywordRecord, Region, Result, SourceConfig, Trend,
};

use crate::RecordSource;

/// Number of vocabulary terms reported per domain.
const KEYWORDS_PER_DOMAIN: usize = 50;

const VOCABULARY: &[&str] = &[
    "digital marketing", "seo services", "content marketing", "social media marketing",
    "email marketing", "ppc advertising", "marketing automation", "conversion optimization",
    "web analytics", "brand strategy", "influencer marketing", "video marketing",
    "mobile marketing", "marketing analytics", "customer retention", "lead generation",
    "marketing software", "growth hacking", "viral marketing", "content strategy",
    "marketing tools", "online advertising", "search engine marketing", "display advertising",
    "remarketing", "marketing campaigns", "customer acquisition", "marketing metrics",
    "b2b marketing", "b2c marketing", "affiliate marketing", "referral marketing",
    "marketing funnel", "customer journey", "marketing roi", "brand awareness",
    "marketing budget", "competitive analysis", "market research", "target audience",
    "buyer persona", "marketing plan", "promotional strategy", "product launch",
    "marketing channels", "omnichannel marketing", "personalization", "marketing segmentation",
    "customer engagement", "marketing trends", "digital strategy", "online branding",
    "ecommerce marketing", "local seo", "voice search optimization", "featured snippets",
    "backlink strategy", "keyword research", "on-page seo", "technical seo",
    "content optimization", "link building", "domain authority", "page speed optimization",
    "mobile optimization", "user experience", "landing page design", "call to action",
    "conversion rate", "bounce rate", "engagement metrics", "traffic analysis",
    "organic traffic", "paid traffic", "referral traffic", "social traffic", "direct traffic",
    "click through rate", "cost per click", "cost per acquisition", "return on ad spend",
    "lifetime value", "churn rate", "retention rate", "marketing attribution",
    "multi-touch attribution", "first-click attribution", "last-click attribution",
    "marketing mix modeling", "predictive analytics", "machine learning marketing",
    "ai marketing", "chatbot marketing", "conversational marketing", "account based marketing",
    "demand generation", "inbound marketing", "outbound marketing", "content distribution",
    "syndication", "guest posting", "public relations", "press release", "media outreach",
    "crisis management", "reputation management", "online reviews", "testimonials",
];

/// Record Source that synthesizes plausible records for any domain.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    seed: Option<u64>,
    keyword_latency: Duration,
    ai_latency: Duration,
}

impl MockSource {
    /// A source with no latency and fresh entropy on every call.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            seed: config.seed,
            keyword_latency: config.keyword_latency(),
            ai_latency: config.ai_latency(),
        }
    }

    /// Make every call produce the same records.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Delay each call to mimic a network round trip.
    pub fn with_latency(mut self, keywords: Duration, ai: Duration) -> Self {
        self.keyword_latency = keywords;
        self.ai_latency = ai;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[async_trait]
impl RecordSource for MockSource {
    async fn fetch_keyword_records(
        &self,
        domain: &Domain,
        region: Region,
    ) -> Result<Vec<KeywordRecord>> {
        // Records are drawn before sleeping so the RNG never lives across an await.
        let records = synthesize_keywords(domain, &mut self.rng());
        debug!(
            %domain,
            %region,
            latency_ms = self.keyword_latency.as_millis() as u64,
            "synthesized keyword records"
        );
        simulate_latency(self.keyword_latency).await;
        Ok(records)
    }

    async fn fetch_ai_engine_records(
        &self,
        domain: &Domain,
        region: Region,
    ) -> Result<Vec<AiEngineRecord>> {
        let records = synthesize_ai_records(domain, &mut self.rng());
        debug!(
            %domain,
            %region,
            latency_ms = self.ai_latency.as_millis() as u64,
            "synthesized AI engine records"
        );
        simulate_latency(self.ai_latency).await;
        Ok(records)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

/// Generate keyword rankings for the first fifty vocabulary terms.
///
/// Positions drift upward with vocabulary order, so ranks are roughly
/// ordered but collide often.
pub fn synthesize_keywords(domain: &Domain, rng: &mut impl Rng) -> Vec<KeywordRecord> {
    VOCABULARY
        .iter()
        .take(KEYWORDS_PER_DOMAIN)
        .enumerate()
        .map(|(index, keyword)| KeywordRecord {
            keyword: (*keyword).to_string(),
            position: index as u32 + 1 + rng.gen_range(0..5),
            url: format!("https://{domain}/{}", slugify(keyword)),
            search_volume: rng.gen_range(0..50_000) + 1_000,
            trend: Trend::ALL[rng.gen_range(0..Trend::ALL.len())],
            change: rng.gen_range(0..10) + 1,
        })
        .collect()
}

/// Generate one visibility record per tracked engine, in reporting order.
pub fn synthesize_ai_records(domain: &Domain, rng: &mut impl Rng) -> Vec<AiEngineRecord> {
    AiEngine::ALL
        .into_iter()
        .map(|engine| {
            let profile = EngineProfile::of(engine);
            AiEngineRecord {
                engine,
                found: rng.gen_bool(profile.found_probability),
                citations: rng.gen_range(0..profile.citation_spread) + profile.citation_floor,
                snippet: (profile.snippet)(domain),
                url: format!("https://{domain}/{}", profile.path),
                position: rng.gen_range(0..profile.position_spread) + 1,
                confidence: rng.gen_range(0..profile.confidence_spread) + profile.confidence_floor,
            }
        })
        .collect()
}

/// Per-engine synthesis ranges.
struct EngineProfile {
    found_probability: f64,
    citation_floor: u32,
    citation_spread: u32,
    position_spread: u32,
    confidence_floor: u8,
    confidence_spread: u8,
    path: &'static str,
    snippet: fn(&Domain) -> String,
}

impl EngineProfile {
    fn of(engine: AiEngine) -> Self {
        match engine {
            AiEngine::Perplexity => Self {
                found_probability: 1.0,
                citation_floor: 5,
                citation_spread: 15,
                position_spread: 3,
                confidence_floor: 80,
                confidence_spread: 20,
                path: "featured-article",
                snippet: |d| {
                    format!(
                        "According to {d}, this comprehensive guide covers the essential aspects of the topic. \
                         The content provides valuable insights backed by research and practical examples."
                    )
                },
            },
            AiEngine::ChatGpt => Self {
                found_probability: 1.0,
                citation_floor: 3,
                citation_spread: 12,
                position_spread: 5,
                confidence_floor: 75,
                confidence_spread: 15,
                path: "resources",
                snippet: |d| {
                    format!(
                        "Based on information from {d}, here are the key points to consider. \
                         This source has been cited multiple times for its authoritative content."
                    )
                },
            },
            AiEngine::Gemini => Self {
                found_probability: 0.7,
                citation_floor: 2,
                citation_spread: 10,
                position_spread: 7,
                confidence_floor: 70,
                confidence_spread: 25,
                path: "blog",
                snippet: |d| {
                    format!(
                        "{d} offers detailed analysis on this subject. \
                         Their research-backed approach makes them a reliable source for this information."
                    )
                },
            },
            AiEngine::Claude => Self {
                found_probability: 0.6,
                citation_floor: 1,
                citation_spread: 8,
                position_spread: 8,
                confidence_floor: 75,
                confidence_spread: 20,
                path: "guides",
                snippet: |d| {
                    format!(
                        "The information from {d} provides a thorough exploration of the topic \
                         with practical applications and real-world examples."
                    )
                },
            },
        }
    }
}

fn slugify(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
