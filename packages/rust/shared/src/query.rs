//! Query identity: the domain being analyzed, its region, and the report
//! envelopes the Record Source round trip produces.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RankScopeError, Result};
use crate::types::{AiEngineRecord, KeywordRecord};

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// A bare, already-normalized domain or host string (never empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// Accept a normalized domain. Only non-emptiness is checked.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(RankScopeError::invalid_query("domain is required"));
        }
        Ok(Self(raw))
    }

    /// Normalize user input and accept it as a domain.
    pub fn parse_input(input: &str) -> Result<Self> {
        Self::new(normalize_domain(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Domain {
    type Error = RankScopeError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

/// Strip a leading `http://`/`https://` and one trailing slash from user input.
pub fn normalize_domain(input: &str) -> String {
    static SCHEME_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^https?://").expect("valid regex"));

    let trimmed = input.trim();
    let without_scheme = SCHEME_RE.replace(trimmed, "");
    without_scheme
        .strip_suffix('/')
        .unwrap_or(&without_scheme)
        .to_string()
}

// ---------------------------------------------------------------------------
// QueryId
// ---------------------------------------------------------------------------

/// A UUID v7 identifying one issued query (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(pub Uuid);

impl QueryId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// Target market the rankings are requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "UK")]
    Uk,
    #[serde(rename = "CA")]
    Ca,
    #[serde(rename = "AU")]
    Au,
    Global,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Us,
        Region::Uk,
        Region::Ca,
        Region::Au,
        Region::Global,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Uk => "UK",
            Self::Ca => "CA",
            Self::Au => "AU",
            Self::Global => "Global",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Us => "United States",
            Self::Uk => "United Kingdom",
            Self::Ca => "Canada",
            Self::Au => "Australia",
            Self::Global => "Global",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = RankScopeError;

    fn from_str(s: &str) -> Result<Self> {
        Region::ALL
            .into_iter()
            .find(|r| r.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                RankScopeError::config(format!(
                    "unknown region '{s}': expected US, UK, CA, AU or Global"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Report envelopes
// ---------------------------------------------------------------------------

/// Keyword rankings for one domain, as delivered by a Record Source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordReport {
    pub domain: Domain,
    pub keywords: Vec<KeywordRecord>,
    pub total_keywords: usize,
    pub timestamp: DateTime<Utc>,
}

impl KeywordReport {
    pub fn new(domain: Domain, keywords: Vec<KeywordRecord>) -> Self {
        Self {
            domain,
            total_keywords: keywords.len(),
            keywords,
            timestamp: Utc::now(),
        }
    }
}

/// AI answer-engine visibility for one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiVisibilityReport {
    pub domain: Domain,
    pub results: Vec<AiEngineRecord>,
    pub total_engines: usize,
    pub visible_engines: usize,
    pub timestamp: DateTime<Utc>,
}

impl AiVisibilityReport {
    pub fn new(domain: Domain, results: Vec<AiEngineRecord>) -> Self {
        Self {
            domain,
            total_engines: results.len(),
            visible_engines: results.iter().filter(|r| r.found).count(),
            results,
            timestamp: Utc::now(),
        }
    }
}
