//! Record types and closed value sets for the ranking & visibility pipelines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RankScopeError, Result};

/// Maximum number of characters shown by [`display_url`].
const DISPLAY_URL_MAX_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Direction a keyword's ranking moved since the last observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    /// All trends, in the order the synthesizer draws from.
    pub const ALL: [Trend; 3] = [Trend::Up, Trend::Down, Trend::Stable];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }

    /// Render `change` with the sign implied by this trend.
    ///
    /// A stable trend renders nothing: its `change` carries no meaning.
    pub fn signed_change(self, change: u32) -> String {
        match self {
            Self::Up => format!("+{change}"),
            Self::Down => format!("-{change}"),
            Self::Stable => String::new(),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trend {
    type Err = RankScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "stable" => Ok(Self::Stable),
            other => Err(RankScopeError::contract(format!("unknown trend '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// AiEngine
// ---------------------------------------------------------------------------

/// The closed set of AI answer engines tracked for visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AiEngine {
    Perplexity,
    #[serde(rename = "ChatGPT")]
    ChatGpt,
    Gemini,
    Claude,
}

impl AiEngine {
    /// Every tracked engine, in reporting order.
    pub const ALL: [AiEngine; 4] = [
        AiEngine::Perplexity,
        AiEngine::ChatGpt,
        AiEngine::Gemini,
        AiEngine::Claude,
    ];

    /// Display name, identical to the wire representation.
    pub fn name(self) -> &'static str {
        match self {
            Self::Perplexity => "Perplexity",
            Self::ChatGpt => "ChatGPT",
            Self::Gemini => "Gemini",
            Self::Claude => "Claude",
        }
    }

    /// Glyph shown next to the engine name.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Perplexity => "🔮",
            Self::ChatGpt => "💬",
            Self::Gemini => "✨",
            Self::Claude => "🤖",
        }
    }
}

impl fmt::Display for AiEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AiEngine {
    type Err = RankScopeError;

    /// Case-insensitive lookup by display name.
    fn from_str(s: &str) -> Result<Self> {
        AiEngine::ALL
            .into_iter()
            .find(|engine| engine.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                RankScopeError::invalid_query(format!(
                    "unknown engine '{s}': expected one of Perplexity, ChatGPT, Gemini, Claude"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// KeywordRecord
// ---------------------------------------------------------------------------

/// One classic search-engine ranking observation for a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    /// The tracked search term (non-empty).
    pub keyword: String,
    /// 1-based rank in the results page.
    pub position: u32,
    /// Absolute URL of the ranking page.
    pub url: String,
    /// Estimated monthly search volume.
    pub search_volume: u64,
    /// Ranking movement direction.
    pub trend: Trend,
    /// Magnitude of the movement; still present when `trend` is stable.
    pub change: u32,
}

impl KeywordRecord {
    /// Check the record against the data contract.
    ///
    /// Non-negativity is already guaranteed by the unsigned field types.
    pub fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            return Err(RankScopeError::contract("keyword must not be empty"));
        }
        if self.position < 1 {
            return Err(RankScopeError::contract(format!(
                "keyword '{}': position must be >= 1",
                self.keyword
            )));
        }
        validate_absolute_url(&self.url)
            .map_err(|e| RankScopeError::contract(format!("keyword '{}': {e}", self.keyword)))
    }

    /// Badge grouping for this record's position.
    pub fn tier(&self) -> PositionTier {
        PositionTier::of(self.position)
    }
}

// ---------------------------------------------------------------------------
// AiEngineRecord
// ---------------------------------------------------------------------------

/// Presence/citation data for the queried domain in one AI answer engine.
///
/// When `found` is false, `citations`, `position` and `confidence` are not
/// meaningful even though the source still populates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiEngineRecord {
    pub engine: AiEngine,
    /// Whether the engine's answer surfaced the domain at all.
    pub found: bool,
    pub citations: u32,
    pub snippet: String,
    pub url: String,
    pub position: u32,
    /// Confidence percentage in `[0, 100]`.
    pub confidence: u8,
}

impl AiEngineRecord {
    /// Check the record against the data contract.
    pub fn validate(&self) -> Result<()> {
        if self.position < 1 {
            return Err(RankScopeError::contract(format!(
                "{}: position must be >= 1",
                self.engine
            )));
        }
        if self.confidence > 100 {
            return Err(RankScopeError::contract(format!(
                "{}: confidence {} out of range [0, 100]",
                self.engine, self.confidence
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// View configuration
// ---------------------------------------------------------------------------

/// Upper bound on position for the keyword view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum MaxPosition {
    Top10,
    Top20,
    Top50,
    /// Show everything.
    #[default]
    Top100,
}

impl MaxPosition {
    pub const ALL: [MaxPosition; 4] = [
        MaxPosition::Top10,
        MaxPosition::Top20,
        MaxPosition::Top50,
        MaxPosition::Top100,
    ];

    pub fn value(self) -> u32 {
        match self {
            Self::Top10 => 10,
            Self::Top20 => 20,
            Self::Top50 => 50,
            Self::Top100 => 100,
        }
    }
}

impl TryFrom<u32> for MaxPosition {
    type Error = RankScopeError;

    fn try_from(value: u32) -> Result<Self> {
        MaxPosition::ALL
            .into_iter()
            .find(|max| max.value() == value)
            .ok_or_else(|| {
                RankScopeError::config(format!(
                    "max position {value} not supported: expected 10, 20, 50 or 100"
                ))
            })
    }
}

impl From<MaxPosition> for u32 {
    fn from(max: MaxPosition) -> Self {
        max.value()
    }
}

impl FromStr for MaxPosition {
    type Err = RankScopeError;

    fn from_str(s: &str) -> Result<Self> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| RankScopeError::config(format!("invalid max position '{s}'")))?;
        Self::try_from(value)
    }
}

impl fmt::Display for MaxPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Ordering applied to the keyword view. The two keys never combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Position ascending.
    #[default]
    Position,
    /// Search volume descending.
    Volume,
}

impl FromStr for SortKey {
    type Err = RankScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "position" => Ok(Self::Position),
            "volume" => Ok(Self::Volume),
            other => Err(RankScopeError::config(format!(
                "unknown sort key '{other}': expected 'position' or 'volume'"
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("position"),
            Self::Volume => f.write_str("volume"),
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation helpers
// ---------------------------------------------------------------------------

/// Badge grouping for a ranking position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionTier {
    Top3,
    Top10,
    Beyond,
}

impl PositionTier {
    pub fn of(position: u32) -> Self {
        match position {
            0..=3 => Self::Top3,
            4..=10 => Self::Top10,
            _ => Self::Beyond,
        }
    }
}

/// Shorten a URL for tabular display: drop the scheme, cap the length.
pub fn display_url(url: &str) -> String {
    let bare = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    bare.chars().take(DISPLAY_URL_MAX_CHARS).collect()
}

fn validate_absolute_url(raw: &str) -> Result<()> {
    let parsed =
        Url::parse(raw).map_err(|e| RankScopeError::contract(format!("invalid url '{raw}': {e}")))?;
    if parsed.cannot_be_a_base() {
        return Err(RankScopeError::contract(format!(
            "url '{raw}' is not absolute"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(position: u32) -> KeywordRecord {
        KeywordRecord {
            keyword: "seo services".into(),
            position,
            url: "https://example.com/seo-services".into(),
            search_volume: 12_000,
            trend: Trend::Up,
            change: 3,
        }
    }

    #[test]
    fn keyword_record_wire_format() {
        let json = serde_json::to_value(keyword(4)).expect("serialize");
        assert_eq!(json["searchVolume"], 12_000);
        assert_eq!(json["trend"], "up");

        let parsed: KeywordRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, keyword(4));
    }

    #[test]
    fn keyword_validation_rejects_contract_violations() {
        assert!(keyword(1).validate().is_ok());
        assert!(keyword(0).validate().is_err());

        let mut blank = keyword(2);
        blank.keyword = "  ".into();
        assert!(blank.validate().is_err());

        let mut relative = keyword(2);
        relative.url = "/seo-services".into();
        let err = relative.validate().unwrap_err();
        assert!(matches!(err, RankScopeError::Contract { .. }));
    }

    #[test]
    fn negative_volume_fails_to_decode() {
        let json = r#"{"keyword":"x","position":1,"url":"https://a.com/x",
                      "searchVolume":-5,"trend":"up","change":1}"#;
        assert!(serde_json::from_str::<KeywordRecord>(json).is_err());
    }

    #[test]
    fn ai_engine_names_and_lookup() {
        let json = serde_json::to_string(&AiEngine::ChatGpt).expect("serialize");
        assert_eq!(json, "\"ChatGPT\"");
        assert_eq!("chatgpt".parse::<AiEngine>().unwrap(), AiEngine::ChatGpt);
        assert_eq!(" Claude ".parse::<AiEngine>().unwrap(), AiEngine::Claude);
        assert!("Bing".parse::<AiEngine>().is_err());
        assert!(serde_json::from_str::<AiEngine>("\"Bing\"").is_err());
    }

    #[test]
    fn ai_record_confidence_bound() {
        let mut record = AiEngineRecord {
            engine: AiEngine::Gemini,
            found: false,
            citations: 4,
            snippet: "example.com offers detailed analysis".into(),
            url: "https://example.com/blog".into(),
            position: 3,
            confidence: 100,
        };
        assert!(record.validate().is_ok());
        record.confidence = 101;
        assert!(record.validate().is_err());
        record.confidence = 90;
        record.position = 0;
        assert!(record.validate().is_err());
    }

    #[test]
    fn max_position_accepts_only_fixed_set() {
        assert_eq!(MaxPosition::try_from(20).unwrap(), MaxPosition::Top20);
        assert!(MaxPosition::try_from(30).is_err());
        assert_eq!("50".parse::<MaxPosition>().unwrap(), MaxPosition::Top50);
        assert_eq!(MaxPosition::default().value(), 100);
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!("Volume".parse::<SortKey>().unwrap(), SortKey::Volume);
        assert_eq!(SortKey::default(), SortKey::Position);
        assert!("rank".parse::<SortKey>().is_err());
    }

    #[test]
    fn trend_signed_change() {
        assert_eq!(Trend::Up.signed_change(4), "+4");
        assert_eq!(Trend::Down.signed_change(2), "-2");
        assert_eq!(Trend::Stable.signed_change(7), "");
    }

    #[test]
    fn position_tiers() {
        assert_eq!(PositionTier::of(1), PositionTier::Top3);
        assert_eq!(PositionTier::of(3), PositionTier::Top3);
        assert_eq!(PositionTier::of(10), PositionTier::Top10);
        assert_eq!(PositionTier::of(11), PositionTier::Beyond);
    }

    #[test]
    fn display_url_strips_scheme_and_truncates() {
        assert_eq!(display_url("https://example.com/a"), "example.com/a");
        assert_eq!(display_url("http://example.com"), "example.com");
        let long = format!("https://example.com/{}", "x".repeat(80));
        assert_eq!(display_url(&long).chars().count(), 50);
    }

    #[test]
    fn keyword_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/keywords.fixture.json")
            .expect("read fixture");
        let value: serde_json::Value = serde_json::from_str(&fixture).expect("parse fixture");
        let records: Vec<KeywordRecord> =
            serde_json::from_value(value["keywords"].clone()).expect("deserialize keywords");
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.validate().is_ok()));
        assert_eq!(records[2].trend, Trend::Stable);
    }
}
