//! Filter/Sort Stage for the keyword view, and detail expansion for the AI view.
//!
//! Views borrow the records they were built from; nothing here clones or
//! mutates a record.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use rankscope_shared::{AiEngine, DefaultsConfig, KeywordRecord, MaxPosition, SortKey};

use crate::summary::{KeywordSummary, summarize_keywords};

// ---------------------------------------------------------------------------
// Keyword view
// ---------------------------------------------------------------------------

/// User-selected filter and sort for the keyword view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub max_position: MaxPosition,
    pub sort: SortKey,
}

impl From<&DefaultsConfig> for ViewConfig {
    fn from(defaults: &DefaultsConfig) -> Self {
        Self {
            max_position: defaults.max_position,
            sort: defaults.sort,
        }
    }
}

/// An ordered, filtered selection of keyword records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordView<'a> {
    rows: Vec<&'a KeywordRecord>,
}

impl<'a> KeywordView<'a> {
    pub fn rows(&self) -> &[&'a KeywordRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a KeywordRecord> + '_ {
        self.rows.iter().copied()
    }

    /// Summary over exactly the rows in this view.
    pub fn summary(&self) -> KeywordSummary {
        summarize_keywords(self.iter())
    }
}

/// Filter records to `position <= max_position` and order them by `sort`.
///
/// Both orderings are stable: records with equal keys keep source order.
#[instrument(skip(records), fields(total = records.len()))]
pub fn apply_view(records: &[KeywordRecord], config: ViewConfig) -> KeywordView<'_> {
    let max = config.max_position.value();
    let mut rows: Vec<&KeywordRecord> = records.iter().filter(|r| r.position <= max).collect();

    match config.sort {
        SortKey::Position => rows.sort_by_key(|r| r.position),
        SortKey::Volume => rows.sort_by_key(|r| Reverse(r.search_volume)),
    }

    debug!(shown = rows.len(), "keyword view applied");
    KeywordView { rows }
}

// ---------------------------------------------------------------------------
// AI detail expansion
// ---------------------------------------------------------------------------

/// Which AI engine card, if any, shows its snippet and source link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "engine", rename_all = "lowercase")]
pub enum Expansion {
    #[default]
    Collapsed,
    Expanded(AiEngine),
}

impl Expansion {
    /// Toggle `engine`: selecting the expanded engine collapses it, any
    /// other selection replaces the current one.
    #[must_use]
    pub fn select(self, engine: AiEngine) -> Self {
        match self {
            Self::Expanded(current) if current == engine => Self::Collapsed,
            _ => Self::Expanded(engine),
        }
    }

    pub fn is_expanded(self, engine: AiEngine) -> bool {
        self == Self::Expanded(engine)
    }

    pub fn expanded(self) -> Option<AiEngine> {
        match self {
            Self::Collapsed => None,
            Self::Expanded(engine) => Some(engine),
        }
    }
}
