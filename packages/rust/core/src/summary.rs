//! Aggregator: flat summary statistics over a record set.
//!
//! Keyword summaries are computed over whatever view they are given, so the
//! figures shown next to a filtered table always describe that table.
//! AI summaries always cover the full record set.

use serde::Serialize;

use rankscope_shared::{AiEngineRecord, KeywordRecord};

/// Summary figures for a keyword view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSummary {
    /// Number of records summarized.
    pub count: usize,
    /// Mean position rounded half-up; 0 for an empty view.
    pub average_position: u32,
    pub top10_count: usize,
    pub total_volume: u64,
}

/// Summary figures for an AI-engine record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummary {
    pub total_engines: usize,
    /// Engines whose answer surfaced the domain.
    pub visible_count: usize,
    /// Sum over every record, visible or not.
    pub total_citations: u64,
    /// Mean confidence over every record, rounded half-up; 0 when empty.
    pub average_confidence: u8,
}

/// Summarize keyword records (typically a filtered view).
pub fn summarize_keywords<'a, I>(records: I) -> KeywordSummary
where
    I: IntoIterator<Item = &'a KeywordRecord>,
{
    let mut summary = KeywordSummary::default();
    let mut position_sum: u64 = 0;

    for record in records {
        summary.count += 1;
        position_sum = position_sum.saturating_add(u64::from(record.position));
        if record.position <= 10 {
            summary.top10_count += 1;
        }
        summary.total_volume = summary.total_volume.saturating_add(record.search_volume);
    }

    // Positions are u32, so their mean is too.
    summary.average_position = rounded_mean(position_sum, summary.count) as u32;
    summary
}

/// Summarize AI-engine records.
pub fn summarize_ai<'a, I>(records: I) -> AiSummary
where
    I: IntoIterator<Item = &'a AiEngineRecord>,
{
    let mut summary = AiSummary::default();
    let mut confidence_sum: u64 = 0;

    for record in records {
        summary.total_engines += 1;
        if record.found {
            summary.visible_count += 1;
        }
        summary.total_citations = summary
            .total_citations
            .saturating_add(u64::from(record.citations));
        confidence_sum = confidence_sum.saturating_add(u64::from(record.confidence));
    }

    // Confidence is bounded by 100, so the mean fits in a u8.
    summary.average_confidence = rounded_mean(confidence_sum, summary.total_engines) as u8;
    summary
}

/// Integer mean rounded half-up, 0 for an empty set.
fn rounded_mean(sum: u64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    let (sum, count) = (u128::from(sum), count as u128);
    ((2 * sum + count) / (2 * count)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankscope_shared::{AiEngine, Trend};

    fn keyword(position: u32, search_volume: u64) -> KeywordRecord {
        KeywordRecord {
            keyword: format!("kw-{position}"),
            position,
            url: format!("https://example.com/kw-{position}"),
            search_volume,
            trend: Trend::Stable,
            change: 1,
        }
    }

    fn engine(engine: AiEngine, found: bool, citations: u32, confidence: u8) -> AiEngineRecord {
        AiEngineRecord {
            engine,
            found,
            citations,
            snippet: String::new(),
            url: "https://example.com".into(),
            position: 1,
            confidence,
        }
    }

    #[test]
    fn keyword_summary_counts() {
        let records = vec![keyword(5, 100), keyword(1, 200), keyword(20, 300)];
        let summary = summarize_keywords(&records);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.top10_count, 2);
        assert!(summary.top10_count <= records.len());
        assert_eq!(summary.total_volume, 600);
        // (5 + 1 + 20) / 3 = 8.67
        assert_eq!(summary.average_position, 9);
    }

    #[test]
    fn oversized_volumes_saturate() {
        let records = vec![keyword(3, u64::MAX), keyword(4, 1)];
        let summary = summarize_keywords(&records);
        assert_eq!(summary.total_volume, u64::MAX);
        assert_eq!(summary.average_position, 4);

        let records = vec![keyword(u32::MAX, 0), keyword(u32::MAX, 0)];
        assert_eq!(summarize_keywords(&records).average_position, u32::MAX);
    }

    #[test]
    fn average_rounds_half_up() {
        let records = vec![keyword(1, 0), keyword(2, 0)];
        assert_eq!(summarize_keywords(&records).average_position, 2);

        let records = vec![keyword(1, 0), keyword(1, 0), keyword(2, 0)];
        assert_eq!(summarize_keywords(&records).average_position, 1);
    }

    #[test]
    fn empty_keyword_set_is_zeroed() {
        let summary = summarize_keywords(&Vec::<KeywordRecord>::new());
        assert_eq!(summary, KeywordSummary::default());
        assert_eq!(summary.average_position, 0);
    }

    #[test]
    fn ten_is_inside_top_ten() {
        let records = vec![keyword(10, 0), keyword(11, 0)];
        assert_eq!(summarize_keywords(&records).top10_count, 1);
    }

    #[test]
    fn invisible_engines_still_count_toward_citations_and_confidence() {
        let records = vec![
            engine(AiEngine::Perplexity, true, 10, 90),
            engine(AiEngine::ChatGpt, true, 5, 80),
            engine(AiEngine::Gemini, false, 4, 71),
            engine(AiEngine::Claude, true, 1, 76),
        ];
        let summary = summarize_ai(&records);

        assert_eq!(summary.total_engines, 4);
        assert_eq!(summary.visible_count, 3);
        assert_eq!(summary.total_citations, 20);
        // (90 + 80 + 71 + 76) / 4 = 79.25
        assert_eq!(summary.average_confidence, 79);
    }

    #[test]
    fn empty_ai_set_is_zeroed() {
        let summary = summarize_ai(&Vec::<AiEngineRecord>::new());
        assert_eq!(summary, AiSummary::default());
    }
}
