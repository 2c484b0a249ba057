//! Human-readable and JSON rendering of session state.

use std::fmt::Write;
use std::path::Path;

use serde_json::{Value, json};

use rankscope_core::Session;
use rankscope_shared::{KeywordRecord, PositionTier, Trend, display_url};

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Keyword table plus the summary of exactly the rows shown.
pub(crate) fn keyword_section(session: &Session) -> String {
    let mut out = String::new();
    let (Some(state), Some(view)) = (session.current(), session.keyword_view()) else {
        return out;
    };
    let total = state.keywords.ready().map_or(0, |r| r.total_keywords);
    let summary = view.summary();

    let _ = writeln!(out, "Keyword Rankings for {} ({})", state.domain, state.region.label());
    let _ = writeln!(
        out,
        "Showing {} of {} keywords in the top {}, sorted by {}",
        view.len(),
        total,
        state.view.max_position,
        state.view.sort,
    );
    let _ = writeln!(out);

    if view.is_empty() {
        let _ = writeln!(out, "  No rankings in the top {}.", state.view.max_position);
    } else {
        let _ = writeln!(
            out,
            "  {:<6} {:<34} {:<8} {:>10}  URL",
            "Pos", "Keyword", "Trend", "Volume"
        );
        for record in view.iter() {
            let _ = writeln!(
                out,
                "  {:<6} {:<34} {:<8} {:>10}  {}",
                position_badge(record.position),
                record.keyword,
                trend_cell(record),
                group_thousands(record.search_volume),
                display_url(&record.url),
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Average Position  {}", summary.average_position);
    let _ = writeln!(out, "  Top 10 Rankings   {}", summary.top10_count);
    let _ = writeln!(out, "  Total Volume      {}", group_thousands(summary.total_volume));
    out
}

/// AI visibility summary and one card per engine.
pub(crate) fn ai_section(session: &Session) -> String {
    let mut out = String::new();
    let (Some(state), Some(summary)) = (session.current(), session.ai_summary()) else {
        return out;
    };
    let Some(report) = state.ai.ready() else {
        return out;
    };

    let _ = writeln!(out, "AI Search Visibility for {}", state.domain);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Engines Visible   {}/{}",
        summary.visible_count, summary.total_engines
    );
    let _ = writeln!(out, "  Total Citations   {}", summary.total_citations);
    let _ = writeln!(out, "  Avg Confidence    {}%", summary.average_confidence);
    let _ = writeln!(out);

    for record in &report.results {
        let engine = record.engine;
        if !record.found {
            let _ = writeln!(out, "  {} {:<12} Not Found", engine.icon(), engine.name());
            continue;
        }

        let _ = writeln!(
            out,
            "  {} {:<12} Visible    citations {:<3} position #{:<2} confidence {}%",
            engine.icon(),
            engine.name(),
            record.citations,
            record.position,
            record.confidence,
        );
        if state.expansion.is_expanded(engine) {
            let _ = writeln!(out, "      \"{}\"", record.snippet);
            let _ = writeln!(out, "      View source: {}", record.url);
        }
    }
    out
}

fn position_badge(position: u32) -> String {
    let marker = match PositionTier::of(position) {
        PositionTier::Top3 => '★',
        PositionTier::Top10 => '●',
        PositionTier::Beyond => ' ',
    };
    format!("{marker} #{position}")
}

fn trend_cell(record: &KeywordRecord) -> String {
    let arrow = match record.trend {
        Trend::Up => "↑",
        Trend::Down => "↓",
        Trend::Stable => "→",
    };
    format!("{arrow} {}", record.trend.signed_change(record.change))
        .trim_end()
        .to_string()
}

/// `1234567` → `1,234,567`.
pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

pub(crate) fn keywords_json(session: &Session, export: Option<&Path>) -> Value {
    let Some(state) = session.current() else {
        return Value::Null;
    };
    let Some(view) = session.keyword_view() else {
        return Value::Null;
    };
    let total = state.keywords.ready().map_or(0, |r| r.total_keywords);

    json!({
        "domain": state.domain,
        "region": state.region,
        "view": state.view,
        "totalKeywords": total,
        "summary": view.summary(),
        "keywords": view.rows(),
        "exportPath": export.map(|p| p.display().to_string()),
    })
}

pub(crate) fn ai_json(session: &Session) -> Value {
    let Some(state) = session.current() else {
        return Value::Null;
    };
    let Some(report) = state.ai.ready() else {
        return Value::Null;
    };

    json!({
        "domain": state.domain,
        "region": state.region,
        "summary": session.ai_summary(),
        "expansion": state.expansion,
        "results": report.results,
    })
}
