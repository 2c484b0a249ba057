//! Exporter: the keyword view as downloadable comma-delimited text.
//!
//! The default [`CsvQuoting::None`] output joins fields with a bare comma
//! and performs no escaping. A keyword or URL containing a comma therefore
//! shifts every following column of that row; [`CsvQuoting::Rfc4180`]
//! avoids this and is byte-identical for rows without special characters.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};

use rankscope_shared::{Domain, KeywordRecord, RankScopeError, Result};

/// Column order of every export.
pub const CSV_HEADER: [&str; 6] = [
    "Keyword",
    "Position",
    "URL",
    "Search Volume",
    "Trend",
    "Change",
];

/// How fields containing delimiters are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvQuoting {
    /// Fields are written verbatim.
    #[default]
    None,
    /// Fields containing `,`, `"`, CR or LF are quoted, inner quotes doubled.
    Rfc4180,
}

/// A rendered export ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    /// Suggested file name: `<domain>-keywords.csv`.
    pub filename: String,
    pub content: String,
}

impl CsvExport {
    /// Write the export into `dir` under its suggested file name.
    ///
    /// Path separators in the name are replaced with `_`, so the file always
    /// lands directly inside `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| RankScopeError::io(dir, e))?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.content).map_err(|e| RankScopeError::io(&path, e))?;
        info!(path = %path.display(), bytes = self.content.len(), "export written");
        Ok(path)
    }

    /// The suggested file name reduced to a single path component.
    pub fn file_name(&self) -> String {
        self.filename
            .chars()
            .map(|c| if std::path::is_separator(c) { '_' } else { c })
            .collect()
    }
}

/// Serialize view rows in their current order, header first.
///
/// Rows are joined with `\n` and there is no trailing newline, so the
/// output always has exactly `rows + 1` lines.
#[instrument(skip_all, fields(%domain, ?quoting))]
pub fn export_csv<'a, I>(rows: I, domain: &Domain, quoting: CsvQuoting) -> CsvExport
where
    I: IntoIterator<Item = &'a KeywordRecord>,
{
    let mut lines = vec![CSV_HEADER.join(",")];

    for record in rows {
        let fields = [
            Cow::Borrowed(record.keyword.as_str()),
            Cow::Owned(record.position.to_string()),
            Cow::Borrowed(record.url.as_str()),
            Cow::Owned(record.search_volume.to_string()),
            Cow::Borrowed(record.trend.as_str()),
            Cow::Owned(record.change.to_string()),
        ];
        let line: Vec<Cow<'_, str>> = fields
            .into_iter()
            .map(|field| quote_field(field, quoting))
            .collect();
        lines.push(line.join(","));
    }

    CsvExport {
        filename: format!("{domain}-keywords.csv"),
        content: lines.join("\n"),
    }
}

fn quote_field(field: Cow<'_, str>, quoting: CsvQuoting) -> Cow<'_, str> {
    match quoting {
        CsvQuoting::None => field,
        CsvQuoting::Rfc4180 => {
            if field.contains([',', '"', '\r', '\n']) {
                Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
            } else {
                field
            }
        }
    }
}
