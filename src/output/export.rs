use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use super::formatter::format_score;
use crate::config::Config;
use crate::rating::{SetCollection, SetTitles};

/// Column headers shared by every export.
pub const EXPORT_HEADER: [&str; 3] = ["セット名", "ワイン名", "点数"];

const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimitedFormat {
    /// Comma separated, every field quoted (file download)
    Csv,
    /// Tab separated, no quoting (clipboard)
    Tsv,
}

/// Render every item of every set, in set-then-item order, below a header row.
/// Rows are joined with `\n` without a trailing newline.
pub fn to_delimited_text(
    collection: &SetCollection,
    titles: &SetTitles,
    format: DelimitedFormat,
) -> csv::Result<String> {
    let mut builder = csv::WriterBuilder::new();
    builder.terminator(csv::Terminator::Any(b'\n'));
    match format {
        DelimitedFormat::Csv => builder.delimiter(b',').quote_style(csv::QuoteStyle::Always),
        DelimitedFormat::Tsv => builder.delimiter(b'\t').quote_style(csv::QuoteStyle::Never),
    };

    let mut writer = builder.from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for set in collection.iter() {
        let title = titles.get(set.set_id());
        for item in set.items() {
            let score = format_score(item.score);
            writer.write_record([title, item.name.as_str(), score.as_str()])?;
        }
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_end_matches('\n').to_string())
}

/// `wine_ratings_<YYYYMMDDHHMMSS>.csv`
pub fn export_filename(now: DateTime<Local>) -> String {
    format!("wine_ratings_{}.csv", now.format("%Y%m%d%H%M%S"))
}

/// Where a CSV export goes when no explicit path is given.
pub fn default_export_path(config: &Config, now: DateTime<Local>) -> PathBuf {
    let dir = config
        .export_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(export_filename(now))
}

/// Write a CSV export as UTF-8 with a byte-order mark.
pub fn write_csv_file(
    path: &Path,
    collection: &SetCollection,
    titles: &SetTitles,
) -> Result<()> {
    let text = to_delimited_text(collection, titles, DelimitedFormat::Csv)
        .context("Failed to render CSV")?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    fs::write(path, format!("{}{}", UTF8_BOM, text))
        .with_context(|| format!("Failed to write CSV export to {}", path.display()))?;
    tracing::info!(path = %path.display(), "Exported CSV");
    Ok(())
}
