//! Shared helper functions for CLI commands.

use std::path::{Path, PathBuf};

use console::style;
use serde_json::Value;

use lexcheck::results::{rows_to_csv, rows_to_json, ExtractionSummary};
use lexcheck::{FormatError, MarkupRenderer, PreparedResult, ReportPage, Settings, TabularRow};

/// Output format for analysis results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Standalone HTML report
    #[default]
    Html,
    /// Markup as produced by the formatter
    Markdown,
    /// Extracted rows, or the raw result for narrative analyses
    Json,
    /// Extracted rows (extraction results only)
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// What the report is about.
pub struct ReportContext<'a> {
    pub title: &'a str,
    pub document: Option<(&'a str, u64)>,
    pub analysis: Option<&'a str>,
}

/// Produce the output text for a prepared result.
pub fn format_output(
    prepared: &PreparedResult,
    raw: &Value,
    format: OutputFormat,
    renderer: &MarkupRenderer,
    ctx: &ReportContext<'_>,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Html => {
            let page = report_page(ctx).notices(&prepared.notices);
            let html = match prepared.rows() {
                Some(rows) => page.rows(rows).render(),
                None => {
                    let body = renderer.render(&prepared.markup);
                    page.body(&body).render()
                }
            };
            Ok(html)
        }
        OutputFormat::Markdown => Ok(prepared.markup.clone()),
        OutputFormat::Json => match prepared.rows() {
            Some(rows) => Ok(rows_to_json(rows)?),
            None => Ok(serde_json::to_string_pretty(raw)?),
        },
        OutputFormat::Csv => match prepared.rows() {
            Some(rows) => Ok(rows_to_csv(rows)),
            None => anyhow::bail!("CSV export is only available for extraction results"),
        },
    }
}

fn report_page<'a>(ctx: &ReportContext<'a>) -> ReportPage<'a> {
    let mut page = ReportPage::new(ctx.title);
    if let Some((name, size)) = ctx.document {
        page = page.document(name, size);
    }
    if let Some(label) = ctx.analysis {
        page = page.analysis(label);
    }
    page
}

/// HTML report for an analysis that did not produce a result.
pub fn error_report(ctx: &ReportContext<'_>, message: &str) -> String {
    report_page(ctx).error(message).render()
}

/// `<output_dir>/<stem>-<kind>-<timestamp>.<ext>`
pub fn default_output_path(
    settings: &Settings,
    stem: &str,
    kind: &str,
    format: OutputFormat,
) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    settings.output_dir.join(format!(
        "{}-{}-{}.{}",
        sanitize_stem(stem),
        kind,
        timestamp,
        format.extension()
    ))
}

fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "result".to_string()
    } else {
        cleaned
    }
}

/// Filename without its extension.
pub fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Write output, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Print format notices as a partial-results warning.
pub fn print_notices(notices: &[FormatError]) {
    if notices.is_empty() {
        return;
    }
    println!(
        "{} Partial results: {} part(s) could not be displayed",
        style("!").yellow(),
        notices.len()
    );
    for notice in notices {
        println!("    {}", style(notice).dim());
    }
}

/// Print extraction statistics.
pub fn print_summary(rows: &[TabularRow]) {
    let summary = ExtractionSummary::from_rows(rows);
    println!("\n{}", style("Extraction Summary").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "Total terms:", summary.total_terms);
    println!("{:<20} {}", "Terms found:", summary.terms_found);
    println!("{:<20} {}", "Sections found:", summary.sections_found);
    println!("{:<20} {}", "Completion rate:", summary.completion_rate);
}
