//! Offline formatting of a saved raw result.

use std::path::Path;

use console::style;
use serde_json::Value;

use lexcheck::{prepare, MarkupRenderer, Settings};

use crate::cli::helpers::{
    default_output_path, file_stem, format_output, print_notices, print_summary, write_output,
    OutputFormat, ReportContext,
};

/// Run the result pipeline on a JSON file holding a raw analysis result.
pub async fn cmd_render(
    settings: &Settings,
    result: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(result).await?;
    let raw: Value = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {}", result.display(), e))?;

    let prepared = prepare(&raw);
    print_notices(&prepared.notices);
    if let Some(rows) = prepared.rows() {
        print_summary(rows);
    }

    let name = result
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| result.display().to_string());
    let ctx = ReportContext {
        title: &name,
        document: None,
        analysis: None,
    };
    let renderer = MarkupRenderer::from_settings(settings);
    let text = format_output(&prepared, &raw, format, &renderer, &ctx)?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            settings.ensure_output_dir()?;
            default_output_path(settings, &file_stem(&name), "render", format)
        }
    };
    write_output(&path, &text)?;

    println!(
        "{} Rendered {} to {}",
        style("✓").green(),
        name,
        style(path.display()).cyan()
    );
    Ok(())
}
