//! Upload, analyze and write the result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use tracing::info;

use lexcheck::analysis::{can_submit, SubmitStatus};
use lexcheck::utils::format_size;
use lexcheck::{
    prepare, AnalysisForm, AnalysisSession, ApiClient, MarkupRenderer, SelectedFile,
    Settings, UploadController, ANALYSIS_KINDS,
};

use crate::cli::helpers::{
    default_output_path, error_report, file_stem, format_output, print_notices, print_summary,
    write_output, OutputFormat, ReportContext,
};
use crate::cli::progress::{analysis_spinner, upload_bar};

/// Run one analysis end to end.
pub async fn cmd_analyze(
    settings: &Settings,
    path: &Path,
    kind_id: &str,
    query: Option<&str>,
    format: OutputFormat,
    output: Option<&Path>,
    retries: u32,
) -> anyhow::Result<()> {
    let mut form = AnalysisForm::new();
    if !form.select_kind(kind_id) {
        let ids: Vec<_> = ANALYSIS_KINDS.iter().map(|k| k.id).collect();
        anyhow::bail!(
            "Unknown analysis kind '{}'. Available: {}",
            kind_id,
            ids.join(", ")
        );
    }
    if let Some(query) = query {
        form.set_query(query);
    }

    // Fail before uploading when the inputs can never satisfy the kind.
    let kind = form.kind();
    if !can_submit(kind, true, true, form.query()) {
        println!(
            "{} {} (--query is required for {})",
            style("✗").red(),
            SubmitStatus::MissingFields,
            kind.label
        );
        anyhow::bail!("missing required fields");
    }

    let file = SelectedFile::from_path(path).await?;
    println!(
        "Selected: {} ({})",
        style(file.name()).cyan(),
        format_size(file.size_bytes())
    );
    let file_name = file.name().to_string();
    let file_size = file.size_bytes();

    let client = Arc::new(ApiClient::from_settings(settings)?);
    let mut controller = UploadController::new(Arc::clone(&client), settings.upload_limits());

    let bar = upload_bar(&file_name);
    let uploaded = controller
        .upload_with_retries(file, retries, |percent| bar.set_position(u64::from(percent)))
        .await;
    bar.finish_and_clear();

    let document = match uploaded {
        Ok(document) => document,
        Err(e) => {
            println!("{} {}", style("✗").red(), e);
            anyhow::bail!("upload failed");
        }
    };
    println!(
        "{} Document processed successfully (collection: {})",
        style("✓").green(),
        style(&document.collection_id).bold()
    );

    let content = Some(document.content.as_str());
    let collection = Some(document.collection_id.as_str());
    let status = form.submit_status(content, collection);
    let Some(request) = form.request(content, collection) else {
        println!("{} {}", style("✗").red(), status);
        anyhow::bail!("analysis cannot be started");
    };

    let session = AnalysisSession::new(client);
    let spinner = analysis_spinner(kind.label);
    let analyzed = session.submit(&request).await;
    spinner.finish_and_clear();

    let ctx = ReportContext {
        title: &file_name,
        document: Some((&file_name, file_size)),
        analysis: Some(kind.label),
    };
    let output_path = || -> anyhow::Result<PathBuf> {
        match output {
            Some(path) => Ok(path.to_path_buf()),
            None => {
                settings.ensure_output_dir()?;
                Ok(default_output_path(settings, &file_stem(&file_name), kind.id, format))
            }
        }
    };

    let raw = match analyzed {
        Ok(raw) => raw,
        Err(e) => {
            println!("{} {}", style("✗").red(), e);
            let message = e.to_string();
            form.set_error(e);
            if format == OutputFormat::Html {
                let path = output_path()?;
                write_output(&path, &error_report(&ctx, &message))?;
                println!("  Error report written to {}", style(path.display()).cyan());
            }
            anyhow::bail!("{} failed", kind.label);
        }
    };
    info!("Analysis complete: {}", kind.id);

    let prepared = prepare(&raw);
    print_notices(&prepared.notices);
    if let Some(rows) = prepared.rows() {
        print_summary(rows);
    }

    let renderer = MarkupRenderer::from_settings(settings);
    let text = format_output(&prepared, &raw, format, &renderer, &ctx)?;

    let path = output_path()?;
    write_output(&path, &text)?;

    println!(
        "{} {} written to {}",
        style("✓").green(),
        kind.label,
        style(path.display()).cyan()
    );

    Ok(())
}
