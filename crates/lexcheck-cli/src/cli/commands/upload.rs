//! Document upload command.

use std::path::Path;
use std::sync::Arc;

use console::style;

use lexcheck::utils::format_size;
use lexcheck::{ApiClient, SelectedFile, Settings, UploadController};

use crate::cli::progress::upload_bar;

/// Upload a document and report what the backend extracted.
pub async fn cmd_upload(
    settings: &Settings,
    path: &Path,
    show_content: bool,
) -> anyhow::Result<()> {
    let file = SelectedFile::from_path(path).await?;
    println!(
        "Selected: {} ({})",
        style(file.name()).cyan(),
        format_size(file.size_bytes())
    );

    let client = Arc::new(ApiClient::from_settings(settings)?);
    let mut controller = UploadController::new(client, settings.upload_limits());

    let bar = upload_bar(file.name());
    let result = controller
        .upload_with_retries(file, settings.upload_retries, |percent| {
            bar.set_position(u64::from(percent))
        })
        .await;
    bar.finish_and_clear();

    let document = match result {
        Ok(document) => document,
        Err(e) => {
            println!("{} {}", style("✗").red(), e);
            anyhow::bail!("upload failed");
        }
    };

    println!(
        "{} Document processed successfully (collection: {}, {} characters)",
        style("✓").green(),
        style(&document.collection_id).bold(),
        document.content.chars().count()
    );

    if show_content {
        println!("\n{}", style("Extracted content").bold());
        println!("{}", "-".repeat(60));
        println!("{}", document.content);
    }

    Ok(())
}
