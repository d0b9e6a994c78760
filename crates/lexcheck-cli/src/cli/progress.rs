//! Progress display for uploads and analysis requests.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Percentage bar for a single upload.
pub fn upload_bar(file_name: &str) -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}%")
    {
        bar.set_style(style.progress_chars("█▓░"));
    }
    bar.set_message(format!("Uploading {}", file_name));
    bar
}

/// Spinner shown while the backend works on an analysis.
pub fn analysis_spinner(label: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} ({elapsed})")
    {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Analyzing document: {}", label));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
