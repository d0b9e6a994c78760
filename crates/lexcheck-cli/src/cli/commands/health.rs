//! Backend health probe.

use console::style;

use lexcheck::{ApiClient, Settings};

/// Check that the backend answers `GET /health`.
pub async fn cmd_health(settings: &Settings) -> anyhow::Result<()> {
    let client = ApiClient::from_settings(settings)?;

    match client.health().await {
        Ok(status) => {
            println!(
                "{} Backend at {} is {}",
                style("✓").green(),
                client.base_url(),
                style(status).bold()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", style("✗").red(), e);
            anyhow::bail!("health check failed for {}", client.base_url())
        }
    }
}
