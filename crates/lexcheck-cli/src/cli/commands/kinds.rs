//! Analysis catalog listing.

use console::style;

use lexcheck::ANALYSIS_KINDS;

/// List the analysis kinds and what each one needs.
pub async fn cmd_kinds() -> anyhow::Result<()> {
    println!("\n{}", style("Analysis Kinds").bold());
    println!("{}", "-".repeat(70));
    println!("{:<25} {:<25} Requires", "ID", "Label");
    println!("{}", "-".repeat(70));

    for kind in &ANALYSIS_KINDS {
        let mut needs = Vec::new();
        if kind.requires_collection {
            needs.push("uploaded collection");
        }
        if kind.requires_query {
            needs.push("--query");
        }
        let needs = if needs.is_empty() {
            style("-".to_string()).dim()
        } else {
            style(needs.join(", ")).yellow()
        };
        println!("{:<25} {:<25} {}", kind.id, kind.label, needs);
    }

    Ok(())
}
