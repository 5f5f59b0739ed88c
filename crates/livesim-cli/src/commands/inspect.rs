//! `livesim inspect` command implementation
//!
//! Loads a dataset and shows what a run would upload, without contacting
//! the store.

use crate::error::Result;
use crate::loader;
use colored::Colorize;
use std::path::Path;

/// Load `input` and print its normalized columns
pub async fn run(input: &Path) -> Result<()> {
    let dataset = loader::load(input)?;

    println!(
        "{} {} ({} record(s))",
        "✓".green(),
        dataset.source.display(),
        dataset.len()
    );
    println!();
    println!("{}", "Columns:".cyan().bold());

    for column in &dataset.columns {
        let renamed = if column.original != column.name {
            format!("from '{}'", column.original).dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {:<28} {:<8} {}", column.name, column.kind.to_string(), renamed);
    }

    if dataset.is_empty() {
        println!();
        println!(
            "{} Dataset has no rows; 'livesim run' would exit without replaying.",
            "!".yellow()
        );
    }

    Ok(())
}
