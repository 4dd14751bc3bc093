//! Cache command - inspect and maintain the local cache

use crate::cache::{format_bytes, CacheEntry, CacheLayout, Category, Integrity};
use crate::cli::args::{CacheAction, CacheArgs, CategoryArg, OutputFormat};
use crate::config::Config;
use crate::error::{FlangeError, FlangeResult};
use crate::ui::{self, UiContext};
use console::style;
use std::path::Path;
use std::time::Duration;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, cache_root: &Path) -> FlangeResult<()> {
    let layout = CacheLayout::new(cache_root);

    match args.action {
        CacheAction::Path => {
            println!("{}", layout.root().display());
            Ok(())
        }
        CacheAction::List { format, category } => list_entries(&layout, format, category),
        CacheAction::Verify { category } => verify_entries(&layout, category),
        CacheAction::Gc {
            older_than_mins,
            dry_run,
        } => gc_partials(&layout, config, older_than_mins, dry_run),
        CacheAction::Clear { category, yes } => clear_entries(&layout, category, yes).await,
    }
}

/// List cached artifacts
fn list_entries(
    layout: &CacheLayout,
    format: OutputFormat,
    category: Option<CategoryArg>,
) -> FlangeResult<()> {
    let entries = layout.entries(category.map(Category::from))?;

    match format {
        OutputFormat::Table => print_entry_table(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.path.display());
            }
        }
    }

    Ok(())
}

fn print_entry_table(entries: &[CacheEntry]) {
    if entries.is_empty() {
        println!("No cached artifacts found.");
        return;
    }

    println!(
        "{:<10} {:<32} {:>10} {:<20}",
        "CATEGORY", "NAME", "SIZE", "MODIFIED"
    );
    println!("{}", "-".repeat(75));

    let mut total = 0;
    for entry in entries {
        total += entry.size_bytes;
        println!(
            "{:<10} {:<32} {:>10} {:<20}",
            entry.category,
            entry.name,
            format_bytes(entry.size_bytes),
            entry.modified.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!(
        "Total: {} artifact(s), {}",
        entries.len(),
        format_bytes(total)
    );
}

/// Check cached artifacts against their recorded digests
fn verify_entries(layout: &CacheLayout, category: Option<CategoryArg>) -> FlangeResult<()> {
    let ctx = UiContext::detect();
    let results = layout.verify_entries(category.map(Category::from))?;

    if results.is_empty() {
        println!("No cached artifacts found.");
        return Ok(());
    }

    let mut corrupted = 0;
    for (entry, status) in &results {
        let label = format!("{}/{}", entry.category, entry.name);
        match status {
            Integrity::Intact => ui::step_ok(&ctx, &label),
            Integrity::Unrecorded => {
                ui::step_warn_hint(&ctx, &label, "no digest recorded")
            }
            Integrity::Corrupted { expected, actual } => {
                corrupted += 1;
                ui::step_error(
                    &ctx,
                    &format!("{} (expected {}, found {})", label, expected, actual),
                );
            }
        }
    }

    if corrupted > 0 {
        return Err(FlangeError::CacheCorrupted { count: corrupted });
    }

    Ok(())
}

/// Remove abandoned partial downloads
fn gc_partials(
    layout: &CacheLayout,
    config: &Config,
    older_than_mins: Option<u64>,
    dry_run: bool,
) -> FlangeResult<()> {
    let minutes = older_than_mins.unwrap_or(config.cache.partial_max_age_mins);
    let report = layout.collect_partials(Duration::from_secs(minutes.saturating_mul(60)), dry_run)?;

    if report.removed.is_empty() {
        println!("No partial downloads older than {} minutes.", minutes);
        return Ok(());
    }

    let verb = if dry_run { "Would remove" } else { "Removed" };
    for path in &report.removed {
        println!("  {} {}", style(verb).dim(), path.display());
    }
    println!();
    println!(
        "{} {} partial file(s), {}",
        verb,
        report.removed.len(),
        format_bytes(report.reclaimed_bytes)
    );

    Ok(())
}

/// Delete cached artifacts after confirmation
async fn clear_entries(
    layout: &CacheLayout,
    category: Option<CategoryArg>,
    yes: bool,
) -> FlangeResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let category = category.map(Category::from);

    let scope = match category {
        Some(c) => format!("all {} artifacts", c),
        None => "all cached artifacts".to_string(),
    };

    if !ui::confirm(&ctx, &format!("Delete {}?", scope), false).await? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = layout.clear(category)?;
    ui::step_ok(&ctx, &format!("Removed {} artifact(s)", removed));
    Ok(())
}
