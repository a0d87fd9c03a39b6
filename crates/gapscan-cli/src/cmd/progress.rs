use crate::cmd::load_roadmap;
use crate::output::print_json;
use crate::root::under_root;
use anyhow::Context;
use gapscan_core::config::EngineConfig;
use gapscan_core::io::atomic_write;
use gapscan_core::progress::{ProgressTracker, RoadmapProgress};
use gapscan_core::types::ItemStatus;
use std::path::Path;

pub fn run(
    root: &Path,
    roadmap_path: &Path,
    complete: &[String],
    previous: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let config = EngineConfig::load(root).context("loading configuration")?;
    let roadmap_path = under_root(root, roadmap_path);
    let mut roadmap = load_roadmap(&roadmap_path)?;

    if !complete.is_empty() {
        for id in complete {
            let mut found = false;
            for item in roadmap.all_items.iter_mut() {
                if &item.id == id {
                    item.status = ItemStatus::Completed;
                    found = true;
                }
            }
            for phase in roadmap.phases.iter_mut() {
                for item in phase.items.iter_mut() {
                    if &item.id == id {
                        item.status = ItemStatus::Completed;
                    }
                }
            }
            if !found {
                anyhow::bail!("no roadmap item with id '{id}'");
            }
        }
        let content = serde_json::to_string_pretty(&roadmap)?;
        atomic_write(&roadmap_path, content.as_bytes())
            .with_context(|| format!("writing {}", roadmap_path.display()))?;
    }

    if let Some(previous) = previous {
        let old = load_roadmap(&under_root(root, previous))?;
        let tracker = ProgressTracker::new(config.velocity.clone());
        let delta = tracker.calculate_delta(&old, &roadmap);
        if json {
            print_json(&delta)?;
        } else {
            print_delta_section("Added", &delta.added);
            print_delta_section("Removed", &delta.removed);
            print_delta_section("Completed", &delta.completed);
            print_delta_section("Regressions", &delta.regressions);
            if !delta.modified.is_empty() {
                println!("Modified:");
                for change in &delta.modified {
                    println!("  {}: {}", change.id, change.changes.join("; "));
                }
            }
            if delta.is_empty() {
                println!("No changes between roadmap versions.");
            }
            println!();
        }
    }

    let tracker = ProgressTracker::new(config.velocity);
    let progress = tracker
        .update_progress(&roadmap, &roadmap_path)
        .context("recording progress snapshot")?;

    if json {
        return print_json(&progress);
    }
    print_progress(&progress);
    Ok(())
}

fn print_delta_section(label: &str, ids: &[String]) {
    if !ids.is_empty() {
        println!("{label}: {}", ids.join(", "));
    }
}

fn print_progress(progress: &RoadmapProgress) {
    println!(
        "Progress: {}/{} items complete ({:.0}%)",
        progress.items_complete, progress.items_total, progress.percent_complete
    );
    if progress.velocity > 0.0 {
        println!("Velocity: {:.1} items/week", progress.velocity);
    } else {
        println!("Velocity: no history yet (effort-based estimate)");
    }
    println!(
        "Estimated completion: {}",
        progress.estimated_completion.format("%Y-%m-%d")
    );
    println!("Snapshots recorded: {}", progress.history.len());
}
