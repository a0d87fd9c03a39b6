use crate::output::{print_json, print_table};
use crate::root::under_root;
use anyhow::Context;
use gapscan_core::analyzer::GapAnalyzer;
use gapscan_core::config::EngineConfig;
use gapscan_core::gap::DesirableFeature;
use gapscan_core::io::atomic_write;
use gapscan_core::roadmap::{PhasingStrategy, Roadmap, RoadmapGenerator};
use gapscan_core::scoring::ScoringEngine;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run(
    root: &Path,
    specs: &Path,
    docs: &Path,
    code: &Path,
    features_file: Option<&Path>,
    strategy: Option<&str>,
    output: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = EngineConfig::load(root).context("loading configuration")?;
    if let Some(raw) = strategy {
        config.roadmap.strategy = raw
            .parse::<PhasingStrategy>()
            .context("invalid --strategy")?;
    }
    if config.project.name.is_empty() {
        config.project.name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string();
    }

    let analyzer = GapAnalyzer::new(config.analyzer.clone());
    let report = analyzer
        .analyze(
            &under_root(root, specs),
            &under_root(root, docs),
            &under_root(root, code),
        )
        .context("gap analysis failed")?;

    let features = match features_file {
        Some(path) => load_features(&under_root(root, path))?,
        None => Vec::new(),
    };

    let generator = RoadmapGenerator::new(
        config.roadmap.clone(),
        ScoringEngine::new(config.scoring.clone()),
    );
    let roadmap =
        generator.generate_roadmap(&report.spec_gaps, &report.feature_gaps, &features, &config.project);

    let output_path = under_root(root, output);
    let content = serde_json::to_string_pretty(&roadmap)?;
    atomic_write(&output_path, content.as_bytes())
        .with_context(|| format!("writing {}", output_path.display()))?;

    if json {
        return print_json(&roadmap);
    }
    print_summary(&roadmap, &output_path);
    Ok(())
}

fn load_features(path: &Path) -> anyhow::Result<Vec<DesirableFeature>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading features file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing features file {}", path.display()))
}

fn print_summary(roadmap: &Roadmap, output_path: &Path) {
    println!(
        "Roadmap for '{}': {} items in {} phases ({} strategy)",
        roadmap.metadata.project,
        roadmap.all_items.len(),
        roadmap.phases.len(),
        roadmap.metadata.strategy
    );
    for warning in &roadmap.metadata.warnings {
        println!("warning: {warning}");
    }
    println!();

    let rows: Vec<Vec<String>> = roadmap
        .all_items
        .iter()
        .map(|i| {
            vec![
                i.priority.to_string(),
                i.phase.to_string(),
                i.title.clone(),
                format!("{}h", i.effort.hours),
            ]
        })
        .collect();
    print_table(&["Priority", "Phase", "Title", "Effort"], rows);

    println!();
    println!("Saved to {}", output_path.display());
}
