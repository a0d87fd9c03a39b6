use crate::output::{print_json, print_table};
use crate::root::under_root;
use anyhow::Context;
use gapscan_core::analyzer::{AnalysisReport, GapAnalyzer};
use gapscan_core::config::EngineConfig;
use std::path::Path;

pub fn run(root: &Path, specs: &Path, docs: &Path, code: &Path, json: bool) -> anyhow::Result<()> {
    let config = EngineConfig::load(root).context("loading configuration")?;
    let analyzer = GapAnalyzer::new(config.analyzer);

    let report = analyzer
        .analyze(
            &under_root(root, specs),
            &under_root(root, docs),
            &under_root(root, code),
        )
        .context("gap analysis failed")?;

    if json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let c = &report.completeness;
    println!(
        "Completeness: {}/{} requirements implemented ({} partial, {} missing), confidence {}%",
        c.implemented, c.total_requirements, c.partial, c.missing, c.confidence
    );
    println!("Documentation accuracy: {}%", report.overall_accuracy);
    println!();

    if report.spec_gaps.is_empty() {
        println!("No spec gaps detected.");
    } else {
        println!("Spec gaps ({}):", report.spec_gaps.len());
        let rows: Vec<Vec<String>> = report
            .spec_gaps
            .iter()
            .map(|g| {
                vec![
                    g.status.to_string(),
                    g.confidence_score.to_string(),
                    g.requirement.clone(),
                    g.source.clone(),
                ]
            })
            .collect();
        print_table(&["Status", "Confidence", "Requirement", "Source"], rows);
    }
    println!();

    if report.feature_gaps.is_empty() {
        println!("No inaccurate documentation claims detected.");
    } else {
        println!("Documentation gaps ({}):", report.feature_gaps.len());
        let rows: Vec<Vec<String>> = report
            .feature_gaps
            .iter()
            .map(|g| {
                vec![
                    g.verdict.to_string(),
                    g.accuracy_score.to_string(),
                    g.recommendation.to_string(),
                    g.claim.text.clone(),
                ]
            })
            .collect();
        print_table(&["Verdict", "Accuracy", "Recommendation", "Claim"], rows);
    }

    if !report.errors.is_empty() {
        println!();
        println!("Skipped ({}):", report.errors.len());
        for error in &report.errors {
            println!("  - {error}");
        }
    }
}
