pub mod analyze;
pub mod export;
pub mod progress;
pub mod roadmap;

use anyhow::Context;
use gapscan_core::roadmap::Roadmap;
use std::path::Path;

/// Load a roadmap saved by `gapscan roadmap`.
pub fn load_roadmap(path: &Path) -> anyhow::Result<Roadmap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading roadmap file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing roadmap file {}", path.display()))
}
