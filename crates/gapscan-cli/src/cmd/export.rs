use crate::cmd::load_roadmap;
use crate::root::under_root;
use anyhow::Context;
use gapscan_core::export::{export, ExportFormat};
use gapscan_core::io::atomic_write;
use std::path::Path;

pub fn run(
    root: &Path,
    roadmap_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let roadmap = load_roadmap(&under_root(root, roadmap_path))?;
    let format = format.parse::<ExportFormat>().context("invalid --format")?;
    let rendered = export(&roadmap, format)?;

    match output {
        Some(path) => {
            let path = under_root(root, path);
            atomic_write(&path, rendered.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {} to {}", format, path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
