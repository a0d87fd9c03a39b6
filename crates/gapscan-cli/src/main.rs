mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gapscan",
    about = "Gap analysis and strategic roadmap engine — verify docs and specs against code, then plan the work",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from gapscan.yaml or .git/)
    #[arg(long, global = true, env = "GAPSCAN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze spec requirements and documentation claims against the code
    Analyze {
        /// Specification directory, relative to the root
        #[arg(long, default_value = "specs")]
        specs: PathBuf,

        /// Documentation root (README.md, ROADMAP.md, docs/)
        #[arg(long, default_value = ".")]
        docs: PathBuf,

        /// Codebase root to verify against
        #[arg(long, default_value = ".")]
        code: PathBuf,
    },

    /// Generate a phased roadmap from detected gaps
    Roadmap {
        #[arg(long, default_value = "specs")]
        specs: PathBuf,

        #[arg(long, default_value = ".")]
        docs: PathBuf,

        #[arg(long, default_value = ".")]
        code: PathBuf,

        /// JSON file of additional candidate features to schedule
        #[arg(long)]
        features: Option<PathBuf>,

        /// Phasing strategy: priority, dependency, or timeline
        #[arg(long)]
        strategy: Option<String>,

        /// Where to write the roadmap JSON
        #[arg(long, short = 'o', default_value = "roadmap.json")]
        output: PathBuf,
    },

    /// Record and show progress against a saved roadmap
    Progress {
        /// Roadmap JSON produced by `gapscan roadmap`
        #[arg(default_value = "roadmap.json")]
        roadmap: PathBuf,

        /// Mark these item ids completed before recording the snapshot
        #[arg(long = "complete")]
        complete: Vec<String>,

        /// Older roadmap JSON to diff against
        #[arg(long)]
        previous: Option<PathBuf>,
    },

    /// Export a saved roadmap (markdown, csv, json, github)
    Export {
        #[arg(default_value = "roadmap.json")]
        roadmap: PathBuf,

        #[arg(long, short = 'f', default_value = "markdown")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Analyze { specs, docs, code } => {
            cmd::analyze::run(&root, &specs, &docs, &code, cli.json)
        }
        Commands::Roadmap {
            specs,
            docs,
            code,
            features,
            strategy,
            output,
        } => cmd::roadmap::run(
            &root,
            &specs,
            &docs,
            &code,
            features.as_deref(),
            strategy.as_deref(),
            &output,
            cli.json,
        ),
        Commands::Progress {
            roadmap,
            complete,
            previous,
        } => cmd::progress::run(&root, &roadmap, &complete, previous.as_deref(), cli.json),
        Commands::Export {
            roadmap,
            format,
            output,
        } => cmd::export::run(&root, &roadmap, &format, output.as_deref()),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
