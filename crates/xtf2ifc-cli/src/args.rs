use clap::Parser;
use std::path::PathBuf;

/// Converts INTERLIS wastewater surveys (.xtf) into IFC models.
#[derive(Parser, Debug, Clone)]
#[command(name = "xtf2ifc", version, about, long_about = None)]
pub struct Args {
    /// .xtf files, or directories scanned (non-recursively) for .xtf files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write .ifc files here instead of next to each input
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Color elements by data completeness
    #[arg(long)]
    pub highlight_incomplete: bool,

    /// Write the batch summary as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
