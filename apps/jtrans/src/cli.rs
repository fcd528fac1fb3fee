//! Command line interface definition

use clap::{Args, Parser};
use jtrans_types::ActionType;
use std::path::PathBuf;

/// jtrans - rewrite package references in class files, manifests and archives
#[derive(Parser, Debug)]
#[command(name = "jtrans")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rewrite package references in class files, manifests and archives")]
#[command(long_about = None)]
pub struct Cli {
    /// Input file or directory
    #[arg(required_unless_present = "list_actions")]
    pub input: Option<PathBuf>,

    /// Output file or directory (default: output_<input name> beside the input)
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Force the type of the input instead of detecting it
    #[arg(short = 't', long = "type", value_enum, value_name = "TYPE")]
    pub action_type: Option<ActionType>,

    /// Replace an existing output
    #[arg(short, long)]
    pub overwrite: bool,

    /// Report changes without writing any output
    #[arg(short, long)]
    pub dry_run: bool,

    /// List the supported input types and exit
    #[arg(long)]
    pub list_actions: bool,
}

/// Output and logging arguments
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug output and print the effective rules
    #[arg(short, long)]
    pub verbose: bool,

    /// Output the report and log lines as JSON
    #[arg(long)]
    pub json: bool,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Rule file locations and inline selections
#[derive(Args, Debug)]
pub struct RuleArgs {
    /// Selection rules file
    #[arg(long, alias = "ts", value_name = "PATH")]
    pub selection: Option<PathBuf>,

    /// Package rename rules file
    #[arg(long, alias = "tr", value_name = "PATH")]
    pub renames: Option<PathBuf>,

    /// Package version rules file
    #[arg(long, alias = "tv", value_name = "PATH")]
    pub versions: Option<PathBuf>,

    /// Bundle identity rules file
    #[arg(long, alias = "tb", value_name = "PATH")]
    pub bundles: Option<PathBuf>,

    /// Direct string rules file
    #[arg(long, alias = "td", value_name = "PATH")]
    pub direct: Option<PathBuf>,

    /// Comma separated resource patterns to include
    #[arg(long, value_name = "PATTERNS")]
    pub include: Option<String>,

    /// Comma separated resource patterns to exclude
    #[arg(long, value_name = "PATTERNS")]
    pub exclude: Option<String>,

    /// Apply the package renames in reverse
    #[arg(short, long)]
    pub invert: bool,
}
