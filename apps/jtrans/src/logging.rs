//! Tracing subscriber setup

use crate::cli::GlobalArgs;
use tracing_subscriber::EnvFilter;

/// Crates whose logs follow the verbosity flags
const CRATES: [&str; 5] = [
    "jtrans",
    "jtrans_actions",
    "jtrans_config",
    "jtrans_rules",
    "jtrans_types",
];

/// Initialize logging on stderr
///
/// `RUST_LOG` wins when set. Otherwise `--quiet` selects warnings only,
/// `--verbose` debug output, and the configured level applies in between.
pub fn init_tracing(global: &GlobalArgs, configured_level: &str) {
    let level = if global.quiet {
        "warn"
    } else if global.verbose {
        "debug"
    } else {
        configured_level
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(global.verbose);

    if global.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn default_directives(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}
