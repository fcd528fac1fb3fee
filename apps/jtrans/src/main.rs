//! jtrans - rewrite package references in class files, manifests and archives
//!
//! This is the command line front end: it loads configuration and rule
//! files, names the output, runs the transform and renders the change report.

mod cli;
mod display;
mod error;
mod logging;
mod output;

use crate::cli::Cli;
use crate::display::OutputRenderer;
use crate::error::{exit_code, CliError};
use clap::Parser;
use jtrans_actions::{Composite, Rules};
use jtrans_config::{Config, RuleMaps};
use jtrans_errors::DispatchError;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() {
                exit_code::ARGUMENTS
            } else {
                exit_code::SUCCESS
            });
        }
    };
    let json_mode = cli.global.json;

    // Configuration is loaded before logging so its level can apply.
    let config = load_config(&cli).await;
    let level = config
        .as_ref()
        .map_or_else(|_| "info".to_string(), |c| c.logging.level.clone());
    logging::init_tracing(&cli.global, &level);

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!(code = ?e.code(), exit_code = e.exit_code(), "{}", e);
        if json_mode {
            println!(
                "{}",
                serde_json::json!({ "error": e.to_string(), "code": e.code() })
            );
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(e.exit_code());
    }
}

/// Load configuration with proper precedence: file (or defaults), then
/// environment, then CLI flags
async fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(&cli.global.config).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, cli);
    Ok(config)
}

/// Main application logic
async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    let renderer = OutputRenderer::new(cli.global.json);

    if cli.list_actions {
        renderer.render_actions()?;
        return Ok(());
    }

    let input = cli
        .input
        .ok_or_else(|| CliError::InvalidArguments("an input file or directory is required".into()))?;
    info!(input = %input.display(), "starting jtrans v{}", env!("CARGO_PKG_VERSION"));

    if !input.exists() {
        return Err(jtrans_errors::Error::from(DispatchError::InputMissing {
            path: input.display().to_string(),
        })
        .into());
    }

    let mut maps = RuleMaps::load(&config.rule_files()).await?;
    maps.add_selection_lists(cli.rules.include.as_deref(), cli.rules.exclude.as_deref());
    let selection = maps.selection_rule();
    let signature = maps.signature_rule(config.rules.invert)?;

    if cli.global.verbose {
        renderer.render_rules(&selection, &signature);
    }

    let output = if cli.dry_run {
        None
    } else {
        Some(output::resolve(
            &input,
            cli.output.as_deref(),
            config.output.overwrite,
        )?)
    };

    let composite = Composite::new(Rules::new(selection, signature));
    let forced = cli.action_type;
    let report = tokio::task::spawn_blocking(move || {
        composite.transform(&input, output.as_deref(), forced)
    })
    .await
    .map_err(|e| jtrans_errors::Error::internal(format!("transform task failed: {e}")))??;

    renderer.render_report(&report)?;
    Ok(())
}

/// Apply CLI flags over file and environment configuration
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    let rules = &cli.rules;
    for (flag, slot) in [
        (&rules.selection, &mut config.rules.selections),
        (&rules.renames, &mut config.rules.renames),
        (&rules.versions, &mut config.rules.versions),
        (&rules.bundles, &mut config.rules.bundles),
        (&rules.direct, &mut config.rules.direct),
    ] {
        if let Some(path) = flag {
            *slot = Some(path.clone());
        }
    }

    if rules.invert {
        config.rules.invert = true;
    }
    if cli.overwrite {
        config.output.overwrite = true;
    }
}
