//! specforge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Validation failure
//! - 4: Missing input

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forge_policy::PolicyError;
use forge_spec::SpecError;

mod commands;

use commands::{Cli, CommandContext, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const MISSING_INPUT: u8 = 4;
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match CommandContext::from_cli(&cli) {
        Ok(ctx) => match cli.command {
            Commands::Assemble(args) => commands::assemble::execute(args, ctx).await,
            Commands::Audit(args) => commands::audit::execute(args, ctx).await,
            Commands::FragmentHealth(args) => commands::fragment_health::execute(args, ctx).await,
            Commands::Enforce(args) => commands::enforce::execute(args, ctx).await,
            Commands::VersionConsistencyCheck(args) => {
                commands::version_check::execute(args, ctx).await
            }
            Commands::ModuleTopologyReport(args) => {
                commands::module_topology::execute(args, ctx).await
            }
            Commands::FullHealth(args) => commands::full_health::execute(args, ctx).await,
            Commands::Clean(args) => commands::clean::execute(args, ctx).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "forge_cli={lvl},forge_spec={lvl},forge_policy={lvl},warn",
            lvl = default_level
        ))
    });

    // A second init (e.g. under a test harness) is harmless.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Map an error to its exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(policy) = e.downcast_ref::<PolicyError>() {
        return match policy {
            PolicyError::EnforcementViolation(_) | PolicyError::VersionDrift(_) => {
                ExitCodes::VALIDATION_FAILURE
            }
            PolicyError::Spec(spec) => spec_exit_code(spec),
            PolicyError::InvalidConfiguration(_) | PolicyError::Toml(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }
    if let Some(spec) = e.downcast_ref::<SpecError>() {
        return spec_exit_code(spec);
    }
    ExitCodes::GENERAL_ERROR
}

fn spec_exit_code(e: &SpecError) -> u8 {
    match e {
        SpecError::MissingFragmentsDirectory(_) | SpecError::MissingCoreSchema(_) => {
            ExitCodes::MISSING_INPUT
        }
        SpecError::InvalidPattern(_) => ExitCodes::INVALID_ARGS,
        SpecError::Io(_) => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_violations_map_to_validation_failure() {
        let e = anyhow::Error::new(PolicyError::EnforcementViolation(Vec::new()));
        assert_eq!(categorize_error(&e), ExitCodes::VALIDATION_FAILURE);

        let e = anyhow::Error::new(PolicyError::VersionDrift(Vec::new()));
        assert_eq!(categorize_error(&e), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_missing_inputs_survive_context() {
        let result: Result<(), SpecError> =
            Err(SpecError::MissingCoreSchema(PathBuf::from("api/core-schema.yml")));
        let e = result.context("Failed to assemble").unwrap_err();
        assert_eq!(categorize_error(&e), ExitCodes::MISSING_INPUT);

        let e = anyhow::Error::new(PolicyError::Spec(SpecError::MissingFragmentsDirectory(
            PathBuf::from("api/fragments"),
        )));
        assert_eq!(categorize_error(&e), ExitCodes::MISSING_INPUT);
    }

    #[test]
    fn test_bad_configuration_is_invalid_args() {
        let e = anyhow::Error::new(PolicyError::InvalidConfiguration("x".into()))
            .context("Failed to load configuration");
        assert_eq!(categorize_error(&e), ExitCodes::INVALID_ARGS);
        assert_eq!(categorize_error(&anyhow::anyhow!("boom")), ExitCodes::GENERAL_ERROR);
    }

    #[test]
    fn test_cli_parses_operations() {
        let cli = Cli::try_parse_from(["specforge", "--json", "enforce", "--min-coverage", "90"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Enforce(ref args) if args.min_coverage == Some(90.0)));

        let cli = Cli::try_parse_from(["specforge", "version-consistency-check", "--doc", "README.md"]).unwrap();
        assert!(matches!(cli.command, Commands::VersionConsistencyCheck(ref args) if args.docs == vec!["README.md"]));
    }
}
