//! CLI argument parsing module for depvet

use clap::{ArgAction, Parser};
use reqwest::Url;
use std::path::PathBuf;

use crate::checker::ErrorCondition;
use crate::registry::DEFAULT_REGISTRY_URL;

/// npm manifest dependency checker
#[derive(Parser, Debug, Clone)]
#[command(name = "depvet", version, about = "npm manifest dependency checker")]
pub struct CliArgs {
    /// Manifest files to check
    #[arg(default_value = "package.json")]
    pub paths: Vec<PathBuf>,

    // Lookup options
    /// Registry base URL
    #[arg(long, default_value = DEFAULT_REGISTRY_URL)]
    pub registry: Url,

    /// Exclude specific packages from the check (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Prefer latest versions over stable ones
    #[arg(long)]
    pub unstable: bool,

    /// Report all dependencies instead of outdated ones only
    #[arg(long)]
    pub verbose: bool,

    // Rewrite options
    /// Rewrite outdated requirements with this operator prefix;
    /// the bare flag pins exact versions
    #[arg(long, num_args = 0..=1, default_missing_value = "=", value_name = "OP")]
    pub update: Option<String>,

    /// Dry run mode - never write rewritten manifests back to disk
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    // Failure conditions
    /// Fail an artifact when at least this many dependencies are reported
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub threshold: usize,

    /// Fail when a package is missing from the registry
    #[arg(long)]
    pub fail_not_found: bool,

    /// Fail when a requirement is not a string value
    #[arg(long)]
    pub fail_dep_type: bool,

    /// Fail when a requirement points at a source-control location
    #[arg(long)]
    pub fail_scm: bool,

    // Output options
    /// Output reports in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable quiet mode - no reports, no spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CliArgs {
    /// The update operator, empty when rewriting is disabled
    pub fn update_operator(&self) -> String {
        self.update.clone().unwrap_or_default()
    }

    /// Returns true when rewritten manifests should be written back
    pub fn writes_back(&self) -> bool {
        self.update.is_some() && !self.dry_run
    }

    /// The failure conditions the checker should enforce
    pub fn error_condition(&self) -> ErrorCondition {
        ErrorCondition {
            not_found: self.fail_not_found,
            dep_type: self.fail_dep_type,
            scm: self.fail_scm,
            outdated_count: self.threshold,
        }
    }
}
