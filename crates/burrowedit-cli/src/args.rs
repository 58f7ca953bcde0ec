//! CLI argument definitions using clap
//!
//! One optional positional argument: the config file to edit. A second
//! positional is rejected by clap itself (usage error, exit 2, nothing
//! touched).

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "burrowedit")]
#[command(about = "Safely edit burrowd configuration with validation, drift warnings and undo")]
#[command(
    long_about = "Safely edit burrowd configuration with validation, drift warnings and undo.

Every edit is re-validated by the daemon binary before it can be
checkpointed; sensitive settings (identity name, secret, port-22
passthrough) are fingerprinted so accidental changes are flagged; the
full edit history lives in a git repository and backs `undo`.

ENVIRONMENT:
  BURROW_EDITOR / VISUAL / EDITOR   editor to invoke        (default: vi)
  BURROW_PAGER / PAGER              pager for diff/print    (default: less)
  BURROW_DIFF                       diff tool               (default: diff -u)
  BURROW_RESTART_DELAY              restart delay, seconds  (default: 10)
  BURROWD_BIN                       daemon binary override  (default: burrowd)"
)]
#[command(version)]
pub struct Cli {
    /// Config file to edit (default: the per-user burrow config)
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_argument_defaults_to_none() {
        let cli = Cli::try_parse_from(["burrowedit"]).unwrap();
        assert!(cli.config.is_none());
    }

    #[test]
    fn single_path_is_accepted() {
        let cli = Cli::try_parse_from(["burrowedit", "/etc/burrow/00-base.conf"]).unwrap();
        assert_eq!(
            cli.config,
            Some(PathBuf::from("/etc/burrow/00-base.conf"))
        );
    }

    #[test]
    fn two_positional_paths_are_a_usage_error() {
        // scenario: directory and file in one invocation
        let err = Cli::try_parse_from(["burrowedit", "/etc/burrow", "burrow.conf"]).unwrap_err();
        assert_ne!(err.exit_code(), 0);
    }
}
