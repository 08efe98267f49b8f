//! Command-Line Interface

use crate::synthesis::selector_policy::SelectorResolutionPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flow Compiler - Turn recorded browser flows into Playwright test scripts
#[derive(Parser, Debug)]
#[command(name = "flowc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a recorded flow (JSON or YAML) into a test script
    Compile {
        /// Input flow file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the generated script
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Selector resolution policy (first-only, try-in-order, first-win)
        #[arg(short, long)]
        policy: Option<SelectorResolutionPolicy>,

        /// Per-candidate timeout for try-in-order (ms)
        #[arg(long)]
        per_attempt_ms: Option<u64>,

        /// Print the script instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Validate a generated script
    Validate {
        /// Path to the script
        script: PathBuf,
    },

    /// List generated scripts
    List,

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "output.extension", "tab_switch.mode")
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the default output directory for generated scripts
    pub fn output_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".flow_compiler").join("generated"))
            .unwrap_or_else(|| PathBuf::from("generated"))
    }
}

/// Combine a `--policy` choice with `--per-attempt-ms`.
///
/// A timeout given without a policy selects try-in-order; a timeout given
/// with any other policy is ignored. A zero timeout is rejected.
pub fn resolve_policy(
    policy: Option<SelectorResolutionPolicy>,
    per_attempt_ms: Option<u64>,
) -> Result<Option<SelectorResolutionPolicy>, crate::Error> {
    let resolved = match (policy, per_attempt_ms) {
        (Some(SelectorResolutionPolicy::TryInOrderWithTimeout { .. }), Some(ms))
        | (None, Some(ms)) => Some(SelectorResolutionPolicy::TryInOrderWithTimeout { per_attempt_ms: ms }),
        (Some(policy), _) => Some(policy),
        (None, None) => None,
    };

    if let Some(SelectorResolutionPolicy::TryInOrderWithTimeout { per_attempt_ms: 0 }) = resolved {
        return Err(crate::Error::Config("--per-attempt-ms must be > 0".to_string()));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::selector_policy::DEFAULT_PER_ATTEMPT_MS;
    use clap::CommandFactory;

    #[test]
    fn test_output_dir() {
        let dir = Cli::output_dir();
        assert!(dir.to_string_lossy().contains("generated"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compile_with_defaults() {
        let cli = Cli::try_parse_from(["flowc", "compile", "--input", "flow.json"]).unwrap();

        match cli.command {
            Commands::Compile { input, output, policy, per_attempt_ms, stdout } => {
                assert_eq!(input, PathBuf::from("flow.json"));
                assert!(output.is_none());
                assert!(policy.is_none());
                assert!(per_attempt_ms.is_none());
                assert!(!stdout);
            }
            _ => panic!("Expected Compile command"),
        }
    }

    #[test]
    fn test_parse_compile_with_all_options() {
        let cli = Cli::try_parse_from([
            "flowc", "compile",
            "--input", "flow.yaml",
            "--output", "out",
            "--policy", "try-in-order",
            "--per-attempt-ms", "500",
            "--stdout",
        ])
        .unwrap();

        match cli.command {
            Commands::Compile { input, output, policy, per_attempt_ms, stdout } => {
                assert_eq!(input, PathBuf::from("flow.yaml"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(
                    policy,
                    Some(SelectorResolutionPolicy::TryInOrderWithTimeout { per_attempt_ms: DEFAULT_PER_ATTEMPT_MS })
                );
                assert_eq!(per_attempt_ms, Some(500));
                assert!(stdout);
            }
            _ => panic!("Expected Compile command"),
        }
    }

    #[test]
    fn test_parse_compile_rejects_unknown_policy() {
        let result = Cli::try_parse_from(["flowc", "compile", "--input", "f.json", "--policy", "random"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_compile_requires_input() {
        assert!(Cli::try_parse_from(["flowc", "compile"]).is_err());
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["flowc", "validate", "login.spec"]).unwrap();
        match cli.command {
            Commands::Validate { script } => assert_eq!(script, PathBuf::from("login.spec")),
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_parse_init_force() {
        let cli = Cli::try_parse_from(["flowc", "init", "-f"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from(["flowc", "config", "set", "output.extension", "spec.ts"]).unwrap();
        match cli.command {
            Commands::Config { action: ConfigAction::Set { key, value } } => {
                assert_eq!(key, "output.extension");
                assert_eq!(value, "spec.ts");
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["flowc", "--verbose", "--config", "/tmp/c.toml", "list"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_resolve_policy() {
        assert_eq!(resolve_policy(None, None).unwrap(), None);
        assert_eq!(
            resolve_policy(None, Some(750)).unwrap(),
            Some(SelectorResolutionPolicy::TryInOrderWithTimeout { per_attempt_ms: 750 })
        );
        assert_eq!(
            resolve_policy(Some(SelectorResolutionPolicy::TryAllConcurrentFirstWin), Some(750)).unwrap(),
            Some(SelectorResolutionPolicy::TryAllConcurrentFirstWin)
        );
        assert_eq!(
            resolve_policy(Some(SelectorResolutionPolicy::FirstOnly), None).unwrap(),
            Some(SelectorResolutionPolicy::FirstOnly)
        );
    }

    #[test]
    fn test_resolve_policy_rejects_zero_timeout() {
        let cli = Cli::try_parse_from([
            "flowc", "compile",
            "--input", "flow.json",
            "--policy", "try-in-order",
            "--per-attempt-ms", "0",
        ])
        .unwrap();

        match cli.command {
            Commands::Compile { policy, per_attempt_ms, .. } => {
                let result = resolve_policy(policy, per_attempt_ms);
                assert!(matches!(result, Err(crate::Error::Config(_))));
            }
            _ => panic!("Expected Compile command"),
        }

        assert!(resolve_policy(None, Some(0)).is_err());
        // Ignored when another policy is chosen
        assert!(resolve_policy(Some(SelectorResolutionPolicy::FirstOnly), Some(0)).is_ok());
    }
}
