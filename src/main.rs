//! Flow Compiler - Recorded Flow to Playwright Script Compiler
//!
//! Turns captured browser interaction flows into standalone test scripts.

use flow_compiler::app::cli::{resolve_policy, Cli, Commands, ConfigAction};
use flow_compiler::app::config::Config;
use flow_compiler::codegen::validation::ScriptValidator;
use flow_compiler::synthesis::selector_policy::SelectorResolutionPolicy;
use flow_compiler::workflow::compiler::{CompilerConfig, ScriptCompiler};
use flow_compiler::workflow::flow::RawFlow;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match &cli.config {
        Some(path) if !path.exists() => anyhow::bail!("Config file not found: {:?}", path),
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match cli.command {
        Commands::Compile {
            input,
            output,
            policy,
            per_attempt_ms,
            stdout,
        } => {
            let policy = resolve_policy(policy, per_attempt_ms)?;
            run_compile(&input, output, policy, stdout, &config)?;
        }
        Commands::Validate { script } => {
            run_validate(&script)?;
        }
        Commands::List => {
            run_list(&config)?;
        }
        Commands::Init { force } => {
            run_init(force, &config_path, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config_path, &config)?;
        }
    }

    Ok(())
}

fn run_compile(
    input: &Path,
    output: Option<PathBuf>,
    policy: Option<SelectorResolutionPolicy>,
    stdout: bool,
    config: &Config,
) -> anyhow::Result<()> {
    info!("Compiling flow from {:?}", input);

    if !input.exists() {
        anyhow::bail!("Flow file not found: {:?}", input);
    }

    let raw = RawFlow::load(input)?;
    info!(
        flow_id = %raw.id,
        "Loaded flow '{}' with {} interactions",
        raw.name,
        raw.len()
    );

    let mut compiler_config = CompilerConfig::from(config);
    if let Some(policy) = policy {
        compiler_config.selector_policy = policy;
    }
    let compiler = ScriptCompiler::with_config(compiler_config);

    if stdout {
        let script = match compiler.compile_raw(raw) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to compile flow: {}", e);
                anyhow::bail!("Compilation failed: {}", e);
            }
        };
        print!("{}", script.source());
        return Ok(());
    }

    let output_dir = output.unwrap_or_else(|| config.output_dir(Cli::output_dir()));
    let writer = config.writer(output_dir);
    let name = raw.name.clone();
    let step_count = raw.len();

    let path = match compiler.compile_and_write(raw, &writer, chrono::Utc::now()) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to compile flow: {}", e);
            anyhow::bail!("Compilation failed: {}", e);
        }
    };

    println!("\nScript Generated Successfully!");
    println!("  Flow: {}", name);
    println!("  Steps: {}", step_count);
    println!("  Policy: {}", compiler.config().selector_policy.name());
    println!("  Output: {:?}", path);

    Ok(())
}

fn run_validate(script: &Path) -> anyhow::Result<()> {
    info!("Validating {:?}", script);

    if !script.exists() {
        anyhow::bail!("Script file not found: {:?}", script);
    }

    let content = std::fs::read_to_string(script)?;
    let result = ScriptValidator::new().validate_source(&content);

    for warning in &result.warnings {
        warn!("{}", warning);
    }

    if result.passed {
        println!("Validation PASSED");
        Ok(())
    } else {
        println!("Validation FAILED:");
        for err in &result.errors {
            println!("  - [{:?}] {}", err.error_type, err.message);
            if let Some(loc) = &err.location {
                println!("    at {}", loc);
            }
        }
        anyhow::bail!("Validation failed with {} errors", result.errors.len())
    }
}

fn run_list(config: &Config) -> anyhow::Result<()> {
    let writer = config.writer(config.output_dir(Cli::output_dir()));
    let entries = writer.list()?;

    if entries.is_empty() {
        println!("No generated scripts found in {}", writer.output_dir().display());
        println!("Compile one with: flowc compile --input <flow.json>");
        return Ok(());
    }

    println!("Generated scripts in {:?}:", writer.output_dir());
    for path in &entries {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        println!("  {}  ({} bytes)", file_name, size);
    }
    println!("\nTotal: {} scripts", entries.len());

    Ok(())
}

fn run_init(force: bool, config_path: &PathBuf, config: &Config) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save(config_path)?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    let output_dir = config.output_dir(Cli::output_dir());
    std::fs::create_dir_all(&output_dir)?;
    println!("\nCreated output directory: {:?}", output_dir);

    Ok(())
}

fn run_config(action: ConfigAction, config_path: &PathBuf, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Configuration ({:?}):\n", config_path);
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Get { key } => match config.get_value(&key)? {
            Some(value) => println!("{} = {}", key, value),
            None => anyhow::bail!("Configuration key '{}' not found", key),
        },
        ConfigAction::Set { key, value } => {
            if !config_path.exists() {
                anyhow::bail!("No config file found. Run 'flowc init' first.");
            }

            let updated = config.with_value(&key, &value)?;
            updated.save(config_path)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Reset { force } => {
            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            Config::default().save(config_path)?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}
