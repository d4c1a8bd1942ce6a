//! Mowing Event Evaluation - command line entry point
//!
//! Handles:
//! - Full evaluations (load, clean, match, aggregate, render)
//! - Writing cleaned input tables
//! - Configuration inspection
//! - JSON Schemas of the record types

use clap::{Args, Parser, Subcommand};
use mw_common::{Error, OutputFormat, Result};
use mw_config::{load_config, ConfigError, ConfigOptions, ConfigOverrides, DoyRange, MetricScope, ResolvedConfig};
use mw_core::exit_codes::ExitCode;
use mw_core::log_event;
use mw_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use mw_core::output::{render_report, write_cleaned, write_report_tables};
use mw_core::pipeline::{load_inputs, load_warnings, run_evaluation, EvaluationRequest};
use mw_core::schema::{available_schemas, generate_all_schemas, generate_schema};
use std::path::PathBuf;

/// Mowing event evaluation - accuracy of predicted mowing dates against reference data
#[derive(Parser)]
#[command(name = "mw-eval")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config file (TOML); overrides MOWING_EVAL_CONFIG and the XDG location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate predictions against reference events
    Evaluate(EvaluateArgs),

    /// Write cleaned reference (and prediction) tables as CSV
    Clean(CleanArgs),

    /// Inspect the resolved configuration
    Config(ConfigArgs),

    /// Print JSON Schemas of input and output records
    Schema(SchemaArgs),

    /// Print version information
    Version,
}

/// Evaluation parameters; each overrides environment and config file.
#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// Maximum day difference for a true positive
    #[arg(long)]
    tolerance: Option<u32>,

    /// Valid mowing season as START,END day of year (inclusive)
    #[arg(long, value_name = "START,END")]
    valid_range: Option<DoyRange>,

    /// Minimum days between reference events of one unit and year
    #[arg(long = "min-spacing", value_name = "DAYS")]
    min_spacing: Option<u32>,

    /// Pairs used for date metrics: true_positives or all_matched
    #[arg(long)]
    metric_scope: Option<MetricScope>,
}

impl ParamArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            tolerance: self.tolerance,
            valid_range: self.valid_range,
            event_min_difference: self.min_spacing,
            metric_scope: self.metric_scope,
        }
    }
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Reference CSV (unit_id, year, region, date)
    #[arg(long)]
    reference: PathBuf,

    /// Prediction CSV (group_id, method, data_source, region, unit_id, year, date)
    #[arg(long)]
    predictions: PathBuf,

    #[command(flatten)]
    params: ParamArgs,

    /// Directory for CSV tables (required with --format csv)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Include every matched pair in the output
    #[arg(long)]
    include_matches: bool,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Reference CSV
    #[arg(long)]
    reference: PathBuf,

    /// Prediction CSV, cleaned against the cleaned reference
    #[arg(long)]
    predictions: Option<PathBuf>,

    #[command(flatten)]
    params: ParamArgs,

    /// Directory for the cleaned tables
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the resolved configuration and where it came from
    Show(ParamArgs),
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name (omit for all types)
    name: Option<String>,

    /// List available type names
    #[arg(long)]
    list: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::Clean
                }
                _ => ExitCode::ArgsError,
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    // Machine-readable stdout gets machine-readable stderr.
    let cli_format = matches!(cli.global.format, OutputFormat::Json).then_some(LogFormat::Jsonl);
    init_logging(&LogConfig::from_env(cli_level, cli_format));

    let ctx = LogContext::new(generate_run_id());
    let result = match &cli.command {
        Commands::Evaluate(args) => run_evaluate(&cli.global, args, &ctx),
        Commands::Clean(args) => run_clean(&cli.global, args, &ctx),
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show(params) => run_config_show(&cli.global, params, &ctx),
        },
        Commands::Schema(args) => run_schema(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            Ok(ExitCode::Clean)
        }
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => output_error(&cli.global, &err),
    };
    std::process::exit(exit_code.as_i32());
}

fn config_error(err: ConfigError) -> Error {
    match err {
        ConfigError::IoError { source, .. } => Error::Io(source),
        other => Error::Config(other.to_string()),
    }
}

fn resolve(global: &GlobalOpts, params: &ParamArgs, ctx: &LogContext) -> Result<ResolvedConfig> {
    let options = ConfigOptions {
        config_path: global.config.clone(),
        cli: params.overrides(),
        ..ConfigOptions::default()
    };
    let resolved = load_config(&options).map_err(config_error)?;
    log_event!(
        ctx,
        DEBUG,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "configuration resolved",
        source = resolved.source.to_string().as_str(),
        tolerance = resolved.config.tolerance,
        event_min_difference = resolved.config.event_min_difference
    );
    Ok(resolved)
}

fn run_evaluate(global: &GlobalOpts, args: &EvaluateArgs, ctx: &LogContext) -> Result<ExitCode> {
    if global.format == OutputFormat::Csv && args.out_dir.is_none() {
        return Err(Error::InvalidParameter {
            name: "out-dir".to_string(),
            message: "required with --format csv".to_string(),
        });
    }
    let resolved = resolve(global, &args.params, ctx)?;
    log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "evaluation started");

    let request = EvaluationRequest {
        reference: args.reference.clone(),
        predictions: args.predictions.clone(),
        include_matches: args.include_matches,
    };
    let report = run_evaluation(&request, &resolved, ctx)?;

    if let Some(dir) = &args.out_dir {
        let written = write_report_tables(&report, dir)?;
        log_event!(
            ctx,
            INFO,
            event_names::OUTPUT_WRITTEN,
            Stage::Output,
            "tables written",
            files = written.len(),
            dir = dir.display().to_string().as_str()
        );
        if global.format == OutputFormat::Csv {
            for path in &written {
                println!("{}", path.display());
            }
        }
    }
    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Md => print!("{}", render_report(&report)),
        OutputFormat::Csv => {}
    }

    log_event!(
        ctx,
        INFO,
        event_names::RUN_FINISHED,
        Stage::Output,
        "evaluation finished",
        warnings = report.warnings.len()
    );
    Ok(if report.warnings.is_empty() {
        ExitCode::Clean
    } else {
        ExitCode::CompletedWithWarnings
    })
}

fn run_clean(global: &GlobalOpts, args: &CleanArgs, ctx: &LogContext) -> Result<ExitCode> {
    let resolved = resolve(global, &args.params, ctx)?;
    let inputs = load_inputs(
        &args.reference,
        args.predictions.as_deref(),
        &resolved.config,
        ctx,
    )?;
    let written = write_cleaned(&inputs, &args.out_dir)?;

    let mut warnings = load_warnings("reference", &inputs.reference.stats);
    if let Some(predictions) = &inputs.predictions {
        warnings.extend(load_warnings("predictions", &predictions.stats));
    }

    match global.format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "run_id": ctx.run_id,
                "config": resolved.snapshot(),
                "reference": inputs.reference.stats,
                "predictions": inputs.predictions.as_ref().map(|p| p.stats),
                "warnings": warnings,
                "files": written,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Md | OutputFormat::Csv => {
            for warning in &warnings {
                eprintln!("warning: {}", warning);
            }
            for path in &written {
                println!("{}", path.display());
            }
        }
    }

    Ok(if warnings.is_empty() {
        ExitCode::Clean
    } else {
        ExitCode::CompletedWithWarnings
    })
}

fn run_config_show(global: &GlobalOpts, params: &ParamArgs, ctx: &LogContext) -> Result<ExitCode> {
    let resolved = resolve(global, params, ctx)?;
    let snapshot = resolved.snapshot();
    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Md | OutputFormat::Csv => {
            let config = &snapshot.config;
            println!("source: {}", snapshot.source);
            if let Some(path) = &snapshot.config_path {
                println!("file: {}", path.display());
            }
            println!("tolerance: {}", config.tolerance);
            println!("valid_range: {}", config.valid_range);
            println!("event_min_difference: {}", config.event_min_difference);
            println!("metric_scope: {}", config.metric_scope);
            if !snapshot.overrides.is_empty() {
                println!("overridden: {}", snapshot.overrides.join(", "));
            }
        }
    }
    Ok(ExitCode::Clean)
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> Result<ExitCode> {
    if args.list {
        match global.format {
            OutputFormat::Json => {
                let types: Vec<serde_json::Value> = available_schemas()
                    .into_iter()
                    .map(|(name, description)| {
                        serde_json::json!({ "name": name, "description": description })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&types)?);
            }
            _ => {
                for (name, description) in available_schemas() {
                    println!("{:<24} {}", name, description);
                }
            }
        }
        return Ok(ExitCode::Clean);
    }
    let value = match &args.name {
        Some(name) => generate_schema(name).ok_or_else(|| Error::InvalidParameter {
            name: "schema".to_string(),
            message: format!("unknown type '{}'; see 'mw-eval schema --list'", name),
        })?,
        None => serde_json::to_value(generate_all_schemas())?,
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(ExitCode::Clean)
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "mw_eval_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{}", version_info);
        }
        _ => println!("mw-eval {}", env!("CARGO_PKG_VERSION")),
    }
}

fn output_error(global: &GlobalOpts, error: &Error) -> ExitCode {
    let exit_code = ExitCode::from(error);
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "status": "error",
                "exit_code": exit_code.as_i32(),
                "error": error.to_structured(),
            });
            eprintln!("{}", response);
        }
        _ => eprintln!("{}", error.human()),
    }
    exit_code
}
