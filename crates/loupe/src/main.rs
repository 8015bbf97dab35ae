use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use loupe_core::prelude::*;
use loupe_core::registry::DEFAULT_REFLECTED_TYPES;
use loupe_utils::{debug, info, init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingGuard};

/// Render custom container values from a captured process snapshot.
#[derive(Parser, Debug)]
#[command(name = "loupe")]
#[command(version)]
#[command(about = "Render custom container values from a captured process snapshot", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,

    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format: pretty or json (overrides LOUPE_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Additional type (exact name) to expand through its reflective-access member
    #[arg(long = "reflect", value_name = "TYPE", global = true)]
    reflected: Vec<String>,
}

#[derive(Args, Debug)]
struct RenderArgs
{
    /// Levels of children to expand below the value
    #[arg(long, default_value_t = 8)]
    depth: usize,
    /// Children shown per value before truncating
    #[arg(long, default_value_t = 200)]
    max_children: usize,
    /// Print the value tree as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Render a value (e.g. `graph.element_to_section_ids_`)
    Print
    {
        /// Path to the snapshot file
        snapshot: PathBuf,
        /// Expression naming the value: variable, `.field`, `->field`, `[n]`
        expression: String,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Call a synthetic method (e.g. `operator[]`) and render the result
    Call
    {
        /// Path to the snapshot file
        snapshot: PathBuf,
        /// Expression naming the receiver
        expression: String,
        /// Method name
        method: String,
        /// Arguments: unsigned integers or expressions
        args: Vec<String>,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// List registered printers and synthetic methods in consultation order
    Printers,
}

fn main()
{
    let cli = Cli::parse();

    let _guard = match start_logging(cli.log_level, cli.log_format) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn start_logging(level: Option<LogLevel>, format: Option<LogFormat>) -> Result<LoggingGuard, loupe_utils::LoggingError>
{
    match (level, format) {
        (None, None) => init_logging(),
        (level, format) => init_logging_with_level(level.unwrap_or(LogLevel::Warn), format.unwrap_or(LogFormat::Pretty)),
    }
}

fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    let registry = build_registry(cli.reflected)?;

    match cli.command {
        Commands::Print {
            snapshot,
            expression,
            render,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let value = snapshot.evaluate(&expression)?;
            print_tree(&registry, &snapshot, &expression, &value, &render)
        }
        Commands::Call {
            snapshot,
            expression,
            method,
            args,
            render,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let this = snapshot.evaluate(&expression)?;
            let args = args
                .iter()
                .map(|arg| parse_argument(&snapshot, arg))
                .collect::<LoupeResult<Vec<_>>>()?;

            let Some(result) = registry.invoke(&snapshot, &this, &method, &args)? else {
                return Err(format!("no synthetic method `{method}` for `{expression}`").into());
            };
            let name = format!("{expression}.{method}({})", argument_list(&args, &snapshot)?);
            print_tree(&registry, &snapshot, &name, &result, &render)
        }
        Commands::Printers => {
            println!("Printers:");
            for binding in registry.printers() {
                println!("  {:<16} {}", binding.name, binding.matcher);
            }
            println!("Synthetic methods:");
            for binding in registry.methods() {
                println!("  {:<16} {}", binding.method, binding.matcher);
            }
            Ok(())
        }
    }
}

fn build_registry(reflected: Vec<String>) -> LoupeResult<Registry<Snapshot>>
{
    let builder = reflected
        .into_iter()
        .filter(|type_name| !DEFAULT_REFLECTED_TYPES.contains(&type_name.as_str()))
        .fold(RegistryBuilder::new().with_defaults(), |builder, type_name| {
            debug!(%type_name, "reflected type added");
            builder.reflected(type_name)
        });
    builder.build()
}

fn load_snapshot(path: &Path) -> LoupeResult<Snapshot>
{
    info!("Loading snapshot {}", path.display());
    Snapshot::from_path(path)
}

/// Integers become `unsigned long`; anything else is evaluated.
fn parse_argument(snapshot: &Snapshot, arg: &str) -> LoupeResult<SnapshotValue>
{
    match arg.parse::<u64>() {
        Ok(value) => Ok(SnapshotValue::new("unsigned long", value)),
        Err(_) => snapshot.evaluate(arg),
    }
}

fn argument_list(args: &[SnapshotValue], snapshot: &Snapshot) -> LoupeResult<String>
{
    let shown = args
        .iter()
        .map(|arg| snapshot.to_display(arg))
        .collect::<LoupeResult<Vec<_>>>()?;
    Ok(shown.join(", "))
}

fn print_tree(
    registry: &Registry<Snapshot>,
    snapshot: &Snapshot,
    name: &str,
    value: &SnapshotValue,
    args: &RenderArgs,
) -> Result<(), Box<dyn std::error::Error>>
{
    let options = RenderOptions {
        max_depth: args.depth,
        max_children: args.max_children,
    };
    let tree = render(registry, snapshot, name, value, options)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{tree}");
    }
    Ok(())
}
