//! schema-migrate CLI - Cross-dialect schema migration planning.

use clap::{Parser, Subcommand};
use schema_migrate::{
    Config, DialectCatalog, MigrateError, MigrationPlan, SchemaAnalysisResult, SchemaConverter,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

/// Exit code when interrupted by Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "schema-migrate")]
#[command(about = "Cross-dialect schema migration planning and SQL generation")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a migration plan from a schema analysis
    Plan {
        /// Schema analysis JSON file
        #[arg(long)]
        schema: PathBuf,

        /// Free-text instructions used to refine the plan
        #[arg(long)]
        instructions: Option<String>,

        /// Write the plan JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the migration script
    Script {
        /// Schema analysis JSON file
        #[arg(long)]
        schema: PathBuf,

        /// Existing plan JSON (built from the schema when omitted)
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Write the SQL here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Explain a migration plan in plain language
    Explain {
        /// Plan JSON file
        #[arg(long)]
        plan: PathBuf,
    },

    /// Map a single source column type to the target dialect
    MapType {
        /// Source type, e.g. "nvarchar(50)"
        #[arg(value_name = "TYPE")]
        source_type: String,

        /// Source dialect (defaults to the configured source type)
        #[arg(long)]
        source_dialect: Option<String>,
    },

    /// List supported target dialects
    Dialects,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e.format_detailed());
                ExitCode::from(e.exit_code())
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nReceived Ctrl-C. Aborting...");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(cli: Cli) -> Result<(), MigrateError> {
    // Handle dialects separately (doesn't need a config)
    if let Commands::Dialects = cli.command {
        for name in DialectCatalog::with_builtins().dialect_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = Config::load(&cli.config)?;
    info!(
        "Loaded configuration from {:?} (hash {})",
        cli.config,
        config.hash()
    );
    let converter = SchemaConverter::from_config(&config)?;

    match cli.command {
        Commands::Dialects => unreachable!(), // Handled above
        Commands::Plan {
            schema,
            instructions,
            output,
        } => {
            let analysis = read_analysis(&schema)?;
            let plan = converter
                .generate_migration_plan(&analysis, &config.target, instructions.as_deref())
                .await;
            write_output(output.as_deref(), &serde_json::to_string_pretty(&plan)?)?;
        }
        Commands::Script {
            schema,
            plan,
            output,
        } => {
            let analysis = read_analysis(&schema)?;
            let plan = match plan {
                Some(path) => read_plan(&path)?,
                None => {
                    converter
                        .generate_migration_plan(&analysis, &config.target, None)
                        .await
                }
            };
            let script = converter.generate_migration_script(&plan, &analysis).await;
            write_output(output.as_deref(), &script)?;
        }
        Commands::Explain { plan } => {
            let plan = read_plan(&plan)?;
            println!("{}", converter.explain_plan(&plan).await);
        }
        Commands::MapType {
            source_type,
            source_dialect,
        } => {
            let source = source_dialect.unwrap_or_else(|| config.source.r#type.clone());
            let mapping = converter.map_type(&source_type, &source).await;
            if let Some(warning) = &mapping.warning {
                eprintln!("warning: {}", warning);
            }
            println!("{}", mapping.target_type);
        }
    }

    Ok(())
}

fn read_analysis(path: &Path) -> Result<SchemaAnalysisResult, MigrateError> {
    let content = std::fs::read_to_string(path)?;
    let analysis: SchemaAnalysisResult = serde_json::from_str(&content)?;
    info!(
        "Loaded {} schema analysis from {:?}: {} tables",
        analysis.database_type,
        path,
        analysis.tables.len()
    );
    Ok(analysis)
}

fn read_plan(path: &Path) -> Result<MigrationPlan, MigrateError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), MigrateError> {
    match path {
        Some(path) => {
            std::fs::write(path, content)?;
            info!("Wrote {} bytes to {:?}", content.len(), path);
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only plans and SQL.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
