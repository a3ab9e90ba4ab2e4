use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use pilotd::config::DaemonConfig;
use pilotd::AppContext;

#[derive(Parser)]
#[command(
    name = "pilotd",
    about = "Pilot Host — run-record daemon for automated code-generation tasks",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST server port
    #[arg(long, env = "PILOTD_PORT")]
    port: Option<u16>,

    /// Data directory for the runs file and config.toml
    #[arg(long, env = "PILOTD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PILOTD_LOG")]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the daemon server (default when no subcommand given).
    Serve,
    /// Inspect stored run records.
    ///
    /// Reads the store directly through the same tier chain the server uses,
    /// so the output reflects whatever backend the daemon would see.
    ///
    /// Examples:
    ///   pilotd runs list
    ///   pilotd runs show r-42 --json
    Runs {
        #[command(subcommand)]
        action: RunsAction,
    },
}

#[derive(Subcommand)]
enum RunsAction {
    /// List all runs, most recent first.
    List {
        /// Emit raw JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show one run with its summaries.
    Show {
        id: String,
        /// Emit raw JSON instead of a readable layout.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = DaemonConfig::new(args.port, args.data_dir, args.log);

    // Init once — must happen before any tracing calls.
    setup_logging(&config.log, &config.log_format);

    match args.command {
        Some(Command::Runs { action }) => run_runs(action, config).await,
        Some(Command::Serve) | None => serve(config).await,
    }
}

fn setup_logging(log_level: &str, log_format: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
}

async fn serve(config: DaemonConfig) -> Result<()> {
    let ctx = Arc::new(AppContext::init(config).await);
    pilotd::rest::serve(ctx).await
}

async fn run_runs(action: RunsAction, config: DaemonConfig) -> Result<()> {
    let ctx = AppContext::init(config).await;
    match action {
        RunsAction::List { json } => {
            let runs = ctx.store.load_all().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
                return Ok(());
            }
            if runs.is_empty() {
                println!("no runs recorded");
                return Ok(());
            }
            for run in runs {
                println!(
                    "{}  {:<8}  {:<9}  {}",
                    run.created_at,
                    run.task_kind.as_str(),
                    run.status.as_str(),
                    run.id
                );
            }
        }
        RunsAction::Show { id, json } => {
            let runs = ctx.store.load_all().await;
            let Some(run) = runs.into_iter().find(|r| r.id == id) else {
                eprintln!("run {id} not found");
                std::process::exit(1);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&run)?);
                return Ok(());
            }
            println!("id:       {}", run.id);
            println!("kind:     {}", run.task_kind.as_str());
            println!("status:   {}", run.status.as_str());
            println!("created:  {}", run.created_at);
            println!("input:    {}", run.input);
            println!("output:   {}", run.output_summary);
            if run.summaries.is_empty() {
                println!("summaries: none");
            } else {
                println!("summaries ({}):", run.summaries.len());
                for entry in &run.summaries {
                    println!("  [{}] {}  {}", entry.status, entry.created_at, entry.summary);
                    if let Some(decision) = &entry.decision {
                        println!("      decision: {decision}");
                    }
                }
            }
        }
    }
    Ok(())
}
