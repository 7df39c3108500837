//! Flowstate CLI - wellness dashboard launcher

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use flowstate::config::mask_key;
use flowstate::health::{HealthSource, MockHealthSource, TerraClient};
use flowstate::{FixSuggestion, FlowConfig, FlowError, SubmissionClient};

#[derive(Parser)]
#[command(name = "flowstate")]
#[command(about = "FlowState - terminal wellness dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the dashboard
    Run {
        /// Stress score to display (computed upstream, out of scope here)
        #[arg(short, long, default_value_t = 50)]
        stress_score: u8,

        /// Override the backend base URL
        #[arg(short, long)]
        backend: Option<String>,

        /// Use the offline mock health source even if credentials exist
        #[arg(long)]
        mock_health: bool,

        /// Config file path (defaults to ~/.config/flowstate/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate configuration without launching
    Check {
        /// Config file path (defaults to ~/.config/flowstate/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            stress_score,
            backend,
            mock_health,
            config,
        } => run_dashboard(stress_score, backend, mock_health, config).await,
        Commands::Check { config } => check_config(config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(flow) = e.downcast_ref::<FlowError>() {
            if let Some(suggestion) = flow.fix_suggestion() {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
        }
        std::process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<FlowConfig, FlowError> {
    let config = match path {
        Some(path) => FlowConfig::load_from(&path)?,
        None => FlowConfig::load()?,
    };
    Ok(config.with_env())
}

/// Initialize tracing to a log file when `FLOWSTATE_LOG` is set.
///
/// The alternate screen owns stdout/stderr while the dashboard runs, so
/// logging defaults to off rather than corrupting the frame.
fn init_tui_tracing() {
    let Ok(path) = std::env::var("FLOWSTATE_LOG") else {
        return;
    };
    let Ok(file) = std::fs::File::create(&path) else {
        eprintln!("{} could not open log file {}", "Warning:".yellow(), path);
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

async fn run_dashboard(
    stress_score: u8,
    backend: Option<String>,
    mock_health: bool,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    init_tui_tracing();

    let mut config = load_config(config_path)?;
    if let Some(backend) = backend {
        config.backend_url = backend;
    }

    let base = config.backend_base()?;
    let client = SubmissionClient::new(base);

    let health: Box<dyn HealthSource> = match (&config.health.api_key, &config.health.dev_id) {
        (Some(api_key), Some(dev_id)) if !mock_health => {
            tracing::info!("Using Terra health source");
            Box::new(TerraClient::new(api_key.clone(), dev_id.clone()))
        }
        _ => {
            tracing::info!("Using mock health source");
            Box::new(MockHealthSource::new())
        }
    };

    flowstate::tui::run(client, health, stress_score).await
}

fn check_config(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let base = config.backend_base()?;

    println!("{} Configuration is valid", "✓".green());
    println!("  Backend: {}", base.as_str().cyan());

    match (&config.health.api_key, &config.health.dev_id) {
        (Some(api_key), Some(dev_id)) => {
            println!("  Health aggregator: {}", "configured".green());
            println!("    api-key: {}", mask_key(api_key, 8));
            println!("    dev-id:  {}", dev_id);
        }
        _ => {
            println!(
                "  Health aggregator: {} (mock source will be used)",
                "not configured".yellow()
            );
        }
    }

    Ok(())
}
