//! cropsense-sr - Soil sample intake and crop recommendation service
//!
//! `serve` (default) runs the HTTP service; `recommend` runs one sample
//! through the same workflow from the command line.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cropsense_common::config::{load_toml_config, ConfigFileResolver};
use cropsense_sr::config::{CliOverrides, ServiceConfig};
use cropsense_sr::models::MeasurementField;
use cropsense_sr::workflow::{InputMode, IntakeSession, SubmissionError};
use cropsense_sr::AppState;

/// Command-line arguments for cropsense-sr
#[derive(Parser, Debug)]
#[command(name = "cropsense-sr")]
#[command(about = "Soil sample intake and crop recommendation service")]
#[command(version)]
struct Cli {
    /// Path to TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// HTTP listen address
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Prediction endpoint URL
    #[arg(long, global = true)]
    predictor_url: Option<String>,

    /// Weather lookup endpoint URL
    #[arg(long, global = true)]
    weather_url: Option<String>,

    /// Weather provider API key
    #[arg(long, global = true)]
    weather_api_key: Option<String>,

    /// Outbound request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Maximum recommendations shown
    #[arg(long, global = true)]
    display_limit: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Submit one sample and print ranked recommendations
    Recommend(RecommendArgs),
}

#[derive(Args, Debug)]
struct RecommendArgs {
    #[arg(long, allow_hyphen_values = true)]
    nitrogen: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    phosphorus: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    potassium: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    humidity: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    ph: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    rainfall: Option<String>,
    /// One of sandy, clay, silt, peat, chalk, loam
    #[arg(long)]
    soil_type: Option<String>,
    /// Location hint for the weather lookup
    #[arg(long)]
    location: Option<String>,
    /// Take temperature, humidity and rainfall from the weather lookup
    #[arg(long, requires = "location")]
    use_location: bool,
}

impl RecommendArgs {
    fn entries(&self) -> [(MeasurementField, &Option<String>); 9] {
        [
            (MeasurementField::Nitrogen, &self.nitrogen),
            (MeasurementField::Phosphorus, &self.phosphorus),
            (MeasurementField::Potassium, &self.potassium),
            (MeasurementField::Temperature, &self.temperature),
            (MeasurementField::Humidity, &self.humidity),
            (MeasurementField::Ph, &self.ph),
            (MeasurementField::Rainfall, &self.rainfall),
            (MeasurementField::SoilType, &self.soil_type),
            (MeasurementField::Location, &self.location),
        ]
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = ConfigFileResolver::new("cropsense-sr").resolve(cli.config.as_deref());
    let toml_config = load_toml_config(config_path.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the TOML [logging] level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", toml_config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "cropsense-sr v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (compiled defaults)"),
    }

    let overrides = CliOverrides {
        bind_address: cli.bind.clone(),
        predictor_url: cli.predictor_url.clone(),
        weather_url: cli.weather_url.clone(),
        weather_api_key: cli.weather_api_key.clone(),
        request_timeout_secs: cli.timeout_secs,
        display_limit: cli.display_limit,
    };
    let config = ServiceConfig::resolve(&overrides, &toml_config)
        .context("Invalid configuration")?;
    info!("Predictor: {}", config.predictor_url);

    let state = AppState::from_config(&config).context("Failed to build HTTP clients")?;

    match cli.command {
        None | Some(Command::Serve) => serve(config, state).await,
        Some(Command::Recommend(args)) => recommend(args, state).await,
    }
}

async fn serve(config: ServiceConfig, state: AppState) -> Result<()> {
    let app = cropsense_sr::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn recommend(args: RecommendArgs, state: AppState) -> Result<()> {
    let mode = if args.use_location {
        InputMode::Location
    } else {
        InputMode::Manual
    };

    let mut session = IntakeSession::new();
    for (field, value) in args.entries() {
        if let Some(value) = value {
            session.set_field(field.name(), value.as_str())?;
        }
    }
    session.set_mode(mode);

    match session
        .submit(state.predictor.as_ref(), state.ambient.as_ref())
        .await
    {
        Ok(outcome) => {
            let shown = state
                .display_limit
                .unwrap_or(outcome.recommendations.len());
            if outcome.recommendations.is_empty() {
                println!("No recommendations available.");
            }
            for recommendation in outcome.recommendations.iter().take(shown) {
                println!("{}: {}", recommendation.crop, recommendation.confidence);
            }
            Ok(())
        }
        Err(SubmissionError::Validation(e)) => {
            for violation in e.violations() {
                eprintln!("{}", violation);
            }
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
