use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, EnvFilter};

use doorman::{loader, settings, snapshot, web};

#[derive(Parser, Debug)]
#[command(
    name = "doorman",
    version,
    about = "Access decision service for the building-asset admin console"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // compile the initial snapshot from the policy directory
    let state = loader::load_policies(&settings.access.policies_dir)
        .map_err(|e| miette::miette!("failed to load access policies: {e}"))?;
    let cell = snapshot::StateCell::new(state);

    // start web server
    web::serve(settings, cell).await?;
    Ok(())
}
