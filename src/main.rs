use clap::Parser;

use llm_integrator::app_state::AppState;
use llm_integrator::config::GatewayConfig;
use llm_integrator::server::startup;

#[derive(Parser)]
#[command(about = "Ticket triage and batch chatbot evaluation gateway")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Per-row retry budget; total attempts per row = max-retry + 1.
    #[arg(long, default_value_t = 0)]
    max_retry: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = GatewayConfig::from_env()?;
    config.host = cli.host;
    config.port = cli.port;
    config.max_retry = cli.max_retry;

    let state = AppState::new(&config)?;
    actix_web::rt::System::new().block_on(async move { startup(config, state).await })?;
    Ok(())
}
