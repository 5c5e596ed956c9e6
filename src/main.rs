use anyhow::Context;
use easyappoint::config::Settings;
use easyappoint::startup::Application;
use easyappoint::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise logger
    let subscriber = get_subscriber("info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    // Read configuration
    let config = Settings::load_with_dotenv().context("Failed to read configuration.")?;
    tracing::info!(
        address = %config.address(),
        overlap_rule = ?config.scheduling.overlap_rule,
        "Starting appointment API"
    );

    // Run the app
    let application = Application::build(config)?;
    application.run_until_stopped().await?;

    Ok(())
}
