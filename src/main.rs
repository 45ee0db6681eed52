use postergen::{logger, AwsClients, Config, PosterHandler};
#[cfg(not(feature = "server"))]
use std::io::Read;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env()?)?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment only");
    }

    let config = Config::from_env().inspect_err(|e| log::error!("❌ {}", e))?;
    logger::log_config_info(&config);

    let clients = AwsClients::new(&config.aws).await;
    let handler = PosterHandler::from_clients(clients, &config);
    log::info!("✅ AWS clients initialized");

    run(handler, &config).await
}

#[cfg(feature = "server")]
async fn run(handler: PosterHandler, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    postergen::server::run(handler, config.port()).await?;
    Ok(())
}

/// One event per invocation: JSON on stdin, envelope on stdout.
#[cfg(not(feature = "server"))]
async fn run(handler: PosterHandler, _config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .inspect_err(|e| log::error!("❌ Failed to read event from stdin: {}", e))?;
    let event = postergen::handler::parse_event(&raw)?;

    match handler.handle(&event).await {
        Ok(envelope) => {
            println!("{}", serde_json::to_string(&envelope)?);
            Ok(())
        }
        Err(e) => {
            if !e.is_backend() {
                log::error!("❌ Request failed: {}", e);
            }
            Err(e.into())
        }
    }
}
