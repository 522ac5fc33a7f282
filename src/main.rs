use clap::Parser;
use konnekt_match::config::Config;
use konnekt_match::model::ServerError;
use konnekt_match::server::MatchServer;
use konnekt_match::telemetry::{init_telemetry, shutdown_telemetry};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::parse();
    init_telemetry(&config)?;

    let result = MatchServer::from_config(&config)
        .run(config.socket_addr())
        .await;

    if let Err(e) = &result {
        tracing::error!("Server error: {}", e);
    }
    shutdown_telemetry(&config);
    result
}
