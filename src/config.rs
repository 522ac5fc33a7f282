use crate::matchmaking::MatchConfig;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Server configuration from command-line flags, falling back to the
/// environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "konnekt-match",
    version,
    about = "Anonymous one-to-one matchmaking and relay server"
)]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "KONNEKT_MATCH_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind
    #[arg(short, long, env = "KONNEKT_MATCH_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory with the web client, served for every non-API path
    #[arg(long, env = "KONNEKT_MATCH_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Outbound queue size per connection
    #[arg(
        long,
        env = "KONNEKT_MATCH_CHANNEL_CAPACITY",
        default_value_t = 64,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub channel_capacity: u32,

    /// Waiting users examined per search before the caller is queued
    #[arg(
        long,
        env = "KONNEKT_MATCH_MAX_MATCH_ATTEMPTS",
        default_value_t = 2,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_match_attempts: u32,

    /// Emit logs as JSON
    #[arg(long, env = "KONNEKT_MATCH_LOG_JSON")]
    pub log_json: bool,

    /// Export spans to Jaeger (requires the `telemetry` feature)
    #[arg(long, env = "ENABLE_TELEMETRY")]
    pub enable_telemetry: bool,

    #[arg(
        long,
        env = "JAEGER_ENDPOINT",
        default_value = "http://jaeger:14268/api/traces"
    )]
    pub jaeger_endpoint: String,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            channel_capacity: self.channel_capacity as usize,
            max_match_attempts: self.max_match_attempts as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["konnekt-match"]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert!(config.static_dir.is_none());
        assert_eq!(config.match_config(), MatchConfig::default());
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "konnekt-match",
            "--host",
            "127.0.0.1",
            "-p",
            "8080",
            "--static-dir",
            "static",
            "--max-match-attempts",
            "3",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.static_dir, Some(PathBuf::from("static")));
        assert_eq!(config.match_config().max_match_attempts, 3);
        assert!(config.log_json);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let result = Config::try_parse_from(["konnekt-match", "--channel-capacity", "0"]);
        assert!(result.is_err());
    }
}
