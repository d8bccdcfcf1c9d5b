//! Command-line interface definitions using clap
//!
//! Flags are the fallback layer for the server settings: a non-empty
//! environment variable (`HOST`, `PORT`, `DOMAIN`, `HTTPS`, `LOCAL`,
//! `SUPERSCRT`) always takes precedence over the matching flag.

use clap::{ArgAction, Parser};

/// shorturl - A small URL shortener with access statistics
#[derive(Parser, Debug, Clone)]
#[command(name = "shorturl")]
#[command(version)]
#[command(about = "A small URL shortener with access statistics", long_about = None)]
pub struct Cli {
    /// Path of the optional TOML configuration file
    #[arg(long, short = 'c', default_value = "config.toml")]
    pub config: String,

    /// Address to bind (env: HOST)
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (env: PORT)
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Public domain used to build short URLs (env: DOMAIN)
    #[arg(long, default_value = "localhost")]
    pub domain: String,

    /// Build short URLs with https (env: HTTPS)
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub https: bool,

    /// Build short URLs as http://localhost:<port> (env: LOCAL)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub local: bool,

    /// Shared secret expected in the X-Auth-Token header (env: SUPERSCRT)
    #[arg(long, default_value = "5ecr3tT0k3n")]
    pub token: String,

    /// Number of HTTP workers (defaults to the CPU count)
    #[arg(long)]
    pub workers: Option<usize>,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: "config.toml".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            domain: "localhost".to_string(),
            https: false,
            local: true,
            token: "5ecr3tT0k3n".to_string(),
            workers: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parser() {
        let parsed = Cli::parse_from(["shorturl"]);
        let default = Cli::default();
        assert_eq!(parsed.config, default.config);
        assert_eq!(parsed.host, default.host);
        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.domain, default.domain);
        assert_eq!(parsed.https, default.https);
        assert_eq!(parsed.local, default.local);
        assert_eq!(parsed.token, default.token);
    }

    #[test]
    fn test_bool_flags_take_values() {
        let parsed = Cli::parse_from(["shorturl", "--local", "false", "--https", "true"]);
        assert!(!parsed.local);
        assert!(parsed.https);
    }
}
