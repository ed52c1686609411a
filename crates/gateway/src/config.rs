// ABOUTME: Command-line and environment configuration for the gateway binary.
// ABOUTME: Defines the serve and parse subcommands with clap, reading defaults from env vars.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use euraxess_feed::DEFAULT_CACHE_CAPACITY;
use euraxess_fetch::Client;

/// Public EURAXESS job feed.
pub const DEFAULT_FEED_URL: &str = "https://euraxess.ec.europa.eu/job-feed";

/// Listing size used when a request carries no `limit`.
pub const DEFAULT_LIMIT: u16 = 50;

/// Largest `limit` a listing request may ask for.
pub const MAX_LIMIT: u16 = 500;

pub const DEFAULT_LOG_FILTER: &str = "info,web_request=info";

/// EURAXESS job feed gateway.
#[derive(Parser, Debug)]
#[command(name = "euraxess-gateway", version)]
#[command(about = "Serve the EURAXESS job feed as normalized JSON", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server options, used when no subcommand is given.
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP gateway (default).
    Serve(ServeArgs),
    /// Normalize a feed from a file, stdin, or URL and print the records as JSON.
    Parse(ParseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Feed source URL.
    #[arg(long, env = "EURAXESS_RSS", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Listing size when a request has no limit (1-500).
    #[arg(
        long,
        env = "DEFAULT_LIMIT",
        default_value_t = DEFAULT_LIMIT,
        value_parser = clap::value_parser!(u16).range(1..=MAX_LIMIT as i64)
    )]
    pub default_limit: u16,

    /// Address to bind.
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Timeout for each upstream request, in seconds.
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Number of distinct feed bodies whose normalized records are memoized.
    #[arg(long, env = "FEED_CACHE_CAPACITY", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: NonZeroUsize,

    /// Allow /get_job to fetch pages on loopback and private networks.
    #[arg(long, env = "ALLOW_PRIVATE_NETWORKS")]
    pub allow_private_networks: bool,

    #[command(flatten)]
    pub log: LogArgs,
}

impl ServeArgs {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the upstream client described by these options.
    pub fn client(&self) -> Client {
        Client::builder()
            .timeout(self.timeout())
            .allow_private_networks(self.allow_private_networks)
            .build()
    }
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Feed file path, http(s) URL, or "-" to read from stdin.
    pub target: String,

    /// Print at most this many records.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Timeout for fetching a URL target, in seconds.
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log filter directives, e.g. "info,web_request=debug".
    #[arg(long = "log-filter", env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub filter: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_serves_with_defaults() {
        let cli = Cli::try_parse_from(["euraxess-gateway"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, 8080);
        assert_eq!(cli.serve.cache_capacity.get(), 32);
        assert!(!cli.serve.allow_private_networks);
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "euraxess-gateway",
            "serve",
            "--feed-url",
            "http://localhost:9000/feed",
            "--default-limit",
            "10",
            "--host",
            "127.0.0.1",
            "--port",
            "9090",
            "--allow-private-networks",
        ])
        .unwrap();

        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(args.feed_url, "http://localhost:9000/feed");
        assert_eq!(args.default_limit, 10);
        assert_eq!(args.bind_addr().to_string(), "127.0.0.1:9090");
        assert!(args.allow_private_networks);
    }

    #[test]
    fn test_serve_client_uses_configured_options() {
        let cli = Cli::try_parse_from(["euraxess-gateway", "--timeout-secs", "5"]).unwrap();
        let client = cli.serve.client();
        assert_eq!(client.options().timeout, Duration::from_secs(5));
        assert_eq!(client.options().user_agent, euraxess_fetch::DEFAULT_USER_AGENT);
        assert!(!client.options().allow_private_networks);
    }

    #[test]
    fn test_default_limit_out_of_range() {
        for bad in ["0", "501"] {
            let result =
                Cli::try_parse_from(["euraxess-gateway", "serve", "--default-limit", bad]);
            assert!(result.is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_parse_subcommand() {
        let cli =
            Cli::try_parse_from(["euraxess-gateway", "parse", "-", "--limit", "3", "--compact"])
                .unwrap();
        let Some(Command::Parse(args)) = cli.command else {
            panic!("expected parse subcommand");
        };
        assert_eq!(args.target, "-");
        assert_eq!(args.limit, Some(3));
        assert!(args.compact);
    }
}
