// ABOUTME: HTTP gateway that serves the EURAXESS job feed as normalized JSON records.
// ABOUTME: Exposes the router, configuration, and error mapping used by the euraxess-gateway binary.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod parse_cmd;
pub mod routes;
pub mod state;

pub use app::{build_router, serve};
pub use config::{Cli, Command, ParseArgs, ServeArgs};
pub use error::GatewayError;
pub use logging::configure_logging;
pub use state::AppState;
