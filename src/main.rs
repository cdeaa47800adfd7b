//! sqlgate - NUL-framed SQL gateway
//!
//! This is the main entry point for the sqlgate server.
//! It sets up logging, bootstraps the store, and runs the accept loop
//! until Ctrl+C.

use sqlgate::{Server, ServerConfig, DEFAULT_PORT, SERVER_NAME};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Parse configuration from command-line arguments.
///
/// The only setting is an optional positional port. An unparsable port
/// falls back to the default instead of aborting.
fn config_from_args() -> ServerConfig {
    let mut config = ServerConfig::default();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None => {}
        Some("--help") | Some("-h") => {
            print_help();
            std::process::exit(0);
        }
        Some("--version") | Some("-v") => {
            println!("sqlgate version {}", sqlgate::VERSION);
            std::process::exit(0);
        }
        Some(raw) => {
            let raw = raw.trim();
            match raw.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!(
                    "Invalid port '{}', falling back to default {}",
                    raw, DEFAULT_PORT
                ),
            }
        }
    }

    config
}

fn print_help() {
    println!(
        r#"
sqlgate - NUL-framed SQL gateway

USAGE:
    sqlgate [PORT]

ARGS:
    PORT                 Port to listen on (default: {})

OPTIONS:
    -v, --version        Print version information
    -h, --help           Print this help message

PROTOCOL:
    Send SQL text followed by a NUL byte; the reply is text followed by NUL.
    Commands answer "done", queries answer their rows, failures answer
    "SQL Error: <message>".
"#,
        DEFAULT_PORT
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let config = config_from_args();

    // Schema failures are reported, not fatal; bind failures are.
    let (server, report) = Server::bind(config).await?;
    if report.is_degraded() {
        warn!(server = SERVER_NAME, "Running without a verified schema");
    }

    // Set up shutdown on Ctrl+C
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!(server = SERVER_NAME, "Shutting down server...");
    };

    server.run_until(shutdown).await;
    Ok(())
}
