//! # Transport DSN Checker
//!
//! Command-line tool that loads the transport configuration and reports how
//! a DSN is parsed and whether this transport family handles it.

use clap::Parser;
use odm_transport::logging::init_structured_logging;
use odm_transport::{ConnectionStringParser, TransportConfig};
use std::path::PathBuf;
use std::process;
use tracing::error;

#[derive(Parser)]
#[command(name = "transport-check")]
#[command(about = "Inspect an ODM transport DSN")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// DSN to inspect, e.g. vdm+doctrine_odm://reporting
    dsn: String,

    /// Configuration file layered over the defaults
    #[arg(short, long, env = "ODM_TRANSPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TransportConfig::load(path),
        None => TransportConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            process::exit(2);
        }
    };
    init_structured_logging(config.json_logs);

    let parser = ConnectionStringParser::from_config(&config);
    let descriptor = match parser.parse(&cli.dsn) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            error!(dsn = %cli.dsn, "DSN rejected");
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let recognized = parser.is_recognized(&descriptor);

    if cli.json {
        let report = serde_json::json!({
            "dsn": cli.dsn,
            "protocol": descriptor.protocol(),
            "connection_name": descriptor.connection_name(),
            "recognized": recognized,
            "default_executor_id": config.default_executor_id,
            "executor_isolation": config.executor_isolation,
        });
        println!("{report}");
    } else {
        println!("protocol:         {}", descriptor.protocol());
        println!("connection name:  {}", descriptor.connection_name());
        println!("recognized:       {recognized}");
        println!("default executor: {}", config.default_executor_id);
        println!("isolation:        {:?}", config.executor_isolation);
    }

    if !recognized {
        process::exit(3);
    }
}
