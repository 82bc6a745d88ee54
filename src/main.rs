//! beanlink command-line entry point
//!
//! Runs one named operation against a BeanOS peripheral over BLE.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                      │
//! │                                                              │
//! │  BleDiscovery     BleConnection    DirectorySinks  LogSink   │
//! │  (Discovery)      (Transport)      (SinkProvider)  (Events)  │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  LinkService · Dispatcher · Correlator · Chunked       │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use tracing_subscriber::EnvFilter;

use beanlink::adapters::ble::BleDiscovery;
use beanlink::adapters::file_sink::DirectorySinks;
use beanlink::adapters::log_sink::LogEventSink;
use beanlink::app::commands::Operation;
use beanlink::app::service::LinkService;
use beanlink::config::LinkConfig;
use beanlink::rpc::chunked::TransferStatus;
use beanlink::rpc::engine::OperationResult;

/// Send a command to a BeanOS peripheral, or download its data file.
#[derive(Debug, Parser)]
#[command(name = "beanlink", version)]
struct Cli {
    /// enable_metrics | disable_metrics | req_height | get_max_height | store_file
    #[arg(value_parser = Operation::from_str)]
    operation: Operation,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advertised device name
    #[arg(long)]
    name: Option<String>,

    /// Directory downloads are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Scan window in milliseconds
    #[arg(long)]
    scan_timeout_ms: Option<u64>,

    /// Per-chunk reply deadline in milliseconds
    #[arg(long)]
    chunk_timeout_ms: Option<u64>,
}

impl Cli {
    fn link_config(&self) -> Result<LinkConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                LinkConfig::from_json(&text)?
            }
            None => LinkConfig::default(),
        };

        if let Some(name) = &self.name {
            config.device_name.clone_from(name);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(ms) = self.scan_timeout_ms {
            config.scan_timeout_ms = ms;
        }
        if let Some(ms) = self.chunk_timeout_ms {
            config.chunk_timeout_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.link_config()?;
    info!("beanlink v{} → {}", env!("CARGO_PKG_VERSION"), config.device_name);

    let discovery = BleDiscovery::new().await?;
    let mut sinks = DirectorySinks::from_config(&config);
    let mut events = LogEventSink::new();
    let mut service = LinkService::new(discovery, config)?;

    match service.run(cli.operation, &mut sinks, &mut events).await? {
        OperationResult::Ack(Some(ack)) => println!("{}: {}", cli.operation, ack),
        OperationResult::Ack(None) => println!("{}: sent", cli.operation),
        OperationResult::Text(text) => println!("{}: {}", cli.operation, text),
        OperationResult::Transfer(report) => {
            let path = sinks
                .last_path()
                .map_or_else(|| report.filename.clone(), |p| p.display().to_string());
            match report.status {
                TransferStatus::Complete => {
                    println!("Download complete! Data saved to: {}", path);
                    println!("Total bytes downloaded: {}", report.bytes_written);
                }
                TransferStatus::Incomplete(cause) => {
                    println!(
                        "Download incomplete: {}/{} bytes saved to {}",
                        report.bytes_written, report.total_bytes, path
                    );
                    bail!("transfer aborted: {cause}");
                }
            }
        }
    }

    Ok(())
}
