mod config;
mod http;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use pmwatch_core::{acquisition, Link, SerialService, ServiceClock, SharedReading};
use pmwatch_decode::ChecksumPolicy;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::http::AppState;

#[derive(Parser, Debug)]
#[command(name = "pmwatch")]
#[command(about = "Serve live particle sensor readings over HTTP")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "pmwatch.toml")]
    config: PathBuf,
    /// Serial port the sensor is attached to
    #[arg(short, long)]
    port: Option<String>,
    #[arg(short, long)]
    baud: Option<u32>,
    /// Address for the HTTP server
    #[arg(short, long)]
    listen: Option<SocketAddr>,
    /// Reject frames whose checksum does not match
    #[arg(long)]
    strict_checksum: bool,
    /// Print available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(port) = &self.port {
            config.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(addr) = self.listen {
            config.http.addr = addr;
        }
        if self.strict_checksum {
            config.serial.checksum = ChecksumPolicy::Strict;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("pmwatch=info,pmwatch_core=info"),
    )
    .init();

    let cli = Cli::parse();

    if cli.list_ports {
        for port in SerialService::list_ports() {
            println!("{port}");
        }
        return Ok(());
    }

    let mut config = if cli.config.exists() {
        info!("loading configuration from {}", cli.config.display());
        Config::load(&cli.config)?
    } else {
        info!("no configuration file found, using defaults");
        Config::default()
    };
    cli.apply(&mut config);

    if config.serial.port.is_empty() {
        bail!("no serial port configured; pass --port or set serial.port");
    }

    let shared = SharedReading::new(ServiceClock::start());
    let link = Link::new();

    let acq = acquisition::spawn(
        config.serial_config(),
        config.acquisition_config(),
        shared.clone(),
        link.clone(),
    )?;
    link.wait_until_ready(config.startup_timeout())
        .with_context(|| format!("serial link {} did not come up", config.serial.port))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(config.http.addr, AppState { shared, link }));

    acq.shutdown();
    result
}

async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "pmwatch",
            "--port",
            "/dev/ttyUSB1",
            "--baud",
            "19200",
            "--listen",
            "127.0.0.1:3000",
            "--strict-checksum",
        ]);
        let mut config = Config::parse("[serial]\nport = \"/dev/ttyS0\"\n").unwrap();
        cli.apply(&mut config);
        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.serial.baud_rate, 19200);
        assert_eq!(config.http.addr.port(), 3000);
        assert_eq!(config.serial.checksum, ChecksumPolicy::Strict);
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let cli = Cli::parse_from(["pmwatch"]);
        let mut config =
            Config::parse("[serial]\nport = \"/dev/ttyS0\"\nchecksum = \"strict\"\n").unwrap();
        cli.apply(&mut config);
        assert_eq!(config.serial.port, "/dev/ttyS0");
        assert_eq!(config.serial.checksum, ChecksumPolicy::Strict);
        assert_eq!(cli.config, PathBuf::from("pmwatch.toml"));
    }
}
