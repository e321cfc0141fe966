mod config;
mod link;
mod radio;
mod relay;
mod station;
mod telemetry;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::Config;
use crate::link::{establish, LinkSupervisor, TcpProbeLink};
use crate::radio::{open_port, Receiver};
use crate::relay::{encode_body, Dispatcher, HttpTransport};
use crate::station::Station;

#[derive(Parser)]
#[command(name = "lora-relay")]
#[command(about = "Relay LoRa telemetry frames to the ground-station backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive frames from the modem and forward them
    Run {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Decode a single telemetry line and print the request bodies
    Decode {
        line: String,
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Write a single line to the modem
    Send {
        line: String,
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run(config.as_deref()).await,
        Commands::Decode { line, config } => decode(&line, config.as_deref()),
        Commands::Send { line, config } => send(&line, config.as_deref()),
    }
}

fn load_config(path: Option<&str>) -> Option<Config> {
    match path {
        Some(path) => match Config::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Error loading {}: {}", path, e);
                None
            }
        },
        None => {
            log::info!("No configuration file given, using defaults");
            Some(Config::default())
        }
    }
}

async fn run(path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let port = match open_port(&config.serial) {
        Ok(port) => port,
        Err(e) => {
            log::error!("Failed to open radio modem: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let receiver = Receiver::new(port, config.serial.frame_mode, config.serial.poll_interval);

    let link = Arc::new(TcpProbeLink::new(
        config.backend.address(),
        config.link.connect_timeout,
    ));
    log::info!("Waiting for backend at {}", config.backend.address());
    let initial = establish(&link, config.link.wait, config.link.poll).await;
    let supervisor = LinkSupervisor::spawn(link, initial, &config.link);

    let transport = Arc::new(HttpTransport::new(config.backend.request_timeout));
    let dispatcher = Dispatcher::new(
        config.endpoints.clone(),
        config.backend.clone(),
        transport,
        config.dispatch.max_in_flight,
        supervisor.handle(),
    );

    let station = Station::new(receiver, dispatcher, config.serial.receive_timeout);
    let stats = station
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            log::info!("Shutdown requested");
        })
        .await;

    supervisor.stop().await;

    log::info!(
        "Relayed {} records from {} frames since {} ({} rejected, {} timeouts, {} radio errors)",
        stats.records,
        stats.frames,
        stats.started_at,
        stats.rejected,
        stats.timeouts,
        stats.radio_errors
    );
    if let Some(last) = stats.last_record_at {
        log::info!("Last record received at {}", last);
    }

    ExitCode::SUCCESS
}

fn decode(line: &str, path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let record = match telemetry::decode(line) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Decode error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Frame is valid");
    println!("  canonical: {}", telemetry::encode(0, &record));
    for endpoint in &config.endpoints {
        match encode_body(endpoint, &record) {
            Ok(body) => println!(
                "  POST {} {}",
                config.backend.endpoint_url(&endpoint.name),
                body
            ),
            Err(e) => {
                eprintln!("Encode error for {}: {}", endpoint.name, e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn send(line: &str, path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let result = open_port(&config.serial).and_then(|port| {
        Receiver::new(port, config.serial.frame_mode, config.serial.poll_interval).send(line)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Send failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
