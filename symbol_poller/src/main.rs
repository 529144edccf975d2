// @file: symbol_poller/src/main.rs
// @description: Binary entry point: load config, wire the service, poll until Ctrl-C.
// @author: LAS.

use std::process::ExitCode;
use std::sync::Arc;
use log::{error, info};
use tokio_util::sync::CancellationToken;
use symbol_poller::api::batch_sink::LogSubscriber;
use symbol_poller::connectors::build_venue_client;
use symbol_poller::core::engine::PollingService;
use symbol_poller::utils::clock::SystemClock;
use symbol_poller::utils::config::AppConfig;
use symbol_poller::utils::logger::{init_logger, LogFacade};

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Environment & Configuration
    dotenv::dotenv().ok();
    let config: AppConfig = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    // 2. Logger
    init_logger(&config.log_level);
    info!(">>> {} is starting... <<<", config.service_name);

    // 3. Stop signal
    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stop requested");
            stop.cancel();
        }
    });

    // 4. Service
    let log = Arc::new(LogFacade::new(config.service_name.clone()));
    let mut service = PollingService::new(config, Arc::new(SystemClock), log.clone());
    service.sink().register_subscriber(Box::new(LogSubscriber::new(log))).await;

    match service.start(build_venue_client, cancel).await {
        Ok(()) => {
            info!(">>> Poller stopped <<<");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Poller could not start: {}", e);
            ExitCode::FAILURE
        }
    }
}
