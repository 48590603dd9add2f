#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

use conductor_ai_workers::{
    config::Settings,
    queue::ConductorClient,
    schedule::{create_scheduler, default_processors},
    services::ServiceClients,
    utils::{http::build_client, logger},
    AppContext, LOG_DIR, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    conductor_ai_workers::init_env();
    let _guard = logger::init(LOG_DIR.clone())?;

    info!("Starting conductor AI workers ({})", VERSION);

    let settings = Settings::from_env().context("Invalid configuration")?;
    info!("Loaded settings: {:?}", settings);

    let client = build_client(settings.http_timeout).context("Failed to build HTTP client")?;

    info!("Initializing service clients...");
    let clients = ServiceClients::from_settings(&settings, &client);

    let queue = Arc::new(ConductorClient::new(
        client.clone(),
        settings.conductor.server_url.clone(),
        settings.conductor.auth_token.clone(),
    ));

    info!("Initializing Scheduler as {}...", settings.conductor.worker_id);
    let scheduler = Arc::new(create_scheduler(
        queue,
        default_processors(&clients),
        &settings.conductor,
    ));
    scheduler.spawn_all().await;

    let (stop_server, server_shutdown) = watch::channel(false);
    let server = settings.http_addr.map(|addr| {
        let ctx = Arc::new(AppContext {
            task_manager: scheduler.task_manager(),
            worker_id: settings.conductor.worker_id.clone(),
        });
        tokio::spawn(conductor_ai_workers::web::start_server(ctx, addr, server_shutdown))
    });

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Shutting down...");

    scheduler.shutdown();
    let _ = stop_server.send(true);

    if let Err(e) = scheduler.run().await {
        error!("Scheduler error: {}", e);
    }
    if let Some(server) = server {
        match server.await {
            Ok(Ok(())) => info!("Server stopped gracefully"),
            Ok(Err(e)) => error!("Server error: {}", e),
            Err(e) => error!("Server task failed: {}", e),
        }
    }

    Ok(())
}
