use micro_web::config::Config;
use micro_web::routing::RouteRegistry;
use micro_web::{controllers, logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument names the config file (without extension)
    let cfg = match std::env::args().nth(1) {
        Some(config_path) => Config::load_from(&config_path)?,
        None => Config::load()?,
    };
    logger::init(&cfg.logging)?;

    // Build the Tokio runtime, sizing the worker pool from `server.workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = RouteRegistry::new();
    registry.mount(controllers::descriptors())?;

    server::run(cfg, registry, async {
        if let Err(e) = server::shutdown_signal().await {
            eprintln!("[ERROR] Failed to listen for shutdown signals: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await?;
    Ok(())
}
