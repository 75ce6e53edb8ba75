use demo_api::clock::SystemClock;
use demo_api::config::Config;
use demo_api::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Uptime is measured from here
    let clock = SystemClock::start();

    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Create the Tokio runtime, sizing workers from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers.filter(|w| *w > 0) {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    if let Err(e) = runtime.block_on(server::run(cfg, clock)) {
        logger::log_error(&format!("Server failed: {e}"));
        return Err(e.into());
    }
    Ok(())
}
