use std::sync::Arc;

mod config;
mod error;
mod git;
mod handler;
mod http;
mod logger;
mod server;

#[cfg(test)]
mod testutil;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let runner = git::GitLogRunner::from_config(&cfg.git);
    let command = git::CommandRunner::describe(&runner);
    let state = config::AppState::new(cfg, Arc::new(runner));
    let startup_config = state.config.clone();

    let running = server::Server::new(state).start()?;
    logger::log_server_start(&running.local_addr(), &startup_config, &command);

    server::signal::shutdown_signal().await?;
    running.stop().await;
    Ok(())
}
