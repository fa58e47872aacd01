use anyhow::Context;
use taxi::domain::config::ApiConfig;
use taxi::kernel::config::load_config;
use taxi_logger::Logger;
use taxi_server::Server;

#[taxi_runtime::main(server)]
async fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let config_path = std::env::args().nth(1);
    let cfg: ApiConfig =
        load_config(config_path.as_deref()).context("Critical: Configuration is malformed")?;

    Server::builder().config(cfg).build().await?.run().await
}
