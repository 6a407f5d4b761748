//! The kelp binary.

use std::path::Path;

use eyre::bail;
use kelp_config::KelpConfig;
use tracing::info;

mod logging;
mod run;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let Some(config_path) = std::env::args().nth(1) else {
        bail!("must specify a config file on the command line: kelp <config.toml>");
    };

    let config = KelpConfig::from_file(Path::new(&config_path))?;

    logging::init_tracing(&config.server.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), config = %config_path, "starting kelp");
    logging::Logger::new().log(&config);

    run::run(config).await
}
