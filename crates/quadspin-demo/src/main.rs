mod square;

use anyhow::Result;
use quadspin_engine::device::GpuInit;
use quadspin_engine::logging::{init_logging, LoggingConfig};
use quadspin_engine::session::SessionConfig;
use quadspin_engine::window::{Runtime, RuntimeConfig};

use square::SquareApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    log::info!("tap or click the window to pause / resume");

    Runtime::run(
        RuntimeConfig::default(),
        GpuInit::default(),
        SquareApp::new(SessionConfig::default()),
    )
}
