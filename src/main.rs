mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::Path;

use anyhow::Result;
use app::SalesDashboardApp;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    // The startup dataset is required; only files opened later may fail softly.
    let mut state = AppState::default();
    state.open(Path::new(config::DEFAULT_DATA_FILE))?;

    eframe::run_native(
        config::APP_TITLE,
        config::native_options(),
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
