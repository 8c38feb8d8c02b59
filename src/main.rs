use std::fs::File;

use clap::Parser;
use color_dt::app::App;
use color_dt::config::{ChartConfig, Cli};
use color_dt::{log_info, util};
use ratatui_image::picker::Picker;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = ChartConfig::from_cli(&cli)?;

    std::fs::create_dir_all(&config.log_dir)?;
    util::log::init(&config.log_dir);
    // the terminal belongs to the chart, so tracing goes to a file too
    let trace_file = File::create(config.log_dir.join("trace.log"))?;
    tracing::subscriber::set_global_default(util::log::trace_subscriber(trace_file))?;
    log_info!("Starting with {:?}", config);

    // Query terminal for image protocol support BEFORE entering alternate screen
    let picker = Picker::from_query_stdio().ok();

    let terminal = ratatui::init();
    let result = match App::new(config, picker) {
        Ok(app) => app.run(terminal).await,
        Err(e) => Err(e),
    };
    ratatui::restore();
    result
}
