use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use painel::api::HttpBackend;
use painel::core::config::{self, PainelConfig};
use painel::core::session;
use painel::core::state::App;

#[derive(Parser)]
#[command(name = "painel", about = "Terminal admin panel for users and products")]
struct Args {
    /// Backend base URL (overrides the config file and PAINEL_API_URL)
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The logger is not up yet, so config problems go to stderr.
    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("{e}; using defaults");
        PainelConfig::default()
    });
    let resolved = config::resolve(&file_config, args.api_url.as_deref());
    for warning in &resolved.warnings {
        eprintln!("{warning}");
    }

    // File logger: the terminal belongs to the TUI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    for warning in &resolved.warnings {
        log::warn!("{warning}");
    }
    log::info!(
        "Painel starting up against {} (timeout {:?})",
        resolved.api_base_url,
        resolved.timeout
    );

    let backend = HttpBackend::new(
        &resolved.api_base_url,
        resolved.auth_base_url.as_deref(),
        resolved.timeout,
    )
    .map_err(std::io::Error::other)?;

    let app = App::new(Arc::new(backend), session::load_session());
    painel::tui::run(app)
}
