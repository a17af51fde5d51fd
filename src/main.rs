use clap::Parser;
use infiwiki::Provider;
use infiwiki::core::config;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "infiwiki", about = "Explore an infinite, generated encyclopedia")]
struct Args {
    /// Generative backend to use
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Topic to open on startup (pushed onto the saved history)
    #[arg(short, long)]
    topic: Option<String>,

    /// Where the browsing history is stored
    #[arg(long)]
    history_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to infiwiki.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("infiwiki.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            log::error!("{e}");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()));
        }
    };

    let overrides = config::CliOverrides {
        provider: args.provider.as_ref().map(Provider::as_str),
        history_file: args.history_file,
    };
    let resolved = config::resolve(&file_config, &overrides);

    log::info!(
        "infiwiki starting up with provider: {} (text model: {}, art model: {})",
        resolved.provider.as_str(),
        resolved.generation.text_model,
        resolved.generation.art_model
    );

    infiwiki::tui::run(resolved, args.topic)
}
