use anyhow::Result;
use clap::Parser;
use combo_rush::config::CliConfig;
use combo_rush::{Config, GameInterface, VERSION};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "combo-rush")]
#[command(about = "A two-player local race to light up house combinations")]
#[command(version = VERSION)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Match to start directly
    #[arg(short = 'm', long = "match")]
    match_id: Option<String>,

    /// Fixed seed for combination selection
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory holding match files
    #[arg(long)]
    matches_dir: Option<PathBuf>,

    /// Color theme
    #[arg(short, long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::from_env()?,
    };

    let start_directly = cli.match_id.clone();
    config.merge_with_cli(CliConfig {
        matches_dir: cli.matches_dir,
        match_id: cli.match_id,
        seed: cli.seed,
        log_level: None,
        debug: cli.debug,
        theme: cli.theme,
    });
    config.validate()?;

    // Logs go to stderr so they do not tear the board on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(format!("combo_rush={},warn", config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Combo Rush v{}", VERSION);

    let mut game_interface = GameInterface::new(config).await?;

    if let Some(match_id) = start_directly {
        info!("Starting match: {}", match_id);
        if let Err(e) = game_interface.start_match(&match_id).await {
            error!("Failed to start match '{}': {}", match_id, e);
            eprintln!("Could not start match '{}': {}", match_id, e);
        }
    }

    if let Err(e) = game_interface.run().await {
        error!("Game error: {}", e);
        eprintln!("An error occurred: {}", e);
        std::process::exit(1);
    }

    info!("Game session ended");
    Ok(())
}
