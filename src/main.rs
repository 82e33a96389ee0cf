use clap::Parser;
use drivesort::auth::TokenStore;
use drivesort::config::Config;
use drivesort::drive::{DriveClient, HttpDriveApi, RetryPolicy};
use drivesort::sheet::Sheet;
use drivesort::{logging, organizer, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "drivesort")]
#[command(about = "Spreadsheet-driven photo organization for Google Drive", long_about = None)]
struct Cli {
    /// Spreadsheet driving the run (prompted for when omitted)
    spreadsheet: Option<PathBuf>,

    /// JSON config file overriding the built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("drivesort failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let _log_guards = logging::init(&config.log_dir, &config.log_level)?;

    let path = match cli.spreadsheet {
        Some(path) => path,
        None => prompt_for_path()?,
    };
    let mut sheet = Sheet::read(&path)?;
    if sheet.is_empty() {
        info!("'{}' has no rows; nothing to organize", path.display());
        return Ok(());
    }
    info!("loaded {} rows from '{}'", sheet.len(), path.display());

    let http = reqwest::Client::new();
    let mut tokens = TokenStore::load(&config.token_file, &config.token_endpoint)?;
    let access_token = tokens.access_token(&http).await?;
    info!("authenticated against the Drive API");

    let api = HttpDriveApi::new(http, &config.api_base, access_token)?;
    let client = DriveClient::new(api, RetryPolicy::new(config.retry_delays()));

    let report = organizer::organize(&client, &mut sheet).await?;
    sheet.write(&path)?;
    info!("run finished: {}", report);
    println!("{}", report);

    Ok(())
}

fn prompt_for_path() -> Result<PathBuf> {
    print!("Spreadsheet path: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}
