use clap::Parser;
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::sync::Arc;

use garmin_sheets_sync::client::{GarminClient, SsoClient};
use garmin_sheets_sync::config::{
    Loaded, ServiceAccountKey, SyncConfig, DEFAULT_ACTIVITY_LIMIT, DEFAULT_CREDENTIALS_FILE,
};
use garmin_sheets_sync::sheets::{ServiceAccountAuth, SheetsClient};
use garmin_sheets_sync::sync::{ConsoleReporter, SyncEvent, SyncPipeline, SyncReporter};
use garmin_sheets_sync::Result;

#[derive(Parser)]
#[command(name = "garmin-sheets-sync")]
#[command(
    author,
    version,
    about = "Append recent Garmin runs, with their shoes, to a Google Sheet",
    long_about = None
)]
struct Cli {
    /// Number of most recent activities to consider
    #[arg(short, long, env = "SYNC_ACTIVITY_LIMIT", default_value_t = DEFAULT_ACTIVITY_LIMIT)]
    limit: u32,

    /// Worksheet title (defaults to the first worksheet)
    #[arg(short, long, env = "SHEET_TAB")]
    tab: Option<String>,

    /// Service-account key used when GOOGLE_CREDENTIALS is unset
    #[arg(long, env = "GOOGLE_CREDENTIALS_FILE", default_value = DEFAULT_CREDENTIALS_FILE)]
    credentials_file: PathBuf,
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    println!("Starting Garmin running activities sync...");

    let config = match SyncConfig::from_env(&cli.credentials_file) {
        Ok(Loaded::Ready(config)) => config,
        Ok(Loaded::Missing(presence)) => {
            println!("❌ Missing required environment variables");
            for (name, present) in presence.checklist() {
                println!("   {}: {}", name, if present { "✓" } else { "✗" });
            }
            return;
        }
        Err(e) => {
            println!("❌ Failed to read configuration: {}", e);
            return;
        }
    };

    let config = match config.with_activity_limit(cli.limit) {
        Ok(config) => config.with_sheet_tab(cli.tab),
        Err(e) => {
            println!("❌ {}", e);
            return;
        }
    };

    let reporter: Arc<dyn SyncReporter> = Arc::new(ConsoleReporter);
    if let Err((stage, e)) = run(config, reporter.clone()).await {
        reporter.report(SyncEvent::Aborted {
            stage,
            error: e.to_string(),
        });
    }
}

/// Each fatal failure is tagged with the stage it stopped
async fn run(
    config: SyncConfig,
    reporter: Arc<dyn SyncReporter>,
) -> std::result::Result<(), (&'static str, garmin_sheets_sync::SyncError)> {
    println!("Connecting to Garmin...");
    let garmin = connect_garmin(&config)
        .await
        .map_err(|e| ("connect to Garmin", e))?;
    reporter.report(SyncEvent::Connected { service: "Garmin" });

    println!("Connecting to Google Sheets...");
    let sheet = connect_sheets(&config)
        .await
        .map_err(|e| ("connect to Google Sheets", e))?;
    reporter.report(SyncEvent::Connected {
        service: "Google Sheets",
    });

    SyncPipeline::new(reporter)
        .with_limit(config.activity_limit)
        .run(&garmin, &sheet)
        .await
        .map_err(|e| ("sync activities", e))?;
    Ok(())
}

async fn connect_garmin(config: &SyncConfig) -> Result<GarminClient> {
    let mut sso = SsoClient::new(&config.domain)?;
    let token = sso
        .login(&config.garmin_email, config.garmin_password.expose_secret())
        .await?;
    GarminClient::new(&config.domain, token)
}

async fn connect_sheets(config: &SyncConfig) -> Result<SheetsClient> {
    let key = ServiceAccountKey::from_json(&config.google_credentials)?;
    let auth = ServiceAccountAuth::new(key)?;
    tracing::info!(account = auth.client_email(), "authenticating to Google Sheets");
    SheetsClient::connect(&auth, &config.sheet_id, config.sheet_tab.clone()).await
}
