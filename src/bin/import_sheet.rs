use std::path::PathBuf;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use bugspot_server::auth::{AuthConfig, JwtService};
use bugspot_server::import::{
    BatchReconciler, HttpSheetSource, ImportConfig, ImportPipeline, ImportResult,
};
use bugspot_server::store::PgEntityStore;

#[derive(Parser, Debug)]
#[command(
    name = "import_sheet",
    about = "Import bug-spotting problems from a spreadsheet CSV export"
)]
struct Args {
    /// Read the CSV from a local file instead of downloading the sheet.
    #[arg(long, conflicts_with = "sheet_id")]
    file: Option<PathBuf>,

    /// Spreadsheet to download; overrides BUGSPOT_SHEET_ID.
    #[arg(long)]
    sheet_id: Option<String>,

    /// Print an access token for this subject that may run imports, then exit.
    #[arg(long, value_name = "SUBJECT")]
    mint_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    if let Some(subject) = args.mint_token {
        let config = AuthConfig::from_env()?;
        let token = JwtService::from_config(&config)?.issue_access_token(
            &subject,
            &config.content_role,
            &[],
        )?;
        println!("{}", token.token);
        return Ok(());
    }

    let mut config = ImportConfig::from_env();
    if let Some(sheet_id) = args.sheet_id {
        config.sheet_id = Some(sheet_id);
    }

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;
    bugspot_server::db::run_migrations(&pool).await?;
    let store = PgEntityStore::new(pool);

    let outcome = match args.file {
        Some(path) => {
            let raw = std::fs::read(&path)?;
            log::info!("importing from {}", path.display());
            BatchReconciler::new(&store, config.error_limit)
                .reconcile_bytes(&raw)
                .await
        }
        None => {
            let source = HttpSheetSource::new(config.clone())?;
            // Whoever holds DATABASE_URL is already trusted with the content.
            let operator = |_: Option<&str>| true;
            ImportPipeline::new(&config, &store, &operator, &source)
                .run(None)
                .await
        }
    };

    let result = ImportResult::from(outcome);
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
