use std::env;

use aggregator_service::db::SyncMetadataRepository;
use sqlx::PgPool;

/// Operator tool for clearing a `sync_metadata` lock left `in_progress` by a
/// syncer that crashed mid-run.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage:");
        eprintln!("  outbox-reset-tool force-reset <DATABASE_URL>");
        std::process::exit(1);
    }

    let cmd = args[1].as_str();

    match cmd {
        "force-reset" if args.len() == 3 => {
            let db_url = &args[2];
            let pool = PgPool::connect(db_url).await?;
            let reset = SyncMetadataRepository::force_reset(&pool).await?;
            if reset == 0 {
                println!("No in-progress sync lock found; nothing to reset.");
            } else {
                println!("Reset {} in-progress sync lock row(s) to failed.", reset);
            }
        }
        _ => {
            eprintln!("Invalid arguments");
            std::process::exit(1);
        }
    }

    Ok(())
}
