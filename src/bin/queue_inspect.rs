use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use room_xi_offline::application::ports::QueueStore;
use room_xi_offline::domain::entities::QueueEntry;
use room_xi_offline::domain::value_objects::QueueEntryId;
use room_xi_offline::infrastructure::database::ConnectionPool;
use room_xi_offline::infrastructure::offline::SqliteQueueStore;
use room_xi_offline::shared::{AppConfig, AppError};
use tracing::info;

#[derive(Parser)]
#[command(name = "queue_inspect")]
#[command(about = "Inspect the Room XI offline action queue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Queue database, overrides ROOM_XI_DATABASE_URL
    #[arg(long, env = "ROOM_XI_DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List queued entries without decrypting them
    List,
    /// Remove a single entry by id
    Discard {
        id: String,
    },
    /// Remove every queued entry
    Clear {
        /// Required to actually delete
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    room_xi_offline::init_logging();

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    let pool = ConnectionPool::from_config(&config.database)
        .await
        .with_context(|| format!("failed to open {}", config.database.url))?;
    pool.migrate().await.context("failed to migrate queue database")?;
    let store = SqliteQueueStore::new(pool.clone());

    let result = run(&store, cli.command, config.queue.max_retries).await;
    pool.close().await;
    result
}

async fn run(store: &SqliteQueueStore, command: Commands, max_retries: u32) -> Result<()> {
    match command {
        Commands::List => {
            let entries = store.get_all().await?;
            if entries.is_empty() {
                println!("queue is empty");
                return Ok(());
            }
            for entry in &entries {
                println!("{}", describe(entry, max_retries));
            }
            println!("{} entries", entries.len());
        }
        Commands::Discard { id } => {
            let id = QueueEntryId::new(id).map_err(|e| anyhow::anyhow!(e))?;
            if store.delete(&id).await? {
                info!(target: "offline::queue", entry_id = %id, "entry discarded");
                println!("discarded {id}");
            } else {
                return Err(AppError::NotFound(format!("queue entry {id}")).into());
            }
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear the queue without --yes");
            }
            let removed = store.clear().await?;
            println!("removed {removed} entries");
        }
    }
    Ok(())
}

fn describe(entry: &QueueEntry, max_retries: u32) -> String {
    let status = if entry.is_exhausted(max_retries) {
        "exhausted"
    } else {
        "pending"
    };
    format!(
        "{}\t{}\t{}/{}\t{}\t{}\t{}",
        entry.id,
        entry.action_type,
        entry.attempt_count,
        max_retries,
        status,
        entry.created_at.to_rfc3339(),
        entry.last_error.as_deref().unwrap_or("-"),
    )
}
