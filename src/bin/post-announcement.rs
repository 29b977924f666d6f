//! Insert an announcement into the announcements table.
//!
//! Watching clients receive it through the insert trigger.
//!
//! Usage:
//!   DATABASE_URL=... ./post-announcement --by admin-1 "Maintenance tonight at 22:00"

use anyhow::{Context, Result};
use clap::Parser;
use uuid::Uuid;

use niamchat_ui::db;
use niamchat_ui::models::announcement::Announcement;

#[derive(Parser)]
#[command(name = "post-announcement", about = "Post an announcement to every niamchat user")]
struct Args {
    /// Identifier of the posting user
    #[arg(long, default_value = "admin")]
    by: String,

    /// Announcement text
    text: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    if args.text.trim().is_empty() {
        anyhow::bail!("announcement text is empty");
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL required")?;
    let pool = db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool).await?;

    let announcement = sqlx::query_as::<_, Announcement>(
        "INSERT INTO announcements (id, text, created_by, read_by)
         VALUES ($1, $2, $3, '{}')
         RETURNING id, text, timestamp, created_by, read_by",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(args.text.trim())
    .bind(&args.by)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Posted announcement {} by {}", announcement.id, announcement.created_by);
    println!("{}", announcement.id);
    Ok(())
}
