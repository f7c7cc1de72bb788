//! Database maintenance commands: migrate and health-check, the same two
//! operations a deploy pipeline runs before cutting traffic to a new
//! `firmante-server` instance.

use colored::*;
use firmante_db::Database;

pub async fn migrate(db: &Database) -> anyhow::Result<()> {
    println!("{}", "Running migrations...".bright_white());
    db.migrate().await?;
    println!("{}", "✓ Migrations complete".bright_green());
    Ok(())
}

pub async fn health_check(db: &Database) -> anyhow::Result<()> {
    let status = db.health_check().await?;
    println!("  PostgreSQL: {}", if status.postgres { "● up".bright_green() } else { "○ down".bright_red() });
    println!("  Redis:      {}", if status.redis { "● up".bright_green() } else { "○ down".bright_red() });
    if !status.healthy {
        anyhow::bail!("database is not healthy");
    }
    Ok(())
}
