//! CLI `reset` command — delete all stored data after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use crate::config::HavenConfig;

/// Delete all secrets and memories after user confirmation.
pub fn reset(config: &HavenConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("WARNING: This will permanently delete ALL secrets, memories, and embeddings.");
    println!("The vault salt is also cleared — previously derived keys become useless.");
    println!("Database: {}", db_path.display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let conn = crate::db::open_database(&db_path)?;

    conn.execute_batch(
        "DELETE FROM memories_vec;
         DELETE FROM memories;
         DELETE FROM secrets;
         DELETE FROM vault_meta;",
    )?;

    println!("All data deleted. Database reset complete.");
    Ok(())
}
