use anyhow::Result;

use crate::config::HavenConfig;

/// Display store statistics in the terminal.
pub fn stats(config: &HavenConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let response = crate::memory::stats::store_stats(&conn, Some(&db_path))?;

    println!("Haven Statistics");
    println!("{}", "=".repeat(40));
    println!("  Memories:            {}", response.total_memories);
    println!("  Indexed vectors:     {}", response.indexed_vectors);
    println!("  Secrets:             {}", response.total_secrets);
    println!("  Database size:       {} bytes", response.db_size_bytes);

    if let Some(oldest) = response.oldest_memory {
        println!("  Oldest memory:       {oldest}");
    }
    if let Some(newest) = response.newest_memory {
        println!("  Newest memory:       {newest}");
    }

    Ok(())
}
