//! Clear command - remove the cache directory

use crate::cache::CacheManager;
use crate::error::EwaResult;
use console::style;

/// Execute the clear command
pub async fn execute(manager: &CacheManager) -> EwaResult<()> {
    manager.clear().await?;
    println!(
        "{} Removed cache at {}",
        style("✓").green(),
        manager.context().root().display()
    );
    Ok(())
}
