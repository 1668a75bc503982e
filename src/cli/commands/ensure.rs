//! Ensure command - validate the cache before a build

use crate::cache::{CacheManager, Verdict};
use crate::error::EwaResult;
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static REBUILD: Emoji<'_, '_> = Emoji("↻ ", "[REBUILT] ");

/// Execute the ensure command
pub async fn execute(manager: &CacheManager) -> EwaResult<()> {
    let verdict = manager.ensure().await?;
    let root = manager.context().root().display();

    match verdict {
        Verdict::Reused => {
            println!("{}Cache at {} is valid", CHECK, style(root).bold());
        }
        Verdict::Rebuilt(reasons) => {
            println!("{}Rebuilt cache at {}", REBUILD, style(root).bold());
            for reason in reasons {
                println!("  {} {}", style("•").yellow(), reason);
            }
        }
    }

    Ok(())
}
