//! Seal command - prune and stamp the cache after a build

use crate::cache::{CacheManager, SealOutcome};
use crate::cli::args::SealArgs;
use crate::error::EwaResult;
use crate::session::BuildSession;
use console::style;

/// Execute the seal command
pub async fn execute(args: SealArgs, manager: &CacheManager) -> EwaResult<()> {
    let mut session = BuildSession::new();
    session.extend(args.live);
    if let Some(path) = args.live_file {
        session.load_live_file(&path).await?;
    }

    match manager.seal(&session).await? {
        SealOutcome::Stamped { stamp, prune } => {
            println!(
                "{} Sealed cache ({} kept, {} removed)",
                style("✓").green(),
                prune.kept,
                prune.removed.len()
            );
            for (path, reason) in &prune.failed {
                println!(
                    "  {} could not remove {}: {}",
                    style("!").yellow(),
                    path.display(),
                    reason
                );
            }
            println!("  hash: {}", style(&stamp.hash).dim());
        }
        SealOutcome::Removed { clean: true } => {
            println!("{} Caching disabled, cache removed", style("✓").green());
        }
        SealOutcome::Removed { clean: false } => {
            println!(
                "{} Caching disabled, but the cache at {} could not be fully removed",
                style("!").yellow(),
                manager.context().root().display()
            );
        }
    }

    Ok(())
}
