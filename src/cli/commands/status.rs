//! Status command - report cache validity without touching it

use crate::cache::{CacheManager, CacheStamp, Invalidation};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::error::EwaResult;
use crate::session::CacheContext;
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static STALE: Emoji<'_, '_> = Emoji("✗ ", "[STALE] ");

/// Execute the status command
pub async fn execute(args: StatusArgs, manager: &CacheManager) -> EwaResult<()> {
    let stamp = manager.stamp().await;
    let reasons = manager.inspect().await;

    match args.format {
        OutputFormat::Text => print_text(manager.context(), stamp.as_ref(), &reasons),
        OutputFormat::Json => print_json(manager.context(), stamp.as_ref(), &reasons)?,
    }

    Ok(())
}

fn print_text(ctx: &CacheContext, stamp: Option<&CacheStamp>, reasons: &[Invalidation]) {
    println!("{}", style("Cache Status").bold().cyan());
    println!();
    println!("  {:<10} {}", "path", ctx.root().display());
    println!("  {:<10} {}", "enabled", ctx.use_cache);
    println!("  {:<10} {}", "version", ctx.version);

    match stamp {
        Some(stamp) => {
            println!("  {:<10} {}", "hash", stamp.hash);
            println!("  {:<10} {}", "sealed by", stamp.version);
        }
        None => println!("  {:<10} {}", "stamp", style("none").dim()),
    }

    println!();
    if reasons.is_empty() {
        println!("{}{}", CHECK, style("valid, will be reused").green());
    } else {
        println!("{}{}", STALE, style("stale, will be rebuilt").yellow());
        for reason in reasons {
            println!("  {} {}", style("•").yellow(), reason);
        }
    }
}

fn print_json(
    ctx: &CacheContext,
    stamp: Option<&CacheStamp>,
    reasons: &[Invalidation],
) -> EwaResult<()> {
    let status = serde_json::json!({
        "path": ctx.root().display().to_string(),
        "enabled": ctx.use_cache,
        "version": ctx.version,
        "valid": reasons.is_empty(),
        "stamp": stamp,
        "reasons": reasons.iter().map(ToString::to_string).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
