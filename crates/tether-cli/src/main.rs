//! Command-line front end for the git reference resolver.
//!
//! ```text
//! tether resolve zkochan/is-negative#semver:^2.0.0
//! tether resolve git+ssh://git@github.com/org/repo.git#v1.2.3 --retries 2
//! ```

use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tether_core::prelude::*;

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Resolve git dependency references to immutable commits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reference and print the result as JSON
    Resolve {
        /// The reference, e.g. owner/repo#branch or a git URL
        pref: String,
        /// Retry transient remote failures up to this many times
        #[arg(long)]
        retries: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Resolve { pref, retries } => run_resolve(&pref, retries),
    }
}

fn run_resolve(pref: &str, retries: Option<u32>) -> Result<()> {
    let resolver = GitResolver::new();
    let result = match retries {
        Some(limit) => retry(|| resolver.resolve_blocking(pref), limit).map_err(|err| match err {
            RetryError::Precondition(msg) => anyhow!(msg),
            RetryError::Permanent(err) => describe_failure(&resolver, err),
            RetryError::Exhausted { limit } => {
                anyhow!("all {limit} retries were exhausted resolving {pref}")
            }
        })?,
        None => resolver
            .resolve_blocking(pref)
            .map_err(|err| describe_failure(&resolver, err))?,
    };
    let Some(result) = result else {
        bail!("not a git reference: {pref}");
    };
    tracing::debug!(id = %result.id, "resolved");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Enriches a no-matching-tag failure with the tags that do exist.
fn describe_failure(resolver: &GitResolver, err: ResolveError) -> anyhow::Error {
    if let ResolveError::Unresolvable {
        repo,
        wanted,
        reason: NotFoundReason::NoMatchingTag,
    } = &err
        && let Ok(versions) = resolver.available_versions(repo)
        && !versions.is_empty()
    {
        return anyhow!(
            "could not resolve {wanted} to a commit of {repo}. Available versions are: {}",
            versions.join(", ")
        );
    }
    anyhow::Error::new(err)
}
