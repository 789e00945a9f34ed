//! `steve` entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** from flags with environment fallbacks.
//! 2. **Wire observability**: `tracing-subscriber` with a pretty or JSON
//!    layer, plus an OpenTelemetry OTLP exporter when an endpoint is given.
//! 3. **Construct collaborators**: offline forges over a configuration
//!    directory and a packaging API that records what it is asked to do.
//! 4. **Replay events**: read newline-delimited JSON events from a file or
//!    stdin and feed them through the [`jobs::Dispatcher`].
//!
//! The configuration directory holds one subdirectory per forge:
//!
//! ```text
//! <config-dir>/upstream/<namespace>/<repo>.json
//! <config-dir>/downstream/<namespace>/<repo>.json
//! <config-dir>/downstream/<namespace>/<repo>/<specfile>
//! ```

mod offline;
mod telemetry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use jobs::config::DEFAULT_UPSTREAM_BRANCH;
use jobs::{Dispatcher, ForgeKind, GitForge, HandlerRegistry, LazyForge, ServiceConfig};
use listener::JsonLinesSource;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

use crate::offline::{LocalForge, RecordingPackagingApi};
use crate::telemetry::LogFormat;

/// Replays packaging events through the job dispatcher.
#[derive(Debug, Parser)]
#[command(name = "steve", version, about)]
struct Cli {
    /// File with one JSON event per line. Reads stdin when omitted.
    #[arg(long, short)]
    events: Option<PathBuf>,

    /// Directory holding `upstream/` and `downstream/` package configurations.
    #[arg(long, env = "STEVE_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,

    /// Upstream branch that downstream commits are synced into.
    #[arg(
        long,
        env = "STEVE_UPSTREAM_BRANCH",
        default_value = DEFAULT_UPSTREAM_BRANCH
    )]
    upstream_branch: String,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// OTLP collector endpoint; traces are only exported when set.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.log_format, cli.otlp_endpoint.as_deref())?;
    let result = run(cli).await;
    telemetry.shutdown();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let dispatcher = build_dispatcher(&cli)?;

    let summary = match &cli.events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open '{}'", path.display()))?;
            replay(BufReader::new(file), &dispatcher).await?
        }
        None => replay(BufReader::new(tokio::io::stdin()), &dispatcher).await?,
    };

    if summary.failed > 0 {
        bail!(
            "{} of {} events failed to process",
            summary.failed,
            summary.processed
        );
    }
    Ok(())
}

fn build_dispatcher(cli: &Cli) -> anyhow::Result<Dispatcher> {
    let registry = HandlerRegistry::with_default_handlers()?;
    info!(
        handlers = registry.len(),
        topics = ?registry.topics().collect::<Vec<_>>(),
        "Handler registry ready"
    );

    let config = ServiceConfig {
        upstream_branch: cli.upstream_branch.clone(),
    };

    Ok(Dispatcher::new(
        config,
        Arc::new(registry),
        local_forge(ForgeKind::Upstream, &cli.config_dir),
        local_forge(ForgeKind::Downstream, &cli.config_dir),
        Arc::new(RecordingPackagingApi::new(
            cli.config_dir.join(ForgeKind::Downstream.to_string()),
        )),
    ))
}

/// Defers opening `<config_dir>/<kind>` until the first event needs it.
fn local_forge(kind: ForgeKind, config_dir: &Path) -> LazyForge {
    let root = config_dir.join(kind.to_string());
    LazyForge::new(move || {
        LocalForge::connect(kind, root.clone()).map(|forge| Arc::new(forge) as Arc<dyn GitForge>)
    })
}

async fn replay<R>(reader: R, dispatcher: &Dispatcher) -> anyhow::Result<listener::RunSummary>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut source = JsonLinesSource::new(reader);
    let summary = listener::run(&mut source, dispatcher).await?;
    Ok(summary)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
