//! Offline ingestion: push PDFs into the knowledge base without the HTTP server.
//!
//! ```bash
//! cargo run --bin ingest -- docs/manual.pdf docs/faq.pdf
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ai_llm_service::{LlmProfilesConfig, LlmServiceProfiles, telemetry};
use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rag_store::{LlmEmbedder, RagConfig, RagStore};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ingest", about = "Add PDF files to the knowledge base")]
struct Args {
    /// PDF files to ingest.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Override the target collection.
    #[arg(long, env = "QDRANT_COLLECTION")]
    collection: Option<String>,

    /// Keep going when a file fails.
    #[arg(long)]
    keep_going: bool,

    /// Debug logs for workspace crates.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(telemetry::env_filter("warn", args.verbose))
        .with(telemetry::layer())
        .try_init()?;

    let profiles = LlmProfilesConfig::from_env().context("LLM profiles")?;
    let mut rag_cfg = RagConfig::from_env().context("vector store config")?;
    if let Some(c) = args.collection {
        rag_cfg.collection = c;
    }

    let svc = Arc::new(LlmServiceProfiles::new(profiles, None)?);
    let embedder = Arc::new(LlmEmbedder::new(svc, rag_cfg.embedding_dim));
    let store = RagStore::new(rag_cfg, embedder)?;

    let pb = ProgressBar::new(args.paths.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut total = 0u64;
    let mut failed = 0usize;
    for path in &args.paths {
        let name = display_name(path);
        pb.set_message(name.clone());
        match store.ingest_pdf(path, &name).await {
            Ok(n) => {
                info!(file = %name, chunks = n, "ingested");
                total += n;
            }
            Err(e) if args.keep_going => {
                error!(file = %name, error = %e, "ingest failed, continuing");
                failed += 1;
            }
            Err(e) => {
                pb.abandon();
                return Err(e).with_context(|| format!("ingesting {}", path.display()));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    let stored = store.chunk_count().await?;
    println!(
        "{total} chunks added from {} file(s), {failed} failed; collection '{}' now holds {stored} chunks",
        args.paths.len() - failed,
        store.collection(),
    );
    Ok(())
}

/// File name used as the chunk source; falls back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
