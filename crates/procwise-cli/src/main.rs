//! Interactive driver: a stdin REPL over `WorkflowEngine::handle_turn`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use procwise_catalog::ProcedureCatalog;
use procwise_engine::WorkflowEngine;
use procwise_store::{Language, SessionStore};

#[derive(Parser)]
#[command(
    name = "procwise",
    version,
    about = "Chat with the guided-procedure workflow engine"
)]
struct Args {
    /// Path to the procedure catalog file.
    #[arg(long, default_value = "config/procedures.json")]
    catalog: PathBuf,

    /// Session id to resume; a fresh one is generated when omitted.
    #[arg(long)]
    session: Option<String>,

    /// Initial content language ("en" or "fr").
    #[arg(long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let catalog = ProcedureCatalog::load_or_empty(&args.catalog);
    let store = Arc::new(SessionStore::new());
    let engine = WorkflowEngine::new(catalog, store);

    let session_id = args
        .session
        .unwrap_or_else(|| Uuid::now_v7().to_string());
    // Applied on the first turn only, so in-chat language switches stick.
    let mut initial_language = args.language.as_deref().map(Language::parse);

    info!(session_id = %session_id, "session ready");
    println!("procwise — session {session_id} (type 'quit' to exit)");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if utterance.eq_ignore_ascii_case("quit") || utterance.eq_ignore_ascii_case("exit") {
            break;
        }

        let result = engine
            .handle_turn(&session_id, utterance, initial_language.take())
            .await;

        println!("\n{}\n", result.message);
        if !result.suggestions.is_empty() {
            println!("[{}]", result.suggestions.join(" | "));
        }
    }

    Ok(())
}
