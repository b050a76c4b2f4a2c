#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use vendra_config::Config;
use vendra_conversation::{ChatService, FALLBACK_REPLY, InMemorySessionStore, TurnOutcome};
use vendra_providers::{GeminiProvider, QdrantRetriever};
use vendra_workflow::{Collaborators, TurnWorkflow};

#[derive(Parser)]
#[command(name = "vendra")]
#[command(about = "vendra shopping assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Session ID to resume (a fresh one is created if not provided)
        #[arg(short = 's', long)]
        session: Option<Uuid>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            session,
            model,
        } => {
            let config = Config::load()?;
            info!("Loaded config from ~/vendra/config.json");

            let service = build_service(config, model)?;
            let session_id = session.unwrap_or_else(Uuid::now_v7);

            let history = service.history(&session_id).await?;
            info!(
                "Session {session_id}: {} messages of prior history",
                history.len()
            );

            if let Some(msg) = message {
                match service.process_turn(Some(session_id), &msg).await {
                    Ok(outcome) => print_outcome(&outcome),
                    Err(e) => {
                        error!("turn failed: {e}");
                        eprintln!("{FALLBACK_REPLY}");
                    }
                }
            } else {
                run_interactive(&service, session_id).await?;
            }
        }
        Commands::Init => {
            Config::create_config()?;
        }
        Commands::Version => {
            println!("vendra {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn build_service(config: Config, model_override: Option<String>) -> anyhow::Result<ChatService> {
    let model = model_override.unwrap_or(config.agents.defaults.model);

    let mut provider = GeminiProvider::new(config.providers.gemini.api_key).with_model(model);
    if let Some(base_url) = config.providers.gemini.base_url {
        provider = provider.with_base_url(base_url);
    }
    let provider = Arc::new(provider);

    let qdrant = config.providers.qdrant;
    let product_retriever = Arc::new(QdrantRetriever::new(
        qdrant.url.clone(),
        qdrant.api_key.clone(),
        config.retrieval.product_collection,
        provider.clone(),
    ));
    let faq_retriever = Arc::new(QdrantRetriever::new(
        qdrant.url,
        qdrant.api_key,
        config.retrieval.faq_collection,
        provider.clone(),
    ));

    let workflow = TurnWorkflow::new(Collaborators {
        classifier: provider.clone(),
        product_retriever,
        faq_retriever,
        judge: provider.clone(),
        generator: provider,
    })?;

    Ok(ChatService::new(
        workflow,
        Arc::new(InMemorySessionStore::new()),
    ))
}

async fn run_interactive(service: &ChatService, session_id: Uuid) -> anyhow::Result<()> {
    println!("=== vendra session: {session_id} ===");
    println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input, "exit" | "quit" | "q") {
            break;
        }

        if input.is_empty() {
            continue;
        }

        match service.process_turn(Some(session_id), input).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => {
                error!("turn failed: {e}");
                eprintln!("{FALLBACK_REPLY}");
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &TurnOutcome) {
    println!("\n{}\n", outcome.reply);

    if !outcome.products.is_empty() {
        println!("Products:");
        for (i, product) in outcome.products.iter().enumerate() {
            let title = product
                .metadata_display("title")
                .unwrap_or_else(|| "N/A".to_string());
            let price = product
                .metadata_display("sale_price")
                .unwrap_or_else(|| "N/A".to_string());
            let currency = product.metadata_display("currency").unwrap_or_default();

            println!("  {}. {title} ({currency} {price})", i + 1);
        }
        println!();
    }
}
