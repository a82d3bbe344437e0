use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use approval_gateway::api::{self, AppState};
use approval_gateway::config::{self, Config};
use approval_gateway::llm::classifier::{LlmReplyClassifier, ReplyClassifier};
use approval_gateway::llm::extractor::LlmDetailExtractor;
use approval_gateway::llm::ChatClient;
use approval_gateway::workflow::Orchestrator;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "approval_gateway=debug,approvald=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::Classify { reply, context }) => {
            let chat = ChatClient::new(cfg.azure.clone(), cfg.llm_timeout_secs)?;
            let classifier = LlmReplyClassifier::new(chat);
            let label = classifier
                .classify(context.as_deref().unwrap_or(""), &reply)
                .await;
            println!("{label:?}");
            Ok(())
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn build_orchestrator(cfg: &Config) -> anyhow::Result<Orchestrator> {
    let chat = ChatClient::new(cfg.azure.clone(), cfg.llm_timeout_secs)?;
    Ok(Orchestrator::new(
        Arc::new(LlmReplyClassifier::new(chat.clone())),
        Arc::new(LlmDetailExtractor::new(chat)),
    ))
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    let engine = build_orchestrator(&cfg)?;
    let state = Arc::new(AppState {
        engine,
        config: cfg,
    });
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("approval gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
