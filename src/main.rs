//! voxbot - a voice/text conversational assistant backend.
//!
//! Bridges speech-to-text, an LLM completion API, text-to-speech, a
//! vector-similarity memory store, and side-effecting tools (email,
//! calendar) behind a WebSocket gateway.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use voxbot::agent::turn::TurnController;
use voxbot::config::loader::{get_config_path, load_config, save_config};
use voxbot::config::schema::Config;
use voxbot::gateway::{self, AppState};
use voxbot::memory::VectorMemory;
use voxbot::providers::completion::OpenAiCompatClient;
use voxbot::providers::embeddings::OpenAiEmbedder;
use voxbot::providers::synthesis::ElevenLabsSynthesizer;
use voxbot::providers::transcription::WhisperTranscriber;
use voxbot::tools::calendar::HttpCalendarClient;
use voxbot::tools::email::SmtpMailer;
use voxbot::tools::registry::ToolRegistry;

const VERSION: &str = "0.1.0";

#[derive(Parser)]
#[command(name = "voxbot", about = "voxbot - Voice Assistant Backend", version = VERSION)]
struct Cli {
    /// Path to the config file (defaults to ~/.voxbot/config.json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP/WebSocket gateway.
    Serve,
    /// Send one prompt through the direct-completion path and print the reply.
    Chat {
        /// Message to send.
        #[arg(short, long)]
        message: String,
    },
    /// Write a default configuration file.
    Onboard,
}

/// Construct every service once and wire the turn controller.
fn build_state(cfg: &Config) -> AppState {
    let completion = Arc::new(OpenAiCompatClient::new(&cfg.completion));
    let embedder = Arc::new(OpenAiEmbedder::new(&cfg.embeddings));
    let synthesizer = Arc::new(ElevenLabsSynthesizer::new(&cfg.synthesis));
    let transcriber = Arc::new(WhisperTranscriber::new(&cfg.transcription));

    let memory = Arc::new(match cfg.memory.path {
        Some(ref path) => VectorMemory::with_persistence(path, cfg.memory.max_records),
        None => VectorMemory::new(cfg.memory.max_records),
    });

    let mailer = Arc::new(SmtpMailer::new(cfg.email.clone()));
    let calendar = Arc::new(HttpCalendarClient::new(cfg.calendar.clone()));
    let tools = Arc::new(ToolRegistry::new(mailer, calendar));

    let controller = Arc::new(TurnController::new(
        completion,
        embedder,
        synthesizer,
        memory,
        tools,
        cfg.memory.top_k,
    ));

    AppState {
        controller,
        transcriber,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Serve => {
            let state = build_state(&cfg);
            gateway::serve(state, &cfg.gateway.host, cfg.gateway.port).await?;
        }
        Commands::Chat { message } => {
            let state = build_state(&cfg);
            let reply = state.controller.direct_reply(&message).await?;
            println!("{}", reply);
        }
        Commands::Onboard => {
            let path = cli.config.clone().unwrap_or_else(get_config_path);
            save_config(&Config::default(), Some(&path));
            info!("Wrote default config to {}", path.display());
            println!("Config written to {}", path.display());
        }
    }

    Ok(())
}
