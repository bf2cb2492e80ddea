use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use greenlight::backend::{Dispatcher, TextBackend};
use greenlight::cohere::CohereBackend;
use greenlight::constants;
use greenlight::gemini::GeminiBackend;
use greenlight::groq::GroqBackend;
use greenlight::huggingface::HuggingFaceBackend;
use greenlight::ollama::OllamaBackend;
use greenlight::workflow::{self, StdinAnswers};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Where to write the JSON assessment report.
    #[arg(long, default_value = "project_assessment_output.json")]
    output: PathBuf,

    /// Industry for the project; when omitted it is asked interactively.
    #[arg(long)]
    industry: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Initialize tracing (logging) subscriber
    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,greenlight=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Hard startup precondition: the primary backend also drives the repair
    // pass, the analysis and the conclusion, so without its key there is no
    // meaningful run at all.
    if constants::GEMINI_API_KEY.is_empty() {
        bail!("GEMINI_API_KEY environment variable not set. Please set it to proceed.");
    }

    println!("AI-Powered Project Readiness Assessment");

    // The local server is probed once; if it is down or the model is missing
    // the adapter stays disabled for the whole run.
    let ollama = Arc::new(OllamaBackend::from_env().await);
    if !ollama.is_enabled() {
        info!("Continuing without the local Ollama backend.");
    }

    let gemini: Arc<dyn TextBackend> = Arc::new(GeminiBackend::from_env());
    let rest: Vec<Arc<dyn TextBackend>> = vec![
        Arc::new(HuggingFaceBackend::from_env()),
        Arc::new(GroqBackend::from_env()),
        Arc::new(CohereBackend::from_env()),
    ];
    let dispatcher = Dispatcher::new(ollama, gemini, rest);

    let mut answers = StdinAnswers;
    let state = workflow::run(&dispatcher, &mut answers, cli.industry).await?;

    info!("--- Full Project Data Collected ---");
    // The report is written even after a partially failed run; a write
    // failure is logged but does not change the exit status.
    if let Err(e) = state.save_report(&cli.output) {
        error!("Failed to save project data to JSON: {:?}", e);
    }

    println!("\nPrototype workflow complete.");
    Ok(())
}
