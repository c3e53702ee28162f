//! FlowGPT client — submits one analysis request and renders its progress stream.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flowgpt_api::analysis::{AnalysisKind, AnalysisRequestBody, AnalysisRequestData};
use flowgpt_api::client::{FlowClient, PollState};

#[derive(Parser)]
#[command(name = "flowgpt-client", version, about = "Run a FlowGPT analysis against a running API")]
struct Cli {
    /// Base URL of the FlowGPT API.
    #[arg(long, env = "FLOWGPT_URL", default_value = "http://localhost:8080")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review a resume against a target position.
    Resume(ContentArgs),
    /// Research a company for a target position.
    Company {
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: String,
        /// Optional notes to include with the research request.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Generate a mock interview and readiness assessment.
    MockInterview(ContentArgs),
}

#[derive(Args)]
struct ContentArgs {
    #[arg(long)]
    position: String,
    /// Inline text (resume or background).
    #[arg(long, conflicts_with = "file")]
    content: Option<String>,
    /// Read the text from a file instead.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl ContentArgs {
    fn read(self) -> Result<(String, String)> {
        let content = match (self.content, self.file) {
            (Some(text), _) => text,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => String::new(),
        };
        Ok((content, self.position))
    }
}

fn build_body(command: Command) -> Result<AnalysisRequestBody> {
    let (kind, data) = match command {
        Command::Resume(args) => {
            let (content, position) = args.read()?;
            (
                AnalysisKind::Resume,
                AnalysisRequestData {
                    content: Some(content),
                    position: Some(position),
                    company: None,
                },
            )
        }
        Command::Company {
            company,
            position,
            notes,
        } => (
            AnalysisKind::Company,
            AnalysisRequestData {
                content: notes,
                position: Some(position),
                company: Some(company),
            },
        ),
        Command::MockInterview(args) => {
            let (content, position) = args.read()?;
            (
                AnalysisKind::MockInterview,
                AnalysisRequestData {
                    content: Some(content),
                    position: Some(position),
                    company: None,
                },
            )
        }
    };

    Ok(AnalysisRequestBody {
        kind: Some(kind.as_str().to_string()),
        data: Some(data),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let body = build_body(cli.command)?;
    let client = FlowClient::new(&cli.server);

    let result = client
        .analyze(&body, |event, state| {
            if let PollState::InProgress { progress, message } = state {
                println!("[{progress:>3}%] {message}");
            }
            if let (false, Some(extra)) = (event.is_terminal(), &event.result) {
                match serde_json::to_string_pretty(extra) {
                    Ok(text) => println!("{text}"),
                    Err(e) => eprintln!("Could not render interim result: {e}"),
                }
            }
        })
        .await
        .context("Analysis did not complete")?;

    println!("[100%] Analysis complete");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
