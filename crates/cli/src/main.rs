use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use orchestrator::{
    shared_session, Agent, ConditionalAgent, InputGuard, LlmAgent, ModelBackend, SequentialAgent,
};
use toneflow_core::{Event, Session};

mod gemini;

use crate::gemini::GeminiBackend;

const APP_NAME: &str = "toneflow";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const NUMBER_KEY: &str = "current_number";
const MESSAGE_KEY: &str = "message";
const ROLL_COMMAND: &str = "roll";

#[derive(Parser)]
#[command(name = "toneflow", about = "Conversational workflow runtime", version)]
struct Cli {
    /// Message sent into the workflow as the user's input.
    #[arg(default_value = ROLL_COMMAND)]
    prompt: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, default_value = gemini::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = "demo-user")]
    user: String,

    #[arg(long, default_value = "demo-session")]
    session: String,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// The dice workflow: a guarded number generator, then a critic on odd
/// rolls or a fan on even ones.
fn build_workflow(backend: Arc<dyn ModelBackend>) -> SequentialAgent {
    let generator = LlmAgent::new(
        "NumberGenerator",
        "You are a dice. Return a number between 1 and 6.",
        NUMBER_KEY,
        backend.clone(),
    )
    .with_guard(InputGuard::new(
        ROLL_COMMAND,
        "To generate a number, enter: roll",
    ));

    let critic = LlmAgent::new(
        "Critic",
        "You are a critic. Return a one word negative response, the severity is determined by the input number {current_number}.",
        MESSAGE_KEY,
        backend.clone(),
    );

    let fan = LlmAgent::new(
        "Fan",
        "You are a fan. Return a one word positive response, the severity is determined by the input number {current_number}.",
        MESSAGE_KEY,
        backend,
    );

    let dice = ConditionalAgent::new("DiceTone", generator, critic, fan)
        .with_placeholder_sentinel(ROLL_COMMAND);
    SequentialAgent::new("root", vec![Arc::new(dice)])
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
    let backend: Arc<dyn ModelBackend> =
        Arc::new(GeminiBackend::new(api_key, cli.model, cli.base_url));
    let workflow = build_workflow(backend);

    let mut session = Session::new(APP_NAME, cli.user.as_str(), cli.session.as_str());
    session.append_event(Event::user(cli.user.as_str(), cli.prompt.as_str()));
    let session = shared_session(session);

    let mut events = workflow.run(session.clone()).await?;
    while let Some(event) = events.next().await {
        let event = event?;
        if let Some(text) = event.first_text() {
            println!("[{}] {text}", event.author);
        }
    }

    let session = session.lock().await;
    println!(
        "Rolled number: {} and the message is: {}",
        session.state.get(NUMBER_KEY).unwrap_or("<none>"),
        session.state.get(MESSAGE_KEY).unwrap_or("<none>"),
    );

    Ok(())
}
