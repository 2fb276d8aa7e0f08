use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ControllerEvent, GenerationService, HttpGenerationClient, LogoRequestController,
    RequestStatus, SubmitError,
};
use shared::domain::{style_by_id, style_by_key, StyleDescriptor, StyleId, LOGO_STYLES};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Generate AI logos against a logo generation service")]
struct Args {
    /// Overrides the configured generation service URL.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available logo styles.
    Styles,
    /// Print a prompt suggested by the service.
    Surprise,
    /// Create a logo and print the result as JSON.
    Create {
        #[arg(long)]
        prompt: Option<String>,
        /// Style key or numeric id.
        #[arg(long, default_value = "no-style")]
        style: String,
        /// Ask the service for a prompt instead of passing one.
        #[arg(long)]
        surprise: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.server_url {
        settings.base_url = url;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }

    if let Command::Styles = args.command {
        for style in LOGO_STYLES {
            println!("{:>2}  {:<10} {}", style.id.0, style.key, style.label);
        }
        return Ok(());
    }

    let client = HttpGenerationClient::new(&settings.client_config())
        .context("failed to configure generation client")?;
    debug!(base_url = %client.base_url(), "generation client ready");
    let service: Arc<dyn GenerationService> = Arc::new(client);
    let controller = LogoRequestController::new(service, settings.controller_options())?;

    match args.command {
        Command::Styles => Ok(()),
        Command::Surprise => {
            let prompt = fetch_surprise(&controller).await?;
            println!("{prompt}");
            Ok(())
        }
        Command::Create {
            prompt,
            style,
            surprise,
        } => create(controller, prompt, &style, surprise).await,
    }
}

async fn fetch_surprise(controller: &LogoRequestController) -> Result<String> {
    controller.surprise().await?;
    let prompt = controller.snapshot().prompt_text;
    if prompt.trim().is_empty() {
        return Err(anyhow!("the service did not suggest a prompt"));
    }
    Ok(prompt)
}

async fn create(
    controller: LogoRequestController,
    prompt: Option<String>,
    style: &str,
    surprise: bool,
) -> Result<()> {
    let style = resolve_style(style)?;
    controller.select_style(style.id);

    match prompt {
        Some(prompt) if !surprise => controller.set_prompt_text(&prompt),
        _ => {
            let prompt = fetch_surprise(&controller).await?;
            eprintln!("Prompt: {prompt}");
        }
    }

    let render = spawn_toast_renderer(&controller);
    let handle = match controller.submit_current() {
        Ok(handle) => handle,
        Err(SubmitError::EmptyPrompt) => {
            let message = controller.snapshot().error.unwrap_or_default();
            return Err(anyhow!(message));
        }
        Err(err) => return Err(err.into()),
    };
    handle.await?;

    let outcome = match controller.on_toast_activate() {
        Some(intent) => {
            println!("{}", serde_json::to_string_pretty(&intent)?);
            Ok(())
        }
        None => Err(anyhow!(controller
            .snapshot()
            .error
            .unwrap_or_else(|| "logo was not created".to_string()))),
    };

    drop(controller);
    let _ = render.await;
    outcome
}

/// Prints the toast each time the request status changes; ends with the controller.
fn spawn_toast_renderer(controller: &LogoRequestController) -> tokio::task::JoinHandle<()> {
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        let mut last_status = RequestStatus::Idle;
        while let Ok(ControllerEvent::StateChanged(state)) = events.recv().await {
            if state.status == last_status {
                continue;
            }
            last_status = state.status;
            if let Some(toast) = state.toast() {
                eprintln!("{} {}", toast.headline, toast.subtext);
            }
        }
    })
}

fn resolve_style(raw: &str) -> Result<&'static StyleDescriptor> {
    let by_id = raw.trim().parse::<u32>().ok().map(StyleId).and_then(style_by_id);
    by_id
        .or_else(|| style_by_key(raw))
        .ok_or_else(|| anyhow!("unknown style '{raw}'; run `logo_cli styles` to list them"))
}
