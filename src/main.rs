//! `softphone` - interactive console over the session controller
//!
//! Runs the loopback signaling backend so the whole surface works without
//! a SIP server: `connect`, `register`, `call`, and `ring` to simulate an
//! inbound call.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use softphone_console::config::ConnectionConfig;
use softphone_console::console::{help_text, render_log, render_status, Command, CommandGates, SetField};
use softphone_console::controller::SessionController;
use softphone_console::signaling::loopback::LoopbackSignalingFactory;

#[derive(Debug, Parser)]
#[command(name = "softphone", about = "Operator console for a WebRTC-to-SIP signaling client")]
struct Args {
    /// JSON file with the connection config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Signaling endpoint URL (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// SIP user (overrides the config file)
    #[arg(long)]
    user: Option<String>,

    /// Credential secret (overrides the config file)
    #[arg(long)]
    secret: Option<String>,

    /// Default outbound call target (overrides the config file)
    #[arg(long)]
    target: Option<String>,

    /// Tracing filter, e.g. `debug` or `softphone_console=debug`
    #[arg(long, default_value = "warn", env = "SOFTPHONE_LOG")]
    log_level: String,
}

fn load_config(args: &Args) -> anyhow::Result<ConnectionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => ConnectionConfig::default(),
    };
    if let Some(url) = &args.url {
        config.endpoint_url = url.clone();
    }
    if let Some(user) = &args.user {
        config.user = user.clone();
    }
    if let Some(secret) = &args.secret {
        config.secret = secret.clone();
    }
    if let Some(target) = &args.target {
        config.call_target = target.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .init();

    let config = load_config(&args)?;
    let factory = LoopbackSignalingFactory::new();
    let controller = SessionController::new(factory.clone(), config);

    // Redraw the status line whenever a signaling event lands
    let mut states = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(state) = states.recv().await {
            println!("\n  {}", render_status(state));
        }
    });

    println!("softphone console (loopback backend)");
    println!("{}", help_text());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("softphone> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        let gates = CommandGates::for_state(controller.state().await);
        if !gates.allows(&command) {
            println!("`{}` is not available right now", line.trim());
            continue;
        }

        if !run(&command, &controller, &factory).await {
            break;
        }
    }

    Ok(())
}

/// Execute one gated command; returns false on `quit`.
async fn run(
    command: &Command,
    controller: &Arc<SessionController<LoopbackSignalingFactory>>,
    factory: &LoopbackSignalingFactory,
) -> bool {
    match command {
        Command::Connect => controller.connect().await,
        Command::Disconnect => controller.disconnect().await,
        Command::Register => controller.register().await,
        Command::Call(target) => {
            let target = match target {
                Some(t) => t.clone(),
                None => controller.config().await.call_target,
            };
            if target.is_empty() {
                println!("no call target configured, use `call <target>` or `set target <value>`");
            } else {
                controller.call(&target).await;
            }
        }
        Command::Answer => controller.answer().await,
        Command::Hangup => controller.hangup().await,
        Command::Set(field, value) => {
            let result = match field {
                SetField::Url => controller.set_endpoint_url(value.clone()).await,
                SetField::User => controller.set_user(value.clone()).await,
                SetField::Secret => controller.set_secret(value.clone()).await,
                SetField::Target => {
                    controller.set_call_target(value.clone()).await;
                    Ok(())
                }
            };
            if let Err(e) = result {
                println!("{e}");
            }
        }
        Command::Status => println!("{}", render_status(controller.state().await)),
        Command::Log => print!("{}", render_log(&controller.log().entries())),
        Command::LogJson => match serde_json::to_string_pretty(&controller.log().entries()) {
            Ok(json) => println!("{json}"),
            Err(e) => println!("log serialization failed: {e}"),
        },
        Command::Ring => match factory.last_client() {
            Some(client) => client.ring(Some("sip:100@loopback".into())),
            None => println!("no signaling client, `connect` first"),
        },
        Command::Help => println!("{}", help_text()),
        Command::Quit => return false,
    }
    true
}
