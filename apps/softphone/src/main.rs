use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use session_core::SessionController;
use shared::domain::{CallTarget, Credentials};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing::{debug, error};

mod config;
mod provider;

use config::{load_settings, Settings};
use provider::SimulatedSipProvider;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "softphone.toml")]
    config: String,
    /// Log at debug level instead of info.
    #[arg(long)]
    verbose: bool,
    /// Run without a signaling backend; every request is reported as
    /// unavailable.
    #[arg(long)]
    no_provider: bool,
    /// Print status updates as JSON lines instead of plain text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let settings = load_settings(&args.config);

    let controller = if args.no_provider {
        SessionController::without_provider()
    } else {
        SessionController::new(Arc::new(SimulatedSipProvider::new()))
    };

    if let Err(err) = controller.activate().await {
        error!(%err, "activation failed");
    }

    spawn_status_printer(controller.subscribe_status(), args.json);

    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "login" => run_login(&controller, &settings).await,
            "call" => run_call(&controller, argument, &settings).await,
            "hangup" => {
                if let Err(err) = controller.hangup().await {
                    debug!(%err, "hangup rejected");
                }
            }
            "status" => {
                let status = controller.status().await;
                println!(
                    "[{}] {} (registration: {:?}, call: {:?})",
                    status.kind,
                    status.message,
                    controller.registration_state().await,
                    controller.call_state().await,
                );
            }
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command: {other} (try `help`)"),
        }
    }

    controller.deactivate().await;
    Ok(())
}

async fn run_login(controller: &Arc<SessionController>, settings: &Settings) {
    let credentials = Credentials::new(
        settings.username.clone(),
        settings.domain.clone(),
        settings.password.clone(),
    );
    if let Err(err) = controller.login(credentials).await {
        debug!(%err, "login rejected");
    }
}

async fn run_call(controller: &Arc<SessionController>, argument: &str, settings: &Settings) {
    let callee = if argument.is_empty() {
        settings.callee.clone().unwrap_or_default()
    } else {
        argument.to_string()
    };
    match controller.place_call(CallTarget::new(callee)).await {
        Ok(call_id) => debug!(%call_id, "call accepted"),
        Err(err) => debug!(%err, "call rejected"),
    }
}

/// Mirrors every published status to stdout until the controller is dropped.
fn spawn_status_printer(mut status_rx: broadcast::Receiver<shared::status::SessionStatus>, json: bool) {
    tokio::spawn(async move {
        loop {
            match status_rx.recv().await {
                Ok(status) => {
                    if json {
                        match serde_json::to_string(&status) {
                            Ok(line) => println!("{line}"),
                            Err(err) => error!(%err, "status encode failed"),
                        }
                    } else {
                        println!("[{}] {}", status.kind, status.message);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "status stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn print_help() {
    println!("commands: login | call [number] | hangup | status | help | quit");
}
