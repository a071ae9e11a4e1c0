// CLI binary: exiting on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pocket_assist::device::sim::SimulatedDevice;
use pocket_assist::device::Capabilities;
use pocket_assist::registry::catalog;
use pocket_assist::response::CommandResponse;
use pocket_assist::settings::{self, EngineSettings};
use pocket_assist::state::AssistState;
use pocket_assist::{paths, Assistant, Engine, TurnOutcome};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "assist-cli", about = "Device assistant command engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config directory override (settings and command logs)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the directives in an assistant reply against the simulated device
    Run {
        /// Reply text, e.g. "On it. [volume(40) -> setting(wifi, on)]"
        text: String,
        /// Simulate a ringing phone before running
        #[arg(long)]
        ringing: bool,
    },
    /// List every command's usage line
    Usage,
    /// Show help for one command
    Help { command: String },
    /// Print the grammar advertisement sent to the remote model
    Prompt,
    /// Show effective settings
    Settings {
        /// Write the effective settings back to disk
        #[arg(long)]
        write: bool,
    },
    /// Print JSON schemas for settings and command responses
    Schema,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pocket_assist=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_assistant(config_dir: PathBuf, settings: EngineSettings, ringing: bool) -> Assistant {
    let device = Arc::new(SimulatedDevice::default());
    device.with_state_mut(|s| s.ringing = ringing);
    let state = AssistState::new(Capabilities::from_device(&device), settings, Some(config_dir));
    device.start_observer(&state);
    Assistant::new(Engine::new(state))
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config_dir = cli.config_dir.unwrap_or_else(paths::default_config_dir);
    let loaded = settings::load_settings(&config_dir);
    let raw = cli.json;

    match cli.command {
        Commands::Run { text, ringing } => {
            let assistant = build_assistant(config_dir, loaded, ringing);
            let outcome = assistant.handle_reply(&text).await;
            print_outcome(&outcome, raw);
            if outcome.responses.iter().any(|r| !r.is_success) {
                process::exit(2);
            }
        }
        Commands::Usage => {
            if raw {
                print_json(&catalog::command_catalog());
            } else {
                println!("{}", catalog::render_usage());
            }
        }
        Commands::Help { command } => {
            let assistant = build_assistant(config_dir, loaded, false);
            let response = assistant.engine().registry().help(&command);
            print_response(&response, raw);
            if !response.is_success {
                process::exit(1);
            }
        }
        Commands::Prompt => {
            let assistant = build_assistant(config_dir, loaded, false);
            println!("{}", assistant.system_prompt());
        }
        Commands::Settings { write } => {
            if write {
                if let Err(e) = settings::save_settings(&config_dir, &loaded) {
                    eprintln!("Error: failed to write settings: {e}");
                    process::exit(1);
                }
                eprintln!("Wrote {}", paths::settings_path(&config_dir).display());
            }
            print_json(&loaded);
        }
        Commands::Schema => {
            let schemas = serde_json::json!({
                "settings": schemars::schema_for!(EngineSettings),
                "command_response": schemars::schema_for!(CommandResponse),
            });
            print_json(&schemas);
        }
    }
}

// ── Output ───────────────────────────────────────────────────────

fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_response(response: &CommandResponse, raw_json: bool) {
    if raw_json {
        print_json(response);
        return;
    }
    let mark = if response.is_success { "ok" } else { "failed" };
    let delivery = match (response.send_response, response.get_response) {
        (false, _) => " (not forwarded)",
        (true, true) => " (needs new turn)",
        (true, false) => "",
    };
    println!("[{mark}] {}{delivery}", response.message);
}

fn print_outcome(outcome: &TurnOutcome, raw_json: bool) {
    if raw_json {
        print_json(outcome);
        return;
    }
    if !outcome.display_text.is_empty() {
        println!("{}", outcome.display_text);
    }
    if outcome.responses.is_empty() {
        eprintln!("No directives found.");
    }
    for response in &outcome.responses {
        print_response(response, false);
    }
}
