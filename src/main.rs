//! Headless console: watch module rates, or read and change its config
//!
//! Run with: cargo run --features cli --bin modscope-cli -- watch

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use modscope::core::{FieldEdit, FieldValue, SyncState};
use modscope::poller::RepaintHook;
use modscope::time::now_millis;
use modscope::{Console, ConsoleSettings, ModuleClient};

type CliConsole = Console<ModuleClient>;

#[derive(Parser)]
#[command(name = "modscope-cli")]
#[command(about = "Live console for dispatcher and collector modules")]
struct Cli {
    /// Module control endpoint, e.g. http://127.0.0.1:8080/ (overrides MODSCOPE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Chart window in milliseconds
    #[arg(long)]
    window_ms: Option<u64>,

    /// Stats collection period in milliseconds
    #[arg(long)]
    sample_ms: Option<u64>,

    /// Redraw (report) period in milliseconds
    #[arg(long)]
    update_ms: Option<u64>,

    /// How long config commands wait for the module, in seconds
    #[arg(long, default_value = "10")]
    timeout_sec: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the latest rate of every series on each redraw tick (default)
    Watch,

    /// Read or change the module configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,

    /// Edit fields, apply, and print the configuration the module reports back
    Set {
        /// FIELD=VALUE pairs
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Make the module reload its configuration source, then print it
    Reload,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,modscope=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let cli = Cli::parse();
    let settings = ConsoleSettings::from_env().with_overrides(
        cli.url,
        cli.window_ms,
        cli.sample_ms,
        cli.update_ms,
    );

    let ticks = Arc::new(Notify::new());
    let notify = ticks.clone();
    let repaint: RepaintHook = Arc::new(move || notify.notify_one());

    info!(url = %settings.base_url, "Connecting to module");
    let client = ModuleClient::new(&settings.base_url);
    let mut console = Console::start(client, tokio::runtime::Handle::current(), settings, repaint);
    let timeout = Duration::from_secs(cli.timeout_sec);

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(&mut console, &ticks).await,
        Commands::Config { action } => {
            if !wait_until(&mut console, &ticks, timeout, config_ready).await {
                return Err("module did not deliver its configuration in time".into());
            }
            match action {
                ConfigAction::Show => {}
                ConfigAction::Set { assignments } => {
                    for assignment in &assignments {
                        let (field, edit) = parse_assignment(&console, assignment)?;
                        console.edit(&field, edit)?;
                    }
                    console.apply();
                    if !wait_until(&mut console, &ticks, timeout, config_ready).await {
                        return Err("module did not confirm the new configuration".into());
                    }
                }
                ConfigAction::Reload => {
                    console.reload();
                    if !wait_until(&mut console, &ticks, timeout, config_ready).await {
                        return Err("module did not confirm the reload".into());
                    }
                }
            }
            print_config(&console);
            Ok(())
        }
    }
}

/// Log the latest rates on every tick until Ctrl-C
async fn watch(console: &mut CliConsole, ticks: &Notify) -> Result<(), Box<dyn std::error::Error>> {
    info!("Watching, Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                return Ok(());
            }
            _ = ticks.notified() => {
                console.poll();
                let Some(chart) = console.chart(now_millis()) else {
                    continue;
                };
                let rates: Vec<String> = chart
                    .datasets
                    .iter()
                    .map(|d| match d.latest_rate() {
                        Some(rate) => format!("{}={:.0}", d.name, rate),
                        None => format!("{}=-", d.name),
                    })
                    .collect();
                info!(
                    variant = %console.variant(),
                    samples = chart.labels.len(),
                    rates = %rates.join(" "),
                    "stats"
                );
            }
        }
    }
}

fn config_ready(console: &CliConsole) -> bool {
    console
        .config()
        .is_some_and(|c| c.state() == SyncState::Ready && c.draft().is_some())
}

/// Pump completions until `done` holds or the timeout expires
async fn wait_until(
    console: &mut CliConsole,
    ticks: &Notify,
    timeout: Duration,
    done: fn(&CliConsole) -> bool,
) -> bool {
    let give_up = tokio::time::Instant::now() + timeout;
    loop {
        console.poll();
        if done(console) {
            return true;
        }
        if tokio::time::timeout_at(give_up, ticks.notified()).await.is_err() {
            warn!(variant = %console.variant(), "Timed out waiting for the module");
            return false;
        }
    }
}

/// Turn `FIELD=VALUE` into an edit matching the field's current kind
fn parse_assignment(
    console: &CliConsole,
    assignment: &str,
) -> Result<(String, FieldEdit), Box<dyn std::error::Error>> {
    let (field, value) = assignment
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got {assignment}"))?;
    let current = console
        .config()
        .and_then(|c| c.draft())
        .and_then(|d| d.get(field))
        .ok_or_else(|| format!("field {field} is not in the module configuration"))?;

    let edit = match current {
        FieldValue::Bool(_) => FieldEdit::Toggle(value.parse()?),
        FieldValue::Choice(_) => FieldEdit::Choose(value.to_string()),
        FieldValue::Text(_) | FieldValue::Number(_) => FieldEdit::Text(value.to_string()),
        FieldValue::Raw(_) => return Err(format!("field {field} is read-only").into()),
    };
    Ok((field.to_string(), edit))
}

fn print_config(console: &CliConsole) {
    let Some(config) = console.config() else {
        return;
    };
    println!("# {}", console.variant());
    let encodings = config.encodings();
    if !encodings.is_empty() {
        println!("# encodings: {}", encodings.join(", "));
    }
    for (name, value) in config.visible_fields() {
        println!("{name} = {}", value.display());
    }
}
