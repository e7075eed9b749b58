use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    app::render_counter, load_settings, ActionDispatcher, ActionOutcome, CounterApp,
    CounterServices, Screen, SnapshotState,
};
use shared::{
    domain::{CounterAction, Network},
    error::{CounterError, ErrorReport},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "counter", about = "Create and drive a shared on-chain counter")]
struct Cli {
    /// Config file; defaults to ./counter.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    network: Option<Network>,
    #[arg(long, global = true)]
    rpc_url: Option<String>,
    #[arg(long, global = true)]
    wallet_url: Option<String>,
    /// Persisted location, e.g. `#0x…`. An invalid value means "no counter yet".
    #[arg(long, global = true, default_value = "")]
    location: String,
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Show,
    Create,
    Increment,
    Decrement,
    Reset,
    /// Line-driven session: c(reate), i(ncrement), d(ecrement), r(eset), s(how), q(uit).
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(network) = cli.network {
        settings.network = network;
    }
    if let Some(rpc_url) = &cli.rpc_url {
        settings.network_mut(settings.network).rpc_url = rpc_url.clone();
    }
    if let Some(wallet_url) = &cli.wallet_url {
        settings.wallet_url = Some(wallet_url.clone());
    }

    let services = CounterServices::connect(&settings)?;
    let mut app = CounterApp::new(
        services,
        settings.active().package_id.clone(),
        cli.location.clone(),
    );
    app.refresh_account().await;

    match cli.command {
        Command::Show => show(&app, cli.json).await,
        Command::Create => create(&mut app, cli.json).await,
        Command::Increment => act(&app, CounterAction::Increment, cli.json).await,
        Command::Decrement => act(&app, CounterAction::Decrement, cli.json).await,
        Command::Reset => act(&app, CounterAction::Reset, cli.json).await,
        Command::Interactive => interactive(&mut app).await,
    }
}

fn selected_counter(app: &CounterApp) -> Result<&ActionDispatcher> {
    app.dispatcher().map(|dispatcher| dispatcher.as_ref()).ok_or_else(|| {
        anyhow!("no counter selected; pass --location '#<object id>' or run `create`")
    })
}

fn fail(err: CounterError, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&ErrorReport::from(&err))?);
    }
    Err(err.into())
}

async fn show(app: &CounterApp, json: bool) -> Result<()> {
    let dispatcher = selected_counter(app)?;
    let state = dispatcher.snapshot().refetch().await;
    if !json {
        print!("{}", render_counter(dispatcher, app.account()));
        return Ok(());
    }
    match state.into_result() {
        Ok(snapshot) => {
            println!("{}", serde_json::to_string(&snapshot)?);
            Ok(())
        }
        Err(err) => fail(err, json),
    }
}

async fn create(app: &mut CounterApp, json: bool) -> Result<()> {
    match app.screen() {
        Screen::ConnectWallet => bail!("Please connect your wallet first."),
        Screen::Counter(object_id) => {
            warn!(%object_id, "location already names a counter; creating a new one anyway");
        }
        Screen::CreateCounter => {}
    }

    match app.create_counter().await {
        Ok(object_id) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "object_id": object_id, "location": app.location() })
                );
            } else {
                println!("Counter created successfully! ID: {object_id}");
                println!("location: {}", app.location());
            }
            Ok(())
        }
        Err(err) => fail(err, json),
    }
}

async fn act(app: &CounterApp, action: CounterAction, json: bool) -> Result<()> {
    let dispatcher = selected_counter(app)?;
    if app.account().is_none() {
        bail!("Please connect your wallet first.");
    }

    // Reset is only offered once the displayed counter shows the caller owns it.
    if action == CounterAction::Reset {
        dispatcher.snapshot().refetch().await;
        if !dispatcher.reset_visible(app.account()) {
            bail!("Reset is only available to the counter's owner.");
        }
    }

    match dispatcher.dispatch(action).await {
        ActionOutcome::Completed { digest, snapshot } => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "action": action,
                        "digest": digest,
                        "snapshot": snapshot.snapshot(),
                    })
                );
            } else {
                println!("{action} confirmed in {digest}");
                print!("{}", render_counter(dispatcher, app.account()));
            }
            Ok(())
        }
        ActionOutcome::Failed(err) => fail(err, json),
        ActionOutcome::Busy => bail!("another action is already in flight"),
    }
}

async fn interactive(app: &mut CounterApp) -> Result<()> {
    if let Some(dispatcher) = app.dispatcher() {
        dispatcher.snapshot().refetch().await;
    }
    print!("{}", app.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        let action = match command {
            "q" | "quit" => break,
            "c" | "create" => {
                if app.screen() == Screen::CreateCounter {
                    match app.create_counter().await {
                        Ok(object_id) => println!("Counter created successfully! ID: {object_id}"),
                        Err(err) => println!("{err}"),
                    }
                    if let Some(dispatcher) = app.dispatcher() {
                        dispatcher.snapshot().refetch().await;
                    }
                } else {
                    println!("create is only available before a counter is selected");
                }
                None
            }
            "i" | "increment" => Some(CounterAction::Increment),
            "d" | "decrement" => Some(CounterAction::Decrement),
            "r" | "reset" => Some(CounterAction::Reset),
            "s" | "show" => {
                app.refresh_account().await;
                if let Some(dispatcher) = app.dispatcher() {
                    dispatcher.snapshot().refetch().await;
                }
                None
            }
            "" => None,
            other => {
                println!("unknown command '{other}'");
                None
            }
        };

        if let Some(action) = action {
            run_interactive_action(app, action).await;
        }
        print!("{}", app.render());
    }
    Ok(())
}

async fn run_interactive_action(app: &CounterApp, action: CounterAction) {
    let Screen::Counter(_) = app.screen() else {
        println!("no counter selected");
        return;
    };
    let Some(dispatcher) = app.dispatcher() else {
        return;
    };
    let offered = dispatcher
        .buttons(app.account())
        .into_iter()
        .any(|button| button.action == action && button.enabled);
    if !offered {
        println!("{} is not available right now", action.idle_label());
        return;
    }

    println!("{}...", action.busy_label());
    match dispatcher.dispatch(action).await {
        ActionOutcome::Completed { digest, snapshot } => {
            if let SnapshotState::Ready(Some(snapshot)) = snapshot {
                println!("{action} confirmed in {digest}; count is now {}", snapshot.value);
            }
        }
        ActionOutcome::Failed(err) => println!("{err}"),
        ActionOutcome::Busy => println!("another action is already in flight"),
    }
}
