use std::str::FromStr;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod client;
mod constants;
mod domain;
mod state;

#[cfg(test)]
mod test_utils;

use crate::client::{ConfiguredWallet, Gateway, WalletConnector, connect_or_install};
use crate::domain::{
    BlockSummary, ExplorerError, Network, QueryResult, TransactionRecord, format_time_ago,
    format_timestamp,
};
use crate::state::{AppConfig, Session, SessionMessage, SessionState};

// LazySol version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

const LOGO: &str = r"
 _                  ____        _
| |    __ _ _____ _/ ___|  ___ | |
| |   / _` |_  / | | \___ \ / _ \| |
| |__| (_| |/ /| |_| |___) | (_) | |
|_____\__,_/___|\__, |____/ \___/|_|
                |___/
";

/// LazySol - Terminal explorer for Solana clusters
#[derive(Parser)]
#[command(version = VERSION, about, long_about = None)]
struct Cli {
    /// Cluster to use (mainnet-beta, devnet, testnet)
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// Custom RPC endpoint for the selected cluster
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow recent blocks and transactions
    Watch {
        /// Exit after this many snapshots
        #[arg(short, long)]
        cycles: Option<usize>,
    },
    /// Look up a signature, address or slot
    Search {
        /// Transaction signature, account address or slot number
        query: String,
    },
    /// Show recent activity of a wallet
    Wallet {
        /// Wallet address (defaults to the configured one)
        #[arg(short, long)]
        address: Option<String>,
        /// Remember the address in the config file
        #[arg(long)]
        remember: bool,
    },
    /// List clusters and their endpoints
    Networks {
        /// Make this cluster the default (with --rpc-url, also store the endpoint)
        #[arg(long)]
        select: Option<Network>,
    },
    /// Display version with ASCII art
    Version,
}

/// Application entry point
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::load();
    let network = cli.network.unwrap_or(config.network);
    let endpoint = cli
        .rpc_url
        .clone()
        .unwrap_or_else(|| config.endpoint_for(network).to_string());

    match cli.command {
        Commands::Version => {
            println!("{LOGO}");
            println!("LazySol v{VERSION}");
            println!("A terminal explorer for Solana clusters");
        }
        Commands::Networks { select } => {
            if let Some(selected) = select {
                config.network = selected;
                if cli.rpc_url.is_some() {
                    config.set_endpoint(selected, cli.rpc_url);
                }
                config.save()?;
            }
            for candidate in Network::ALL {
                let marker = if candidate == config.network { "*" } else { " " };
                println!(
                    "{marker} {:<13} {:<8} {}",
                    candidate.as_str(),
                    candidate.display_name(),
                    config.endpoint_for(candidate)
                );
            }
        }
        Commands::Watch { cycles } => {
            let (session, messages) = open_session(network, &endpoint)?;
            watch(session, messages, cycles, &config).await;
        }
        Commands::Search { query } => {
            let (session, _messages) = open_session(network, &endpoint)?;
            print_result(session.search_now(&query).await);
        }
        Commands::Wallet { address, remember } => {
            let address = address.or_else(|| config.wallet_address.clone());
            let wallet = ConfiguredWallet::new(address.clone());
            let Some(address_value) = connect_or_install(&wallet)
                .await
                .map_err(ExplorerError::into_report)?
            else {
                println!("No wallet configured. Opened {}", wallet.install_url());
                return Ok(());
            };

            if remember {
                config.wallet_address = address;
                config.save()?;
            }

            let (session, _messages) = open_session(network, &endpoint)?;
            session.set_wallet(Some(address_value)).await;
            let state = session.view().await;
            if state.wallet_transactions.is_empty() {
                println!("No transactions found");
            }
            print_transactions(&state.wallet_transactions);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(
    network: Network,
    endpoint: &str,
) -> Result<(Session, mpsc::UnboundedReceiver<SessionMessage>)> {
    let gateway = Gateway::connect(network, endpoint).map_err(ExplorerError::into_report)?;
    Ok(Session::new(gateway))
}

/// A line typed on stdin while `watch` runs.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchCommand {
    /// Switch to another cluster.
    Switch(Network),
    /// Look up a signature, address or slot in the background.
    Search(String),
    /// Print the poller state.
    Status,
    /// Stop watching.
    Quit,
}

impl FromStr for WatchCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(query) = s.strip_prefix("search ") {
            return Ok(Self::Search(query.trim().to_string()));
        }
        match s {
            "status" => Ok(Self::Status),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => other.parse().map(Self::Switch).map_err(|_| {
                format!("unknown command '{other}' (type a cluster name, 'search <query>', 'status' or 'quit')")
            }),
        }
    }
}

/// Polls until Ctrl-C, `quit`, or until `cycles` snapshots were printed.
///
/// Typing a cluster name switches the session to it.
async fn watch(
    session: Session,
    mut messages: mpsc::UnboundedReceiver<SessionMessage>,
    cycles: Option<usize>,
    config: &AppConfig,
) {
    session.start_polling().await;
    eprintln!("Type a cluster name to switch, 'search <query>', 'status' or 'quit'");
    let mut commands = stdin_lines();
    let mut stdin_open = true;
    let mut printed = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = commands.recv(), if stdin_open => match line {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match line.parse::<WatchCommand>() {
                    Ok(WatchCommand::Quit) => break,
                    Ok(WatchCommand::Status) => print_status(&session).await,
                    Ok(WatchCommand::Search(query)) => session.search(query),
                    Ok(WatchCommand::Switch(network)) => {
                        if let Err(e) = session.connect(network, config.endpoint_for(network)).await {
                            eprintln!("Cannot switch to {network}: {e}");
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                },
                None => stdin_open = false,
            },
            message = messages.recv() => match message {
                Some(SessionMessage::SnapshotUpdated) => {
                    print_snapshot(&session.view().await);
                    printed += 1;
                    if cycles.is_some_and(|limit| printed >= limit) {
                        break;
                    }
                }
                Some(SessionMessage::CycleFailed { attempt }) => {
                    eprintln!("Refresh failed, retry {attempt} scheduled");
                }
                Some(SessionMessage::SearchCompleted(result)) => print_result(result),
                Some(SessionMessage::NetworkSwitched(network)) => {
                    println!("Switched to {}", network.display_name());
                }
                Some(_) => {}
                None => break,
            },
        }
    }

    session.shutdown();
}

/// Lines typed on stdin, read on their own thread so a pending read never
/// holds up runtime shutdown.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (lines, receiver) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if lines.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

async fn print_status(session: &Session) {
    let state = session.view().await;
    let phase = session
        .poller_phase()
        .map_or_else(|| "stopped".to_string(), |phase| phase.to_string());
    println!(
        "{} ({}) | poller {phase} | failed cycles {}",
        state.network.display_name(),
        state.gateway.endpoint(),
        state.retry_count
    );
}

fn print_snapshot(state: &SessionState) {
    let now = chrono::Utc::now().timestamp();
    let tps = state
        .snapshot
        .tps
        .map_or_else(|| "-".to_string(), |tps| tps.to_string());
    println!(
        "== {} ({}) | TPS {tps} ==",
        state.network.display_name(),
        state.gateway.endpoint()
    );

    println!("Recent blocks");
    for block in &state.snapshot.blocks {
        println!("  {}", block_line(block, now));
    }
    println!("Recent transactions");
    print_transactions(&state.snapshot.transactions);
}

fn block_line(block: &BlockSummary, now: i64) -> String {
    let age = block
        .timestamp
        .map_or_else(|| "-".to_string(), |ts| format_time_ago(ts, now));
    format!(
        "{:>12}  {:>4} txs  {:<9} {}",
        block.slot, block.transaction_count, age, block.leader
    )
}

fn print_result(result: QueryResult) {
    match result {
        QueryResult::NotFound => println!("No results found"),
        QueryResult::SingleTransaction(record) => print_details(&record),
        QueryResult::TransactionList(records) => print_transactions(&records),
    }
}

fn print_transactions(records: &[TransactionRecord]) {
    for record in records {
        println!("  {}", record.summary_line());
    }
}

fn print_details(record: &TransactionRecord) {
    println!("Signature:   {}", record.signature);
    println!("Slot:        {}", record.slot);
    println!("Time:        {}", format_timestamp(record.timestamp));
    println!("Type:        {}", record.classification);
    println!("Status:      {}", record.outcome);
    println!("Fee:         {} lamports", record.fee_paid);
    if let (Some(from), Some(to)) = (&record.transfer_from, &record.transfer_to) {
        println!("From:        {from}");
        println!("To:          {to}");
        println!(
            "Amount:      {} SOL",
            record.transfer_amount.as_deref().unwrap_or("?")
        );
    }
    println!("Instructions:");
    for (index, instruction) in record.raw_instructions.iter().enumerate() {
        println!("  #{index} {}", instruction.program_id());
    }
    if !record.program_logs.is_empty() {
        println!("Logs:");
        for line in &record.program_logs {
            println!("  {line}");
        }
    }
}
