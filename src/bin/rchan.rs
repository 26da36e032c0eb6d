//! rchan – push lines into, or pull lines out of, a capped Redis list
//! through a bridge configured by `rchan.toml`.
//
//  $ rchan send "hello" "world"
//  $ printf 'a\nb\n' | rchan send
//  $ rchan recv --count 2
//  $ rchan len
use rchan::logging::init_logging;
use rchan::{load_config, metrics, Bridge, BridgeConfig, Config, ListStore, MemoryStore, RedisStore};

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "rchan", version, about = "Bridge stdin/stdout and a capped Redis list")]
struct Cli {
    /// Path to config TOML (env RCHAN_CONFIG overrides)
    #[arg(short, long, default_value = "rchan.toml")]
    config: String,

    /// List key, overriding `bridge.key`
    #[arg(short, long)]
    key: Option<String>,

    /// Run against an in-process store instead of Redis
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send messages (stdin lines when none are given).
    Send {
        messages: Vec<String>,
    },
    /// Print received messages, one per line.
    Recv {
        /// Stop after this many messages
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Stop after this long without a message
        #[arg(short, long, default_value_t = 1000)]
        timeout_ms: u64,
    },
    /// Print the remote list length.
    Len,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let cfg_path: String = std::env::var("RCHAN_CONFIG").unwrap_or(cli.config);
    let cfg: Config = load_config(&cfg_path)?;
    let mut bridge = cfg.bridge;
    if let Some(key) = cli.key {
        bridge.key = key;
        bridge.validate()?;
    }

    if cli.memory {
        run(Arc::new(MemoryStore::new()), bridge, cli.cmd).await?;
    } else {
        let store = RedisStore::connect(&cfg.store.url).await?;
        run(Arc::new(store), bridge, cli.cmd).await?;
    }

    debug!(target: "rchan::cli", "metrics\n{}", metrics::snapshot());
    Ok(())
}

async fn run<S: ListStore>(store: Arc<S>, bridge: BridgeConfig, cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Send { messages } => send(store, bridge, messages).await,
        Command::Recv { count, timeout_ms } => {
            recv(store, bridge, count, Duration::from_millis(timeout_ms)).await
        }
        Command::Len => {
            println!("{}", store.len(&bridge.key).await?);
            Ok(())
        }
    }
}

async fn send<S: ListStore>(
    store: Arc<S>,
    bridge: BridgeConfig,
    messages: Vec<String>,
) -> anyhow::Result<()> {
    let (write, handle) = Bridge::writer::<_, String>(store, bridge)?;

    if messages.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            write.send(line).await?;
        }
    } else {
        for msg in messages {
            write.send(msg).await?;
        }
    }

    write.close();
    let stats = handle.join().await?;
    info!(
        target: "rchan::cli",
        flushed = stats.flushed,
        flushes = stats.flushes,
        dropped = stats.dropped,
        "send finished"
    );
    Ok(())
}

async fn recv<S: ListStore>(
    store: Arc<S>,
    bridge: BridgeConfig,
    count: Option<usize>,
    idle: Duration,
) -> anyhow::Result<()> {
    let (read, stop, handle) = Bridge::reader::<_, String>(store, bridge)?;

    let mut received = 0usize;
    while count.map_or(true, |n| received < n) {
        match tokio::time::timeout(idle, read.recv()).await {
            Ok(Some(msg)) => {
                println!("{msg}");
                received += 1;
            }
            Ok(None) | Err(_) => break,
        }
    }

    // whatever is still buffered goes through the drain policy
    stop.stop();
    let stats = handle.join().await?;
    info!(
        target: "rchan::cli",
        received,
        drained_back = stats.drained_back,
        discarded = stats.discarded,
        "recv finished"
    );
    Ok(())
}
