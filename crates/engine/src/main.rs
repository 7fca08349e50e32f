mod control;
mod headless;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use gecko::{GeckoConfig, GeckoRest};
use market_core::Period;
use session::{Cadence, DEFAULT_POLL_FLOOR, DisplayMode, Session, SessionConfig, SessionHandle};

use control::Control;
use headless::HeadlessHost;

const POLL_FLOOR_VAR: &str = "POLL_FLOOR_SECS";

#[derive(Parser, Debug)]
#[command(about = "Live candle chart session against CoinGecko")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Follow one coin: live price, trades and candles, switchable period.
    Watch(WatchArgs),
    /// Coin search.
    Search { query: String },
    /// Trending coins.
    Trending,
    /// Best pool for a coin.
    Pools {
        coin: String,
        #[arg(long)]
        network: Option<String>,
        #[arg(long)]
        contract: Option<String>,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Mode {
    Live,
    History,
}

impl From<Mode> for DisplayMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Live => DisplayMode::LiveTailing,
            Mode::History => DisplayMode::HistoricalBrowsing,
        }
    }
}

#[derive(clap::Args, Debug)]
struct WatchArgs {
    coin: String,
    /// `network_address`; looked up when omitted.
    #[arg(long)]
    pool: Option<String>,
    #[arg(long)]
    network: Option<String>,
    #[arg(long)]
    contract: Option<String>,
    #[arg(long, default_value = "daily")]
    period: Period,
    /// 1s or 1m; never faster than POLL_FLOOR_SECS.
    #[arg(long, default_value = "1m")]
    cadence: Cadence,
    #[arg(long, default_value_t = 360)]
    height: u32,
    #[arg(long, default_value_t = 960)]
    width: u32,
    #[arg(long, value_enum, default_value_t = Mode::Live)]
    mode: Mode,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "engine=info,session=info,gecko=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = GeckoConfig::from_env().context("upstream configuration")?;
    let rest = GeckoRest::new(config).context("failed to build HTTP client")?;

    match cli.command {
        Cmd::Watch(args) => {
            let floor = poll_floor(|k| env::var(k).ok())?;
            watch(rest, args, floor).await
        }
        Cmd::Search { query } => {
            for c in rest.search(&query).await? {
                let rank = c.market_cap_rank.map(|r| format!("#{r}")).unwrap_or_default();
                println!("{:<28} {:<10} {:<24} {}", c.id, c.symbol, c.name, rank);
            }
            Ok(())
        }
        Cmd::Trending => {
            for c in rest.trending().await? {
                let price = c.data.as_ref().and_then(|d| d.price);
                let change = c
                    .data
                    .as_ref()
                    .and_then(|d| d.price_change_percentage_24h.as_ref())
                    .and_then(|p| p.usd);
                println!(
                    "{:<28} {:<10} price={:?} 24h={:?}",
                    c.id, c.symbol, price, change
                );
            }
            Ok(())
        }
        Cmd::Pools {
            coin,
            network,
            contract,
        } => {
            match rest.pools(&coin, network.as_deref(), contract.as_deref()).await? {
                Some(p) => println!("{} {} ({})", p.id, p.name, p.network),
                None => println!("no pool for {coin}"),
            }
            Ok(())
        }
    }
}

fn poll_floor(lookup: impl Fn(&str) -> Option<String>) -> Result<Duration> {
    match lookup(POLL_FLOOR_VAR) {
        Some(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{POLL_FLOOR_VAR} must be whole seconds, got '{raw}'"))?;
            Ok(Duration::from_secs(secs))
        }
        None => Ok(DEFAULT_POLL_FLOOR),
    }
}

async fn watch(rest: GeckoRest, args: WatchArgs, floor: Duration) -> Result<()> {
    let pool = match args.pool {
        Some(pool) => pool,
        None => resolve_pool(&rest, &args.coin, args.network.as_deref(), args.contract.as_deref()).await,
    };

    let config = SessionConfig {
        pool,
        period: args.period,
        cadence: args.cadence,
        poll_floor: floor,
        height: args.height,
        mode: args.mode.into(),
        ..SessionConfig::new(args.coin)
    };
    let host = HeadlessHost::new(Some(args.width));
    let (session, handle) = Session::new(Arc::new(rest), config, host)?;
    let task = tokio::spawn(session.run());

    info!("{}", control::HELP);
    let mut lines = control::spawn_stdin_reader();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,

            Some(line) = lines.recv() => match control::parse(&line) {
                Ok(Control::Session(cmd)) => {
                    if handle.send(cmd).await.is_err() {
                        break;
                    }
                }
                Ok(Control::Status) => print_status(&handle)?,
                Ok(Control::Quit) => break,
                Err(e) => warn!("{e}"),
            },
        }
    }

    let _ = handle.shutdown().await;
    task.await.context("session task panicked")?;
    Ok(())
}

async fn resolve_pool(rest: &GeckoRest, coin: &str, network: Option<&str>, contract: Option<&str>) -> String {
    match rest.pools(coin, network, contract).await {
        Ok(Some(p)) => {
            info!(pool = %p.id, name = %p.name, "pool resolved");
            p.id
        }
        Ok(None) => {
            warn!(coin, "no pool found, trades disabled");
            String::new()
        }
        Err(e) => {
            warn!(coin, error = %e, "pool lookup failed, trades disabled");
            String::new()
        }
    }
}

fn print_status(handle: &SessionHandle) -> Result<()> {
    let snap = handle.snapshot();
    let summary = serde_json::json!({
        "coin": snap.coin,
        "pool": snap.pool,
        "period": snap.period,
        "displayed": snap.displayed,
        "status": snap.status,
        "price": snap.price,
        "trades": snap.trades.len(),
        "live": snap.live,
        "candles": snap.series.len(),
        "period_loading": snap.period_loading,
        "period_error": snap.period_error,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_floor_defaults_and_parses() {
        assert_eq!(poll_floor(|_| None).unwrap(), DEFAULT_POLL_FLOOR);
        assert_eq!(poll_floor(|_| Some(" 45 ".into())).unwrap(), Duration::from_secs(45));
        assert!(poll_floor(|_| Some("fast".into())).is_err());
    }

    #[test]
    fn cli_parses_watch() {
        let cli = Cli::try_parse_from([
            "engine", "watch", "bitcoin", "--period", "3M", "--cadence", "1s", "--mode", "history",
        ])
        .unwrap();
        let Cmd::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.period, Period::ThreeMonths);
        assert_eq!(args.cadence, Cadence::Fast);
        assert_eq!(args.pool, None);
        assert_eq!(DisplayMode::from(args.mode), DisplayMode::HistoricalBrowsing);
    }
}
