//! Command Line Interface for the smart order router.
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use prettytable::{Table, row};
use rust_decimal::Decimal;
use sor_data::SnapshotRepository;
use sor_domain::entities::PoolSnapshot;
use sor_engine::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sor")]
#[command(about = "Smart order router quoting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    /// Exact input amount
    GivenIn,
    /// Exact output amount
    GivenOut,
}

impl From<KindArg> for SwapKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::GivenIn => SwapKind::GivenIn,
            KindArg::GivenOut => SwapKind::GivenOut,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a swap against a pool snapshot
    Quote {
        /// Snapshot JSON file
        #[arg(long, env = "SOR_SNAPSHOT")]
        snapshot: PathBuf,

        /// Input token address
        #[arg(long)]
        token_in: String,

        /// Output token address
        #[arg(long)]
        token_out: String,

        /// Amount in human units of the given side
        #[arg(long)]
        amount: Decimal,

        /// Which side the amount fixes
        #[arg(long, value_enum, default_value = "given-in")]
        kind: KindArg,

        /// Evaluation time in unix seconds (defaults to the snapshot block)
        #[arg(long)]
        timestamp: Option<u64>,

        /// Maximum pools per path
        #[arg(long)]
        max_hops: Option<usize>,

        /// Maximum paths in a split
        #[arg(long)]
        max_paths: Option<usize>,
    },
    /// List which pools of a snapshot build and which are skipped
    Pools {
        /// Snapshot JSON file
        #[arg(long, env = "SOR_SNAPSHOT")]
        snapshot: PathBuf,

        /// Evaluation time in unix seconds (defaults to the snapshot block)
        #[arg(long)]
        timestamp: Option<u64>,
    },
}

/// Resolves an address to a token known to the snapshot: a pool token, an
/// ERC4626 underlying, or a pool's share token.
fn find_token(snapshot: &PoolSnapshot, address: &str) -> Option<Token> {
    let chain_id = snapshot.chain_id;
    for pool in &snapshot.pools {
        for token in &pool.tokens {
            if token.address.eq_ignore_ascii_case(address) {
                let found = Token::new(chain_id, &token.address, token.decimals);
                return Some(match &token.symbol {
                    Some(symbol) => found.with_symbol(symbol.clone()),
                    None => found,
                });
            }
            if let Some(underlying) = &token.underlying_token
                && underlying.address.eq_ignore_ascii_case(address)
            {
                return Some(Token::new(chain_id, &underlying.address, underlying.decimals));
            }
        }
        if pool.address.eq_ignore_ascii_case(address) {
            return Some(Token::new(chain_id, &pool.address, 18));
        }
    }
    None
}

fn load(path: PathBuf) -> Result<PoolSnapshot> {
    let repo = SnapshotRepository::new(path);
    repo.load()
        .with_context(|| format!("loading snapshot {}", repo.path().display()))
}

fn format_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Quote {
            snapshot,
            token_in,
            token_out,
            amount,
            kind,
            timestamp,
            max_hops,
            max_paths,
        } => {
            let snapshot = load(snapshot)?;
            let token_in = find_token(&snapshot, &token_in)
                .ok_or_else(|| anyhow!("token {token_in} is not in the snapshot"))?;
            let token_out = find_token(&snapshot, &token_out)
                .ok_or_else(|| anyhow!("token {token_out} is not in the snapshot"))?;
            let kind = SwapKind::from(kind);
            let given = match kind {
                SwapKind::GivenIn => token_in.clone(),
                SwapKind::GivenOut => token_out.clone(),
            };
            let amount = TokenAmount::from_human(given, amount)?;
            let timestamp = timestamp.unwrap_or(snapshot.block_timestamp);

            let request = SwapRequest::new(token_in, token_out, kind, amount, timestamp).with_overrides(
                TraversalOverrides {
                    max_hops,
                    max_paths,
                    ..Default::default()
                },
            );

            println!("📡 Routing {} {} at {}", request.kind, request.amount, format_time(timestamp));
            let sor = Sor::new(SorConfig::default());
            let Some(result) = sor.get_swap_paths(&request, &snapshot)? else {
                println!("❌ No route found.");
                return Ok(());
            };

            let mut table = Table::new();
            table.add_row(row!["#", "Hops", "Amount in", "Amount out"]);
            for (i, quoted) in result.paths.iter().enumerate() {
                let hops = quoted
                    .path
                    .hops()
                    .map(|(pool, tin, tout)| format!("{tin} -[{}]-> {tout}", pool.id()))
                    .collect::<Vec<_>>()
                    .join("\n");
                let amount_in = TokenAmount::from_raw(request.token_in.clone(), quoted.input_amount);
                let amount_out = TokenAmount::from_raw(request.token_out.clone(), quoted.output_amount);
                table.add_row(row![i + 1, hops, amount_in, amount_out]);
            }
            table.printstd();

            println!("\n📊 Swap Summary");
            println!("════════════════════════════════════");
            println!("Paths:       {}", result.paths.len());
            println!("Amount in:   {}", result.input_amount);
            println!("Amount out:  {}", result.output_amount);
            match result.effective_price() {
                Some(price) => println!("Price:       {price:.8} {} per {}", request.token_out, request.token_in),
                None => println!("Price:       n/a"),
            }
            println!("════════════════════════════════════");
        }
        Commands::Pools {
            snapshot,
            timestamp,
        } => {
            let snapshot = load(snapshot)?;
            let timestamp = timestamp.unwrap_or(snapshot.block_timestamp);
            let sor = Sor::new(SorConfig::default());
            let report = sor.build_pools_report(&snapshot, timestamp);

            println!(
                "✅ Built {} pools, skipped {} (chain {}, {})",
                report.pools.len(),
                report.skipped.len(),
                snapshot.chain_id,
                format_time(timestamp)
            );
            let mut table = Table::new();
            table.add_row(row!["Pool", "Type", "Tokens", "Swap fee"]);
            for pool in &report.pools {
                let tokens = pool
                    .tokens()
                    .iter()
                    .map(|t| t.token.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                table.add_row(row![pool.id(), pool.pool_type(), tokens, pool.swap_fee()]);
            }
            table.printstd();

            if !report.skipped.is_empty() {
                let mut skipped = Table::new();
                skipped.add_row(row!["Skipped pool", "Reason"]);
                for pool in &report.skipped {
                    skipped.add_row(row![pool.id, pool.reason]);
                }
                skipped.printstd();
            }
        }
    }

    Ok(())
}
