mod mcp;

use anyhow::{bail, Context};
use chem_extract::{resolver, Config, ElementSearch, LookupError, SearchHistory};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "chem-search")]
#[command(about = "Chemical element lookup backed by a headless browser")]
#[command(version)]
struct Cli {
    /// Config file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run the browser headless (overrides config)
    #[arg(long, global = true, conflicts_with = "headed")]
    headless: bool,

    /// Show the browser window (overrides config)
    #[arg(long, global = true)]
    headed: bool,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up elements and print their properties
    Lookup {
        /// Element symbols, case-insensitive
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,

        /// Print the session history at the end
        #[arg(long)]
        history: bool,
    },
    /// Print the atomic number for a symbol
    Resolve {
        symbol: String,
    },
    /// Validate the config without running
    Check,
    /// Serve lookups over MCP on stdio
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    // stdout carries MCP frames in serve mode.
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut config = match cli.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if cli.headless {
        config.browser.headless = true;
    }
    if cli.headed {
        config.browser.headless = false;
    }

    match cli.command {
        Command::Check => {
            config.validate()?;
            println!("Config valid");
            println!("  Site: {}", config.site.url);
            println!("  Click: {} = <atomic number>", config.site.click.strategy);
            println!(
                "  Read: {} = {}",
                config.site.read.strategy,
                config.site.read.value.as_deref().unwrap_or("")
            );
            println!("  Headless: {}", config.browser.headless);
            println!(
                "  Timing: wait {}ms, poll {}ms, settle {}ms",
                config.timing.wait_timeout_ms,
                config.timing.poll_interval_ms,
                config.timing.stabilize_ceiling_ms
            );
            println!("  Compounds: {}", config.compounds.base_url);
            println!("  Cache: {}", config.cache.dir.display());
            Ok(())
        }
        Command::Resolve { symbol } => match resolver::atomic_id(symbol.trim()) {
            Some(id) => {
                println!("{}", id);
                Ok(())
            }
            None => bail!("unknown element symbol: {:?}", symbol),
        },
        Command::Serve => {
            let search = ElementSearch::from_config(&config)?;
            mcp::run_server(search).await
        }
        Command::Lookup {
            symbols,
            json,
            history,
        } => {
            let search = ElementSearch::from_config(&config)?;
            let mut seen = SearchHistory::new();
            let mut failed = 0;

            for symbol in &symbols {
                match search.lookup_element(symbol).await {
                    Ok(record) => {
                        if json {
                            println!("{}", serde_json::to_string_pretty(&record)?);
                        } else {
                            println!("{}\n", record);
                        }
                        seen.record(&record);
                    }
                    Err(e @ LookupError::UnknownSymbol(_)) => {
                        eprintln!("✗ {}", e);
                        failed += 1;
                    }
                    Err(e) => {
                        eprintln!("✗ {}: record not found ({})", symbol.trim(), e);
                        failed += 1;
                    }
                }
            }

            if history {
                println!("History:");
                for record in seen.entries() {
                    println!(
                        "  {} {} ({})",
                        record.atomic_number.value, record.symbol.value, record.name.value
                    );
                }
            }

            if failed > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
