//! toolrank: monthly popularity tracker for software tools.
//! Entry point for the command-line binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use toolrank_agent::config::Config;
use toolrank_agent::export::export_all;
use toolrank_agent::render::{render_leaderboard, render_rank_view, render_summary};
use toolrank_agent::{load_rankings, run_refresh, RefreshSources};
use toolrank_db::CsvHistoryStore;
use toolrank_ingestion::{FetchCache, PageviewsClient, SignalCollector, TrendsExportSource};
use toolrank_ranker::{build_leaderboard, build_rank_view, RankTable, RankViewOptions};

#[derive(Parser, Debug)]
#[command(name = "toolrank")]
#[command(about = "Track the popularity of software tools over time", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./toolrank.toml)
    #[arg(long, short, global = true, env = "TOOLRANK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch fresh signals, update stored history and show leaderboards
    Refresh {
        /// Skip the pageview signal for this run
        #[arg(long)]
        no_pageviews: bool,
    },

    /// Show the latest-month leaderboard from stored scores
    Leaderboard {
        /// Only this category (defaults to all)
        #[arg(long)]
        category: Option<String>,

        /// Show only the top N tools
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show one category's rank history
    Ranks {
        #[arg(long)]
        category: String,

        /// Most recent N months (0 = all)
        #[arg(long)]
        lookback: Option<usize>,

        /// Keep the K best tools of the latest month
        #[arg(long = "top-k")]
        top_k: Option<usize>,

        /// 3-month moving average
        #[arg(long)]
        smooth: bool,
    },

    /// Write rank histories, current rankings and scores as CSV
    Export {
        #[arg(long, default_value = "./export")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("toolrank=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    info!(
        region = %config.tracker.region_label(),
        categories = config.tracker.categories.len(),
        data_dir = %config.storage.data_dir.display(),
        "Configuration loaded"
    );

    let store = CsvHistoryStore::new(&config.storage.data_dir);

    match cli.command {
        Commands::Refresh { no_pageviews } => {
            if no_pageviews {
                config.tracker.use_pageviews = false;
            }
            let trends = TrendsExportSource::new(&config.trends.export_dir);
            let pageviews = PageviewsClient::new(config.http.clone())
                .context("building pageviews client")?;
            let collector = SignalCollector::with_cache(FetchCache::new(
                config.cache.ttl(),
                config.cache.capacity,
            ));
            let sources = RefreshSources {
                bounded: &trends,
                unbounded: Some(&pageviews),
            };

            let report = run_refresh(&config.tracker, &sources, &collector, &store).await?;
            print!("{}", render_summary(&report));
            if !report.has_data() {
                warn!("No data collected; check the export directory and network access");
                return Ok(());
            }
            for category in &config.tracker.categories {
                if let Some(board) = build_leaderboard(
                    &report.scores,
                    category,
                    config.tracker.view.leaderboard_top_n,
                ) {
                    print!("\n{}", render_leaderboard(&board));
                }
            }
        }

        Commands::Leaderboard { category, top } => {
            let (scores, _) = load_rankings(&config.tracker, &store);
            if scores.is_empty() {
                println!("No stored scores yet. Run `toolrank refresh` first.");
                return Ok(());
            }
            let top_n = top.unwrap_or(config.tracker.view.leaderboard_top_n);
            let selected: Vec<_> = match &category {
                Some(name) => vec![config
                    .tracker
                    .category(name)
                    .with_context(|| format!("unknown category {name:?}"))?],
                None => config.tracker.categories.iter().collect(),
            };
            for cat in selected {
                if let Some(board) = build_leaderboard(&scores, cat, top_n) {
                    println!("{}", render_leaderboard(&board));
                }
            }
        }

        Commands::Ranks { category, lookback, top_k, smooth } => {
            if config.tracker.category(&category).is_none() {
                anyhow::bail!("unknown category {category:?}");
            }
            let (_, ranks) = load_rankings(&config.tracker, &store);
            let mut opts = RankViewOptions::from(&config.tracker.view);
            if let Some(n) = lookback {
                opts.lookback_months = if n == 0 { None } else { Some(n) };
            }
            if let Some(k) = top_k {
                opts.top_k = k;
            }
            opts.smooth |= smooth;

            let empty = RankTable::new();
            let table = ranks.get(&category).unwrap_or(&empty);
            print!("{}", render_rank_view(&build_rank_view(&category, table, &opts)));
        }

        Commands::Export { out_dir } => {
            let (scores, ranks) = load_rankings(&config.tracker, &store);
            let opts = RankViewOptions::from(&config.tracker.view);
            let files = export_all(&config.tracker, &scores, &ranks, &opts, &out_dir)?;
            for file in &files {
                println!("{}", file.display());
            }
            info!(files = files.len(), "Export complete");
        }
    }

    Ok(())
}
