use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use draftdiff::analysis::aggregator::{aggregate, PlayerSampleDivisor};
use draftdiff::api::client::StatsApiClient;
use draftdiff::cache::{current_ds, Store};
use draftdiff::config::Config;
use draftdiff::display::output::{
    display_counters, display_error, display_info, display_player_heroes, display_success,
};
use draftdiff::export::{export, load_matchup_csv, OutputFormat};
use draftdiff::pipeline;
use draftdiff::rate_limit::RequestLog;
use draftdiff::sources::dotabuff::DotabuffSource;
use draftdiff::sources::dotabuff_matches::DotabuffHistory;
use draftdiff::sources::stratz::{StratzSource, SOURCE_TAG as STRATZ_TAG};
use draftdiff::sources::MatchupSource;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "draftdiff")]
#[command(about = "Blend Dota 2 hero counter stats from Dotabuff and Stratz", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Export format: json, csv or js (default: DRAFTDIFF_OUTPUT_FORMAT, else csv)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Directory for exported files (default: <data dir>/export)
    #[arg(short, long, global = true)]
    out_dir: Option<PathBuf>,

    /// Number of counters to display per hero (default: 5)
    #[arg(short, long, default_value = "5", global = true)]
    top_n: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Blend counters for every hero
    Counters,

    /// Blend counters for the heroes one or more players have been playing
    Player {
        /// Dotabuff player ids (Steam account ids)
        #[arg(required = true)]
        account_ids: Vec<u64>,

        /// Lookback window in days (default: DRAFTDIFF_LOOKBACK_DAYS, else 30)
        #[arg(short, long)]
        days: Option<u32>,

        /// How to scale the player sample back down: sources or pair
        #[arg(long)]
        divisor: Option<PlayerSampleDivisor>,
    },

    /// Blend a local CSV of per-source matchup rows
    Aggregate {
        /// CSV with a header row; blank cells count as missing
        input: PathBuf,

        /// How to scale the player sample back down: sources or pair
        #[arg(long)]
        divisor: Option<PlayerSampleDivisor>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(format) = args.format {
        config.output_format = format;
    }
    let export_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| config.data_dir.join("export"));
    let ds = current_ds();

    match args.command {
        Command::Counters => run_counters(&config, &export_dir, &ds, args.top_n),
        Command::Player {
            account_ids,
            days,
            divisor,
        } => {
            let days = days.unwrap_or(config.lookback_days);
            let divisor = divisor.unwrap_or(config.divisor);
            run_players(&config, &export_dir, &ds, &account_ids, days, divisor, args.top_n)
        }
        Command::Aggregate { input, divisor } => {
            let divisor = divisor.unwrap_or(config.divisor);
            run_aggregate(&config, &export_dir, &input, divisor, args.top_n)
        }
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

fn run_counters(config: &Config, export_dir: &Path, ds: &str, top_n: usize) -> Result<()> {
    let client = StatsApiClient::new(config.require_stratz_token()?.to_string());
    let store = Store::new(&config.data_dir);
    let stratz = StratzSource::new(&client, &store, RequestLog::load(STRATZ_TAG)?);
    let dotabuff = DotabuffSource::new(&client, &store);
    let sources: Vec<&dyn MatchupSource> = vec![&dotabuff, &stratz];

    display_info(&format!("Blending counters for every hero ({})", ds));

    let pb = progress_bar(0);
    let rows = pipeline::run_counters(&store, &sources, ds, &pb)
        .context("building the counter table")?;

    let path = export_dir.join(format!("counters-{}.{}", ds, config.output_format.extension()));
    export(&rows, config.output_format, &path)
        .with_context(|| format!("writing {}", path.display()))?;

    display_counters(&rows, top_n);
    display_success(&format!("Exported {} rows to {}", rows.len(), path.display()));
    stratz.request_log().display_status();
    Ok(())
}

fn run_players(
    config: &Config,
    export_dir: &Path,
    ds: &str,
    account_ids: &[u64],
    days: u32,
    divisor: PlayerSampleDivisor,
    top_n: usize,
) -> Result<()> {
    let client = StatsApiClient::new(config.require_stratz_token()?.to_string());
    let store = Store::new(&config.data_dir);
    let stratz = StratzSource::new(&client, &store, RequestLog::load(STRATZ_TAG)?);
    let dotabuff = DotabuffSource::new(&client, &store);
    let history = DotabuffHistory::new(&client, &store);
    let sources: Vec<&dyn MatchupSource> = vec![&dotabuff, &stratz];

    for &account_id in account_ids {
        display_info(&format!("Player {}: last {} days ({})", account_id, days, ds));

        let pb = progress_bar(0);
        let report =
            pipeline::run_player(&store, &sources, &history, account_id, days, ds, divisor, &pb)
                .with_context(|| format!("building counters for player {}", account_id))?;

        display_player_heroes(report.account_id, &report.hero_stats);

        let path = export_dir.join(format!(
            "player-{}-{}d-{}.{}",
            account_id,
            days,
            ds,
            config.output_format.extension()
        ));
        export(&report.counters, config.output_format, &path)
            .with_context(|| format!("writing {}", path.display()))?;

        display_counters(&report.counters, top_n);
        display_success(&format!(
            "Exported {} rows to {}",
            report.counters.len(),
            path.display()
        ));
    }

    stratz.request_log().display_status();
    Ok(())
}

fn run_aggregate(
    config: &Config,
    export_dir: &Path,
    input: &Path,
    divisor: PlayerSampleDivisor,
    top_n: usize,
) -> Result<()> {
    let records =
        load_matchup_csv(input).with_context(|| format!("reading {}", input.display()))?;
    display_info(&format!("Loaded {} rows from {}", records.len(), input.display()));

    let rows = aggregate(&records, divisor).context("aggregating matchup rows")?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("matchups");
    let path = export_dir.join(format!(
        "{}-aggregated.{}",
        stem,
        config.output_format.extension()
    ));
    export(&rows, config.output_format, &path)
        .with_context(|| format!("writing {}", path.display()))?;

    display_counters(&rows, top_n);
    display_success(&format!("Exported {} rows to {}", rows.len(), path.display()));
    Ok(())
}
