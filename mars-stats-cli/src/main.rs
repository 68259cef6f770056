mod loader;
mod reports;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mars_stats::{
    AnalysisConfig, GameSet, GameSource, SortKey, StatsError, cards_by_generation,
    corporation_ranking, log_statistics,
};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use loader::JsonGameSource;
use reports::ReportTable;
use util::parse_generations;

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Rank corporations by Elo-adjusted performance
    Corporations {
        /// Column to rank by (plays, wins, win-rate, wap)
        #[arg(long, value_parser = parse_sort_key)]
        sort: Option<SortKey>,
    },
    /// Card, milestone, award and award-scoring tables from game logs
    Logs {
        /// Column to rank the card table by
        #[arg(long, value_parser = parse_sort_key)]
        sort: Option<SortKey>,
    },
    /// Card table restricted to plays made in selected generations
    CardsByGeneration {
        /// Generations to include (comma-separated)
        #[arg(long)]
        generations: Option<String>,
        /// Keep cards played more than this many times
        #[arg(long)]
        min_plays: Option<u32>,
        /// Column to rank by
        #[arg(long, value_parser = parse_sort_key)]
        sort: Option<SortKey>,
    },
    /// Every table, driven by the analysis config
    All,
}

#[derive(Debug, Parser)]
#[command(name = "mars-stats", version)]
#[command(
    about = "Elo-adjusted rankings of Terraforming Mars corporations, cards, milestones and awards"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON array of game records
    #[arg(long, global = true, default_value = "games.json")]
    games: PathBuf,

    /// Directory holding one `<game id>.txt` log per game
    #[arg(long, global = true)]
    logs: Option<PathBuf>,

    /// Analysis config (JSON); subcommand flags override its fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, global = true, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,
}

fn parse_sort_key(raw: &str) -> Result<SortKey, StatsError> {
    raw.parse()
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = resolve_config(&args)?;
    let source = JsonGameSource::new(args.games.clone(), args.logs.clone());
    let games = source.load_games().context("loading game records")?;
    if games.is_empty() {
        log::warn!("no games found in {}", args.games.display());
    }

    let tables = build_tables(&args.command, &games, &config)?;
    write_reports(&args, &tables, games.len())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn resolve_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            AnalysisConfig::from_json(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    match &args.command {
        Command::Corporations { sort } => {
            if let Some(sort) = sort {
                config.corporation_sort = *sort;
            }
        }
        Command::Logs { sort } => {
            if let Some(sort) = sort {
                config.card_sort = *sort;
            }
        }
        Command::CardsByGeneration {
            generations,
            min_plays,
            sort,
        } => {
            if let Some(raw) = generations {
                config.generations = parse_generations(raw)?;
            }
            if let Some(min_plays) = min_plays {
                config.min_plays = *min_plays;
            }
            if let Some(sort) = sort {
                config.card_sort = *sort;
            }
        }
        Command::All => {}
    }
    Ok(config)
}

fn build_tables(
    command: &Command,
    games: &GameSet,
    config: &AnalysisConfig,
) -> Result<Vec<ReportTable>, StatsError> {
    let mut tables = Vec::new();
    let everything = matches!(command, Command::All);

    if everything || matches!(command, Command::Corporations { .. }) {
        tables.push(ReportTable::new(
            "Corporations",
            config.corporation_sort,
            corporation_ranking(games, config.corporation_sort)?,
        ));
    }
    if everything || matches!(command, Command::Logs { .. }) {
        let stats = log_statistics(games, config.card_sort)?;
        tables.push(ReportTable::new("Cards", config.card_sort, stats.cards));
        tables.push(ReportTable::new("Milestones", SortKey::WinRate, stats.milestones));
        tables.push(ReportTable::new("Awards", SortKey::WinRate, stats.awards));
        tables.push(ReportTable::new(
            "Award Scoring",
            SortKey::WinRate,
            stats.award_scoring,
        ));
    }
    if everything || matches!(command, Command::CardsByGeneration { .. }) {
        tables.push(ReportTable::new(
            "Cards by Generation",
            config.card_sort,
            cards_by_generation(games, &config.generations, config.card_sort, config.min_plays)?,
        ));
    }
    Ok(tables)
}

fn write_reports(args: &Args, tables: &[ReportTable], games: usize) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, tables, games)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, tables, games)?,
        "csv" => reports::generate_csv_report(&mut output_target, tables)?,
        _ => reports::generate_console_report(&mut output_target, tables, games)?,
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
