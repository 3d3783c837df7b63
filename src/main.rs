// Entry point and high-level CLI flow.
//
// - Load the dataset and print load diagnostics.
// - Run the aggregation pipeline with the configured selection strategy.
// - Export the chart data as CSV and JSON and print markdown previews.
use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use movie_trends::config::{PipelineConfig, SelectionStrategy};
use movie_trends::pipeline::ExclusionReason;
use movie_trends::{loader, output, pipeline, util};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "movie_trends", version, about = "Aggregate movie box office data for charting")]
struct Cli {
    /// Input dataset (.json array or .csv).
    #[arg(long = "in", default_value = "movies.json")]
    in_path: PathBuf,

    /// Pipeline config (TOML). Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the CSV and JSON exports are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Selection strategy, overriding the config file.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Minimum release year, overriding the config file.
    #[arg(long, conflicts_with = "no_cutoff")]
    cutoff_year: Option<i32>,

    /// Keep every release year.
    #[arg(long, default_value_t = false)]
    no_cutoff: bool,

    /// Number of top genres to keep (top-genres strategy).
    #[arg(long)]
    genres: Option<usize>,

    /// Year amounts are adjusted to.
    #[arg(long)]
    reference_year: Option<i32>,

    /// Rows shown in the console preview.
    #[arg(long, default_value_t = 5)]
    preview: usize,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    TopGenres,
    YearBuckets,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}

/// Config file (or defaults) with CLI overrides applied on top.
///
/// Switching strategy on the command line without a config file takes the
/// strategy's preset cutoff (`None` for year buckets); `--cutoff-year` and
/// `--no-cutoff` still win over it.
fn resolve_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let preset = match cli.strategy {
        Some(StrategyArg::TopGenres) if !matches!(config.strategy, SelectionStrategy::TopGenres { .. }) => {
            Some(PipelineConfig::default())
        }
        Some(StrategyArg::YearBuckets) if !matches!(config.strategy, SelectionStrategy::YearBuckets { .. }) => {
            Some(PipelineConfig::year_buckets())
        }
        _ => None,
    };
    if let Some(preset) = preset {
        if cli.config.is_none() {
            config.cutoff_year = preset.cutoff_year;
        }
        config.strategy = preset.strategy;
    }
    if let Some(k) = cli.genres {
        config.strategy = match config.strategy {
            SelectionStrategy::TopGenres { .. } => SelectionStrategy::TopGenres { genre_count: k },
            other => {
                debug!("--genres ignored for the {} strategy", other.name());
                other
            }
        };
    }
    if let Some(year) = cli.cutoff_year {
        config.cutoff_year = Some(year);
    }
    if cli.no_cutoff {
        config.cutoff_year = None;
    }
    if let Some(year) = cli.reference_year {
        config.inflation.reference_year = year;
    }
    config.validate()?;
    Ok(config)
}

fn describe_selection(config: &PipelineConfig) -> String {
    let cutoff = match config.cutoff_year {
        Some(y) => format!("released {} or later", y),
        None => "all years".to_string(),
    };
    match config.strategy {
        SelectionStrategy::TopGenres { genre_count } => {
            format!("Top {} genres, {}", genre_count, cutoff)
        }
        SelectionStrategy::YearBuckets { min_per_year, top_n } => {
            format!("Top {} per year with >={} movies, {}", top_n, min_per_year, cutoff)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    debug!("Pipeline config: {:?}", config);

    let (raw, load_report) = loader::load_movies(&cli.in_path)
        .with_context(|| format!("Failed to load {}", cli.in_path.display()))?;
    println!(
        "Processing dataset... ({} rows loaded)",
        util::format_int(load_report.loaded_rows)
    );
    if load_report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped because they could not be read.",
            util::format_int(load_report.parse_errors)
        );
    }

    let result = pipeline::run(&raw, &config).context("Aggregation failed")?;
    println!(
        "Cohort: {} movies ({} excluded)",
        util::format_int(result.stats.cohort_size),
        util::format_int(result.stats.total_excluded())
    );
    for (reason, count) in &result.stats.excluded {
        let label = match reason {
            ExclusionReason::InvalidYear => "invalid year",
            ExclusionReason::MissingBoxOffice => "no box office",
            ExclusionReason::ZeroBoxOffice => "zero box office",
            ExclusionReason::MissingGenre => "no genre",
            ExclusionReason::InvalidReleaseDate => "invalid release date",
            ExclusionReason::BeforeCutoff => "before cutoff",
        };
        println!("  - {}: {}", label, util::format_int(*count));
    }
    println!();

    if result.is_empty() {
        println!("Nothing to draw: no movies matched the selection.");
        return Ok(());
    }

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("Failed to create {}", cli.out_dir.display()))?;
    let csv_path = cli.out_dir.join("aggregated_movies.csv");
    output::write_csv(&csv_path, &result.movies)?;
    let json_path = cli.out_dir.join("chart_data.json");
    output::write_json(&json_path, &result)?;
    info!("Wrote {} and {}", csv_path.display(), json_path.display());

    println!("Box Office vs. Cohort Mean");
    println!("({})\n", describe_selection(&config));
    match result.reference_year {
        Some(year) => println!(
            "Mean box office (in {} dollars): {}\n",
            year,
            util::format_number(result.mean_box_office, 0)
        ),
        None => println!(
            "Mean box office (nominal): {}\n",
            util::format_number(result.mean_box_office, 0)
        ),
    }
    output::preview_table_rows(&output::legend_preview_rows(&result.genres), result.genres.len());
    output::preview_table_rows(&output::movie_preview_rows(&result.movies), cli.preview);
    println!("(Full table exported to {})", csv_path.display());
    println!("(Chart data exported to {})", json_path.display());
    Ok(())
}
