//! Movie aggregation pipeline.
//!
//! `RawMovieRecord` → [`normalize`] → [`filter`] → [`compute_mean`] →
//! [`top_genres`] → [`finalize`], or [`select_year_buckets`] in place of the
//! last two steps. Every stage borrows its input and returns new values.

use crate::config::{PaletteConfig, PipelineConfig, SelectionStrategy};
use crate::error::{Error, Result};
use crate::inflation::InflationAdjuster;
use crate::types::{AggregatedMovie, GenreLegendEntry, NormalizedMovie, RawMovieRecord};
use crate::util::{parse_currency_safe, parse_date_safe, parse_i32_safe, primary_genre};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Why a record did not make it into the cohort. Only the first failing
/// check is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    InvalidYear,
    MissingBoxOffice,
    ZeroBoxOffice,
    MissingGenre,
    InvalidReleaseDate,
    BeforeCutoff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub raw_records: usize,
    pub normalized: usize,
    pub excluded: BTreeMap<ExclusionReason, usize>,
    pub cohort_size: usize,
    pub output_size: usize,
}

impl PipelineStats {
    pub fn total_excluded(&self) -> usize {
        self.excluded.values().sum()
    }
}

/// Everything the renderer needs for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub strategy: &'static str,
    /// `None` when amounts are nominal.
    pub reference_year: Option<i32>,
    pub cutoff_year: Option<i32>,
    pub mean_box_office: f64,
    pub genres: Vec<GenreLegendEntry>,
    pub stats: PipelineStats,
    pub movies: Vec<AggregatedMovie>,
}

impl PipelineOutput {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

pub fn normalize(
    raw: &RawMovieRecord,
    adjuster: &dyn InflationAdjuster,
) -> std::result::Result<NormalizedMovie, ExclusionReason> {
    let year = parse_i32_safe(raw.year.as_deref()).ok_or(ExclusionReason::InvalidYear)?;
    let title = raw.title.as_deref().unwrap_or_default().trim().to_string();
    let nominal_box_office = parse_currency_safe(raw.box_office.as_deref());
    let box_office = nominal_box_office.map(|amount| {
        let amount = amount as f64;
        match adjuster.adjust(year, amount) {
            Ok(adjusted) => adjusted,
            Err(e) => {
                debug!("Inflation adjustment failed for '{}' ({}): {}; keeping nominal amount", title, year, e);
                amount
            }
        }
    });

    Ok(NormalizedMovie {
        release_date: parse_date_safe(raw.released.as_deref()),
        nominal_box_office,
        box_office,
        primary_genre: primary_genre(raw.genre.as_deref()),
        year,
        title,
    })
}

pub fn has_positive_box_office(movie: &NormalizedMovie) -> bool {
    movie.box_office.is_some_and(|b| b > 0.0)
}

pub fn has_genre(movie: &NormalizedMovie) -> bool {
    !movie.primary_genre.is_empty()
}

pub fn has_release_date(movie: &NormalizedMovie) -> bool {
    movie.release_date.is_some()
}

pub fn meets_cutoff(movie: &NormalizedMovie, cutoff_year: Option<i32>) -> bool {
    cutoff_year.map_or(true, |cutoff| movie.year >= cutoff)
}

pub fn exclusion_reason(
    movie: &NormalizedMovie,
    cutoff_year: Option<i32>,
    require_release_date: bool,
) -> Option<ExclusionReason> {
    match movie.box_office {
        None => return Some(ExclusionReason::MissingBoxOffice),
        Some(_) if !has_positive_box_office(movie) => return Some(ExclusionReason::ZeroBoxOffice),
        Some(_) => {}
    }
    if !has_genre(movie) {
        return Some(ExclusionReason::MissingGenre);
    }
    if require_release_date && !has_release_date(movie) {
        return Some(ExclusionReason::InvalidReleaseDate);
    }
    if !meets_cutoff(movie, cutoff_year) {
        return Some(ExclusionReason::BeforeCutoff);
    }
    None
}

pub fn filter(
    movies: &[NormalizedMovie],
    cutoff_year: Option<i32>,
    require_release_date: bool,
) -> Vec<NormalizedMovie> {
    movies
        .iter()
        .filter(|m| exclusion_reason(m, cutoff_year, require_release_date).is_none())
        .cloned()
        .collect()
}

/// Mean adjusted box office of the cohort, or `None` when no movie in it has
/// a box office. [`run`] reports that as [`Error::EmptyCohort`].
pub fn compute_mean(cohort: &[NormalizedMovie]) -> Option<f64> {
    let amounts: Vec<f64> = cohort.iter().filter_map(|m| m.box_office).collect();
    if amounts.is_empty() {
        return None;
    }
    Some(amounts.iter().sum::<f64>() / amounts.len() as f64)
}

/// Every primary genre in the cohort, most frequent first. Equal counts keep
/// the order in which the genres were first seen.
pub fn rank_genres<'a, I>(genres: I) -> Vec<GenreCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<GenreCount> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    for genre in genres {
        match position.get(genre) {
            Some(&idx) => ranked[idx].count += 1,
            None => {
                position.insert(genre, ranked.len());
                ranked.push(GenreCount { genre: genre.to_string(), count: 1 });
            }
        }
    }
    // `sort_by` is stable, which preserves first-seen order on ties.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// The `k` most frequent primary genres; `k` is capped at the number of
/// distinct genres.
pub fn top_genres(cohort: &[NormalizedMovie], k: usize) -> Vec<GenreCount> {
    let mut ranked = rank_genres(cohort.iter().map(|m| m.primary_genre.as_str()));
    ranked.truncate(k);
    ranked
}

fn aggregate(movie: &NormalizedMovie, mean: f64) -> Option<AggregatedMovie> {
    let box_office = movie.box_office?;
    Some(AggregatedMovie {
        title: movie.title.clone(),
        release_date: movie.release_date,
        nominal_box_office: movie.nominal_box_office,
        box_office,
        primary_genre: movie.primary_genre.clone(),
        year: movie.year,
        deviation: box_office - mean,
    })
}

/// Keep the top genres, attach deviations and order by |deviation|, largest first.
pub fn finalize(
    cohort: &[NormalizedMovie],
    mean: f64,
    top_genres: &HashSet<String>,
) -> Vec<AggregatedMovie> {
    let mut out: Vec<AggregatedMovie> = cohort
        .iter()
        .filter(|m| top_genres.contains(&m.primary_genre))
        .filter_map(|m| aggregate(m, mean))
        .collect();
    out.sort_by(|a, b| b.deviation.abs().total_cmp(&a.deviation.abs()));
    out
}

/// Group by year, drop years with fewer than `min_per_year` movies and keep
/// the `top_n` highest grossing of each remaining year. Years come out in
/// ascending order.
pub fn select_year_buckets(
    cohort: &[NormalizedMovie],
    mean: f64,
    min_per_year: usize,
    top_n: usize,
) -> Vec<AggregatedMovie> {
    let mut by_year: BTreeMap<i32, Vec<&NormalizedMovie>> = BTreeMap::new();
    for m in cohort {
        by_year.entry(m.year).or_default().push(m);
    }

    let mut out = Vec::new();
    for (year, mut bucket) in by_year {
        if bucket.len() < min_per_year {
            debug!("Skipping {}: only {} movies (need {})", year, bucket.len(), min_per_year);
            continue;
        }
        bucket.sort_by(|a, b| {
            b.box_office
                .unwrap_or_default()
                .total_cmp(&a.box_office.unwrap_or_default())
        });
        out.extend(bucket.into_iter().take(top_n).filter_map(|m| aggregate(m, mean)));
    }
    out
}

fn legend(ranked: Vec<GenreCount>, palette: &PaletteConfig) -> Vec<GenreLegendEntry> {
    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, g)| GenreLegendEntry {
            genre: g.genre,
            count: g.count,
            color: palette.color_for(rank),
        })
        .collect()
}

/// Run the whole pipeline with the adjuster described by `config.inflation`.
pub fn run(raw: &[RawMovieRecord], config: &PipelineConfig) -> Result<PipelineOutput> {
    let adjuster = config.inflation.adjuster()?;
    run_with(raw, config, adjuster.as_ref())
}

pub fn run_with(
    raw: &[RawMovieRecord],
    config: &PipelineConfig,
    adjuster: &dyn InflationAdjuster,
) -> Result<PipelineOutput> {
    let mut stats = PipelineStats {
        raw_records: raw.len(),
        ..PipelineStats::default()
    };

    let mut normalized = Vec::with_capacity(raw.len());
    for record in raw {
        match normalize(record, adjuster) {
            Ok(m) => normalized.push(m),
            Err(reason) => {
                debug!("Excluding {:?}: {:?}", record.title, reason);
                *stats.excluded.entry(reason).or_insert(0) += 1;
            }
        }
    }
    stats.normalized = normalized.len();

    for m in &normalized {
        if let Some(reason) = exclusion_reason(m, config.cutoff_year, config.require_release_date) {
            *stats.excluded.entry(reason).or_insert(0) += 1;
        }
    }
    let cohort = filter(&normalized, config.cutoff_year, config.require_release_date);
    stats.cohort_size = cohort.len();
    info!(
        "Cohort: {} of {} records kept ({} excluded)",
        cohort.len(),
        raw.len(),
        stats.total_excluded()
    );

    let mean = compute_mean(&cohort).ok_or(Error::EmptyCohort { raw_records: raw.len() })?;

    let (movies, genres) = match config.strategy {
        SelectionStrategy::TopGenres { genre_count } => {
            let top = top_genres(&cohort, genre_count);
            let keep: HashSet<String> = top.iter().map(|g| g.genre.clone()).collect();
            (finalize(&cohort, mean, &keep), top)
        }
        SelectionStrategy::YearBuckets { min_per_year, top_n } => {
            let movies = select_year_buckets(&cohort, mean, min_per_year, top_n);
            let ranked = rank_genres(movies.iter().map(|m| m.primary_genre.as_str()));
            (movies, ranked)
        }
    };
    stats.output_size = movies.len();
    info!(
        "Selected {} movies across {} genres using {} (mean box office {:.0})",
        movies.len(),
        genres.len(),
        config.strategy.name(),
        mean
    );

    Ok(PipelineOutput {
        strategy: config.strategy.name(),
        reference_year: config
            .inflation
            .enabled
            .then_some(config.inflation.reference_year),
        cutoff_year: config.cutoff_year,
        mean_box_office: mean,
        genres: legend(genres, &config.palette),
        stats,
        movies,
    })
}
