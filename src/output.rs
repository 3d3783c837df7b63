use crate::error::Result;
use crate::types::{AggregatedMovie, GenreLegendEntry, LegendPreviewRow, MoviePreviewRow};
use crate::util::format_number;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn movie_preview_rows(movies: &[AggregatedMovie]) -> Vec<MoviePreviewRow> {
    movies
        .iter()
        .map(|m| MoviePreviewRow {
            title: m.title.clone(),
            released: m
                .release_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            genre: m.primary_genre.clone(),
            box_office: format_number(m.box_office, 0),
            deviation: format_number(m.deviation, 0),
        })
        .collect()
}

pub fn legend_preview_rows(genres: &[GenreLegendEntry]) -> Vec<LegendPreviewRow> {
    genres
        .iter()
        .map(|g| LegendPreviewRow {
            genre: g.genre.clone(),
            count: g.count,
            color: g.color.clone(),
        })
        .collect()
}

/// Render the first `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}
