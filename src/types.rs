use crate::util::de_opt_text;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One entry of the source dataset, exactly as loaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMovieRecord {
    #[serde(rename = "Title", default, deserialize_with = "de_opt_text")]
    pub title: Option<String>,
    #[serde(rename = "Released", default, deserialize_with = "de_opt_text")]
    pub released: Option<String>,
    #[serde(rename = "BoxOffice", default, deserialize_with = "de_opt_text")]
    pub box_office: Option<String>,
    #[serde(rename = "Genre", default, deserialize_with = "de_opt_text")]
    pub genre: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "de_opt_text")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMovie {
    pub title: String,
    /// `None` is the invalid-date marker.
    pub release_date: Option<NaiveDate>,
    pub nominal_box_office: Option<u64>,
    /// Inflation-adjusted to the configured reference year.
    pub box_office: Option<f64>,
    /// Empty when the source had no genre list.
    pub primary_genre: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedMovie {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Released")]
    pub release_date: Option<NaiveDate>,
    #[serde(rename = "NominalBoxOffice")]
    pub nominal_box_office: Option<u64>,
    #[serde(rename = "BoxOffice")]
    pub box_office: f64,
    #[serde(rename = "Genre")]
    pub primary_genre: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Deviation")]
    pub deviation: f64,
}

/// Legend entry handed to the renderer: a genre, its cohort count and colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreLegendEntry {
    pub genre: String,
    pub count: usize,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MoviePreviewRow {
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Released")]
    pub released: String,
    #[tabled(rename = "Genre")]
    pub genre: String,
    #[tabled(rename = "BoxOffice")]
    pub box_office: String,
    #[tabled(rename = "Deviation")]
    pub deviation: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct LegendPreviewRow {
    #[tabled(rename = "Genre")]
    pub genre: String,
    #[tabled(rename = "Movies")]
    pub count: usize,
    #[tabled(rename = "Color")]
    pub color: String,
}
