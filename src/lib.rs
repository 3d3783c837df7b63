//! Movie box office aggregation.
//!
//! Loads a movie dataset, adjusts box office for inflation and selects the
//! records a stream-graph style chart plots, together with the genre legend
//! and summary numbers the chart needs.

pub mod config;
pub mod error;
pub mod inflation;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod util;

pub use config::{PipelineConfig, SelectionStrategy};
pub use error::{Error, Result};
pub use pipeline::{run, PipelineOutput};
pub use types::{AggregatedMovie, NormalizedMovie, RawMovieRecord};
