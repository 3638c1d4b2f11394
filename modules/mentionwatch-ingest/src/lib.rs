pub mod budget;
pub mod normalizer;
pub mod pipeline;
pub mod stats;
pub mod testing;
pub mod traits;
pub mod writer;

pub use pipeline::{Pipeline, RunReport, RunState};
pub use stats::IngestStats;
pub use traits::{ApiFetcher, FetchPage, MentionFetcher};
