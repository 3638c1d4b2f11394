pub mod memory;
pub mod postgres;
mod traits;

pub use memory::MemoryMentionStore;
pub use postgres::PgMentionStore;
pub use traits::{BatchOutcome, MentionStore};

/// Cursor slot for the mentions ingestion pipeline. A single pipeline today,
/// but the cursor table is keyed so more can coexist.
pub const INGEST_PIPELINE: &str = "mentions";
