//! SQLite store and normalization engine for IRVE static records.
//!
//! Flat [`Statique`](irve_model::Statique) records are split into the entity
//! graph on write and joined back on read. Three write paths share the same
//! entity semantics:
//! - **Single**: [`normalize_one`] looks every entity up by its uniqueness key
//!   and reuses or creates it, one record per transaction.
//! - **Batch**: [`normalize_many`] deduplicates a bounded list in memory
//!   first, so entities shared by several records are looked up once.
//! - **Bulk**: [`BulkImporter`] upserts whole datasets with chunked
//!   set-based statements, one entity kind after the other.
//!
//! Every station must belong to a registered operational unit, found from
//! the first five characters of its itinerance identifier.

mod db;
pub mod error;
mod flatten;
mod models;
mod normalize;
mod repo;
#[cfg(test)]
mod testing;

pub use crate::db::{DEFAULT_MAX_CONNECTIONS, Database};
pub use crate::flatten::flatten;
pub use crate::normalize::{
    BulkImporter, DEFAULT_CHUNK_SIZE, EntryStatus, ImportSummary, Stage, StageSummary, bulk_import,
    normalize_many, normalize_one, update_one,
};
pub use crate::repo::Repository;

/// Upper bound on bound parameters in one SQLite statement.
pub(crate) const SQLITE_MAX_VARIABLES: usize = 32766;
