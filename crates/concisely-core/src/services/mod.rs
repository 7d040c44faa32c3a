//! Core services.
//!
//! Services orchestrate ports; they hold no infrastructure of their own.
//!
//! - `media` - describes photos, stickers, video notes and voice notes
//! - `summary` - decides when to summarize a chat and posts the summary
//! - `ingest` - the per-message pipeline tying the above together

mod ingest;
mod media;
mod summary;

pub use ingest::IngestService;
pub use media::{DescribeReport, MediaDescriber};
pub use summary::{SkipReason, SummaryOutcome, SummaryService};
