//! Wide log sink port.
//!
//! One structured record per handled message, carrying everything that
//! happened while handling it (timings, descriptions, summary decision).

use async_trait::async_trait;

use crate::wide_log::WideLogRecord;

/// Port for appending wide log records.
///
/// Implementations must not block the async runtime and must be safe to
/// call concurrently; a failure to append is reported but never aborts
/// message handling.
#[async_trait]
pub trait WideLogSink: Send + Sync {
    async fn append(&self, record: &WideLogRecord) -> std::io::Result<()>;
}
