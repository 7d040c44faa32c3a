//! Daily JSONL files for wide log records.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use concisely_core::{WideLogRecord, WideLogSink};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Appends each record as one JSON line to `{dir}/{YYYY-MM-DD}.jsonl`,
/// named by local date.
#[derive(Debug)]
pub struct JsonlWideLogSink {
    dir: PathBuf,
    // Serializes appends so concurrent handlers never interleave lines
    write_lock: Mutex<()>,
}

impl JsonlWideLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that records written now land in.
    pub fn current_file(&self) -> PathBuf {
        self.dir
            .join(format!("{}.jsonl", Local::now().format("%Y-%m-%d")))
    }
}

#[async_trait]
impl WideLogSink for JsonlWideLogSink {
    async fn append(&self, record: &WideLogRecord) -> io::Result<()> {
        // serde_json leaves non-ASCII text unescaped
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&self.dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_file())
            .await?;
        file.write_all(line.as_bytes()).await?;
        // tokio files finish writes in the background; flush before dropping
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str) -> WideLogRecord {
        let mut record = WideLogRecord::new(id.to_string(), serde_json::json!({ "text": text }));
        record.timings_ms.insert("total", 12.5);
        record
    }

    #[tokio::test]
    async fn test_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlWideLogSink::new(dir.path().join("logs"));

        sink.append(&record("-100:1", "привет")).await.unwrap();
        sink.append(&record("-100:2", "пока")).await.unwrap();

        let content = std::fs::read_to_string(sink.current_file()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        // Cyrillic is written as-is
        assert!(lines[0].contains("привет"));

        let parsed: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed["request_id"], "-100:2");
        assert_eq!(parsed["timings_ms"]["total"], 12.5);
        assert!(parsed["timestamp"].as_str().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_lines_whole() {
        let dir = tempfile::tempdir().unwrap();
        let sink = std::sync::Arc::new(JsonlWideLogSink::new(dir.path()));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..50 {
            let sink = std::sync::Arc::clone(&sink);
            tasks.spawn(async move {
                let text = "x".repeat(10_000);
                sink.append(&record(&format!("-100:{i}"), &text)).await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(sink.current_file()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 50);
        for line in lines {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }

    #[test]
    fn test_file_is_named_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlWideLogSink::new(dir.path());

        let name = sink.current_file();
        let name = name.file_name().unwrap().to_string_lossy();
        assert_eq!(name.len(), "2025-01-01.jsonl".len());
        assert!(name.ends_with(".jsonl"));
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        // A regular file where the directory should be
        let sink = JsonlWideLogSink::new(blocker.join("logs"));
        assert!(sink.append(&record("1:1", "x")).await.is_err());
    }
}
