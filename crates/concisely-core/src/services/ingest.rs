//! Per-message pipeline.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, warn};

use crate::domain::IncomingMessage;
use crate::error::CoreError;
use crate::ports::{MessageRepository, WideLogSink};
use crate::wide_log::WideLogRecord;

use super::media::MediaDescriber;
use super::summary::SummaryService;

/// Handles one incoming message end to end: describe its media, store it,
/// check whether the chat is due for a summary, and emit a wide log record.
pub struct IngestService {
    describer: MediaDescriber,
    messages: Arc<dyn MessageRepository>,
    summaries: Arc<SummaryService>,
    sink: Arc<dyn WideLogSink>,
}

impl IngestService {
    pub fn new(
        describer: MediaDescriber,
        messages: Arc<dyn MessageRepository>,
        summaries: Arc<SummaryService>,
        sink: Arc<dyn WideLogSink>,
    ) -> Self {
        Self {
            describer,
            messages,
            summaries,
            sink,
        }
    }

    /// Handle a message. Never fails: errors end up in the returned record,
    /// which has already been appended to the wide log.
    pub async fn handle(&self, mut incoming: IncomingMessage) -> WideLogRecord {
        let start = Instant::now();
        let mut record = WideLogRecord::new(incoming.request_id(), incoming.raw.clone());

        if let Err(e) = self.process(&mut incoming, &mut record).await {
            error!("Failed to handle message {}: {e}", record.request_id);
            record.error = Some(e.to_string());
        }

        record.timings_ms.record("total", start);

        if let Err(e) = self.sink.append(&record).await {
            warn!("Failed to write wide log: {e}");
        }

        record
    }

    async fn process(
        &self,
        incoming: &mut IncomingMessage,
        record: &mut WideLogRecord,
    ) -> Result<(), CoreError> {
        if let (Some(media), Some(attachment)) =
            (incoming.media.as_ref(), incoming.attachment.as_mut())
        {
            if let Some(report) = self.describer.describe(media, attachment).await {
                record
                    .timings_ms
                    .insert("describe_attachment", report.elapsed_ms);
                record.timings_ms.extend(report.timings);
                record.attachment_description = attachment.description().map(str::to_string);
                record.describe_cost = report.cost;
                record.warnings.extend(report.warnings);
            }
        }

        let save_start = Instant::now();
        self.messages.save_message(incoming.to_new_message()).await?;
        record.timings_ms.record("save_message", save_start);

        let outcome = self
            .summaries
            .maybe_summarize(incoming.chat_id, incoming.message_id)
            .await;
        record.summary = Some(outcome);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Attachment, ChatSettings, MediaSource};
    use crate::services::SkipReason;
    use crate::testing::{FakeGateway, FakeLlm, FakeTranscoder, InMemoryStore, MemorySink};

    const CHAT: i64 = -100;

    struct Fixture {
        store: Arc<InMemoryStore>,
        sink: Arc<MemorySink>,
        service: IngestService,
    }

    fn fixture(gateway: FakeGateway) -> Fixture {
        let store = Arc::new(InMemoryStore::default());
        let sink = Arc::new(MemorySink::default());
        let llm = Arc::new(FakeLlm::new("summary").with_description("a dog", None));
        let gateway = Arc::new(gateway);

        let describer = MediaDescriber::new(
            llm.clone(),
            gateway.clone(),
            store.clone(),
            Arc::new(FakeTranscoder::default()),
        );
        let summaries = Arc::new(SummaryService::new(
            store.repos(),
            llm,
            gateway,
            ChatSettings::new([(CHAT, Some(5))]),
        ));
        let service = IngestService::new(describer, store.clone(), summaries, sink.clone());

        Fixture {
            store,
            sink,
            service,
        }
    }

    fn incoming(message_id: i64) -> IncomingMessage {
        IncomingMessage {
            chat_id: CHAT,
            message_id,
            sender_id: Some(7),
            sender_name: "Anna".to_string(),
            text: "hello".to_string(),
            reply_to_message_id: None,
            forward_sender_name: None,
            timestamp: None,
            raw: serde_json::json!({"message_id": message_id}),
            attachment: None,
            media: None,
        }
    }

    #[tokio::test]
    async fn test_stores_message_and_logs_record() {
        let f = fixture(FakeGateway::new());

        let record = f.service.handle(incoming(1)).await;

        assert_eq!(record.request_id, "-100:1");
        assert!(record.error.is_none());
        assert!(record.timings_ms.get("save_message").is_some());
        assert!(record.timings_ms.get("total").is_some());
        assert_eq!(
            record.summary.as_ref().and_then(|s| s.reason),
            Some(SkipReason::FirstRun)
        );
        assert_eq!(f.store.message_ids(CHAT), vec![1]);
        assert_eq!(f.sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_photo_description_is_stored_with_message() {
        let f = fixture(FakeGateway::new().with_file("photo-1", b"jpeg"));
        let mut msg = incoming(2);
        msg.attachment = Some(Attachment::Photo { description: None });
        msg.media = Some(MediaSource::Photo {
            file_id: "photo-1".to_string(),
        });

        let record = f.service.handle(msg).await;

        assert_eq!(record.attachment_description.as_deref(), Some("a dog"));
        assert!(record.timings_ms.get("describe_attachment").is_some());
        let stored = f.store.message(CHAT, 2).unwrap();
        assert_eq!(stored.attachment.unwrap().description(), Some("a dog"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_recorded_not_raised() {
        let f = fixture(FakeGateway::new());
        f.store.fail_saves();

        let record = f.service.handle(incoming(3)).await;

        assert!(record.error.unwrap().contains("Storage error"));
        assert!(record.summary.is_none());
        assert_eq!(f.sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_summary_after_interval() {
        let f = fixture(FakeGateway::new());
        for id in 1..=6 {
            f.service.handle(incoming(id)).await;
        }

        let records = f.sink.records();
        let last = records.last().unwrap().summary.clone().unwrap();
        assert!(last.sent);
        assert_eq!(last.messages_count, Some(5));
    }

    struct FailingSink;

    #[async_trait::async_trait]
    impl WideLogSink for FailingSink {
        async fn append(&self, _record: &WideLogRecord) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_fail_handling() {
        let f = fixture(FakeGateway::new());
        let service = IngestService::new(
            MediaDescriber::new(
                Arc::new(FakeLlm::new("s")),
                Arc::new(FakeGateway::new()),
                f.store.clone(),
                Arc::new(FakeTranscoder::default()),
            ),
            f.store.clone(),
            Arc::new(SummaryService::new(
                f.store.repos(),
                Arc::new(FakeLlm::new("s")),
                Arc::new(FakeGateway::new()),
                ChatSettings::new([(CHAT, Some(5))]),
            )),
            Arc::new(FailingSink),
        );

        let record = service.handle(incoming(9)).await;

        assert!(record.error.is_none());
        assert_eq!(f.store.message_ids(CHAT), vec![9]);
    }
}
