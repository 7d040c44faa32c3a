//! Media description service.
//!
//! Turns photos, stickers, video notes and voice notes into short text so
//! the summary model can "see" them. Descriptions are written back into the
//! message's [`Attachment`] before it is stored.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::{Attachment, MediaSource};
use crate::error::CoreError;
use crate::ports::{
    AudioTranscoder, ChatGateway, LlmPort, MediaPayload, StickerCacheRepository,
};
use crate::wide_log::{Timings, elapsed_ms};

const PHOTO_PROMPT: &str = "Что изображено на картинке? Кратко";

const STICKER_PROMPT: &str = "Очень кратко опиши стикер. Если стикер представляет собой скриншот сообщения, ответь в формате \"Имя:\\nтекст сообщения\"";

const VIDEO_NOTE_PROMPT: &str = "Что происходит / какие слова говорятся в видеосообщении?";

const VOICE_PROMPT: &str = "Расшифруй это голосовое сообщение. Выведи только текст.";

/// What happened while describing one attachment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescribeReport {
    pub elapsed_ms: f64,
    pub cost: Option<f64>,
    /// Sub-step timings (e.g. `transcode`).
    pub timings: Timings,
    pub warnings: Vec<String>,
}

/// Describes media attachments through the LLM provider.
pub struct MediaDescriber {
    llm: Arc<dyn LlmPort>,
    gateway: Arc<dyn ChatGateway>,
    stickers: Arc<dyn StickerCacheRepository>,
    transcoder: Arc<dyn AudioTranscoder>,
}

impl MediaDescriber {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        gateway: Arc<dyn ChatGateway>,
        stickers: Arc<dyn StickerCacheRepository>,
        transcoder: Arc<dyn AudioTranscoder>,
    ) -> Self {
        Self {
            llm,
            gateway,
            stickers,
            transcoder,
        }
    }

    /// Describe `attachment`, storing the description in it.
    ///
    /// Returns `None` when the attachment kind isn't describable. Failures
    /// never propagate: they are logged and reported as warnings, since a
    /// message without a description is still worth storing.
    pub async fn describe(
        &self,
        media: &MediaSource,
        attachment: &mut Attachment,
    ) -> Option<DescribeReport> {
        let describable = matches!(
            (media, &*attachment),
            (MediaSource::Photo { .. }, Attachment::Photo { .. })
                | (MediaSource::Sticker { .. }, Attachment::Sticker { .. })
                | (MediaSource::VideoNote { .. }, Attachment::VideoNote { .. })
                | (MediaSource::Voice { .. }, Attachment::Voice { .. })
        );
        if !describable {
            return None;
        }

        let start = Instant::now();
        let mut report = DescribeReport::default();

        if let Err(e) = self.describe_inner(media, attachment, &mut report).await {
            let kind = attachment.kind();
            warn!("Failed to describe {kind}: {e}");
            report.warnings.push(format!("failed to describe {kind}: {e}"));
        }

        report.elapsed_ms = elapsed_ms(start);
        Some(report)
    }

    async fn describe_inner(
        &self,
        media: &MediaSource,
        attachment: &mut Attachment,
        report: &mut DescribeReport,
    ) -> Result<(), CoreError> {
        let roster = self.llm.roster();

        let description = match media {
            MediaSource::Photo { file_id } => {
                let bytes = self.gateway.download_file(file_id).await?;
                self.llm
                    .describe(&roster.image_model, PHOTO_PROMPT, MediaPayload::Image(bytes))
                    .await?
            }
            MediaSource::Sticker {
                file_id,
                file_unique_id,
                animated,
                thumbnail_file_id,
            } => {
                if let Some(cached) = self.stickers.sticker_description(file_unique_id).await? {
                    debug!("Sticker {file_unique_id} description served from cache");
                    attachment.set_description(cached);
                    return Ok(());
                }

                let source_id = if *animated {
                    let Some(thumb) = thumbnail_file_id else {
                        warn!("Animated sticker {file_unique_id} has no thumbnail");
                        report
                            .warnings
                            .push(format!("animated sticker {file_unique_id} has no thumbnail"));
                        return Ok(());
                    };
                    thumb
                } else {
                    file_id
                };

                let bytes = self.gateway.download_file(source_id).await?;
                let description = self
                    .llm
                    .describe(&roster.image_model, STICKER_PROMPT, MediaPayload::Image(bytes))
                    .await?;
                report.cost = description.cost;
                attachment.set_description(description.text.clone());
                self.stickers
                    .save_sticker_description(file_unique_id, &description.text)
                    .await?;
                return Ok(());
            }
            MediaSource::VideoNote { file_id } => {
                let bytes = self.gateway.download_file(file_id).await?;
                self.llm
                    .describe(
                        &roster.video_model,
                        VIDEO_NOTE_PROMPT,
                        MediaPayload::Video(bytes),
                    )
                    .await?
            }
            MediaSource::Voice { file_id } => {
                let ogg = self.gateway.download_file(file_id).await?;
                let transcode_start = Instant::now();
                let mp3 = self.transcoder.ogg_to_mp3(ogg).await?;
                report.timings.record("transcode", transcode_start);
                self.llm
                    .describe(&roster.voice_model, VOICE_PROMPT, MediaPayload::Audio(mp3))
                    .await?
            }
        };

        report.cost = description.cost;
        attachment.set_description(description.text);
        Ok(())
    }
}
