//! Media messages: classify, buffer into the album aggregator, then acknowledge.

use std::sync::Arc;

use async_trait::async_trait;
use pathe_core::{Bot, Handler, HandlerResponse, Message, PatheError, Result};
use pathe_media::{Classification, MediaClassifier, MediaGroupAggregator};
use tracing::{info, instrument, warn};

pub const UNSUPPORTED_MEDIA_MESSAGE: &str = "I don't support this media type yet.";

pub struct MediaHandler {
    bot: Arc<dyn Bot>,
    classifier: MediaClassifier,
    aggregator: Arc<MediaGroupAggregator>,
}

impl MediaHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        classifier: MediaClassifier,
        aggregator: Arc<MediaGroupAggregator>,
    ) -> Self {
        Self {
            bot,
            classifier,
            aggregator,
        }
    }
}

#[async_trait]
impl Handler for MediaHandler {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.has_attachment() {
            return Ok(HandlerResponse::Continue);
        }

        match self.classifier.classify(message).await.map_err(PatheError::from)? {
            Classification::Unsupported { content_type } => {
                info!(content_type = %content_type, "step: media rejected");
                self.bot.reply_to(message, UNSUPPORTED_MEDIA_MESSAGE).await?;
                Ok(HandlerResponse::Reply(UNSUPPORTED_MEDIA_MESSAGE.to_string()))
            }
            Classification::Supported(descriptor) => {
                let ack = format!("Received {}", descriptor.file_name());
                // Buffered before the ack so a failed send cannot lose the item.
                let submission = self.aggregator.submit(descriptor, message);
                info!(
                    group_key = %submission.key,
                    buffered = submission.buffered,
                    "step: media accepted"
                );
                if let Err(e) = self.bot.reply_to(message, &ack).await {
                    warn!(error = %e, "Failed to send media acknowledgement");
                }
                Ok(HandlerResponse::Reply(ack))
            }
        }
    }
}
