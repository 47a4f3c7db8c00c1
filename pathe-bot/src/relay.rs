//! Turn relay: runs a conversation turn through the agent and streams the answer back to the chat.

use std::sync::Arc;

use agent_gateway::{
    AgentService, FragmentCallback, FragmentFuture, TurnIdentity, TurnSummary,
};
use async_trait::async_trait;
use pathe_core::{Bot, ConversationTurn, Message, Result};
use pathe_media::TurnSink;
use pathe_telegram::{send_segments, NO_RESPONSE};
use storage::MessageRepository;
use tracing::{info, instrument, warn};

pub const RETRIEVAL_FAILURE_MESSAGE: &str =
    "Sorry, I could not retrieve your media. Please try sending it again.";

pub struct TurnRelay {
    bot: Arc<dyn Bot>,
    agent: Arc<AgentService>,
    messages: MessageRepository,
}

impl TurnRelay {
    pub fn new(bot: Arc<dyn Bot>, agent: Arc<AgentService>, messages: MessageRepository) -> Self {
        Self {
            bot,
            agent,
            messages,
        }
    }

    /// Sends `turn` for the author of `origin`. Each fragment is delivered as MarkdownV2 replies to
    /// `origin` and logged; an answer without fragments gets the placeholder.
    #[instrument(skip(self, origin, turn), fields(user_id = origin.user.id, chat_id = origin.chat.id))]
    pub async fn run(&self, origin: &Message, turn: ConversationTurn) -> Result<TurnSummary> {
        let identity = TurnIdentity::for_user(origin.user.id.to_string());
        info!(
            attachments = turn.attachments.len(),
            text_len = turn.text.len(),
            "step: agent turn started"
        );

        let summary = self
            .agent
            .run_turn(&identity, turn, self.fragment_callback(origin))
            .await?;

        if summary.fragments == 0 {
            warn!(message_id = %origin.id, "Agent produced no output");
            self.deliver(origin, NO_RESPONSE).await?;
        }
        Ok(summary)
    }

    async fn deliver(&self, origin: &Message, fragment: &str) -> Result<()> {
        deliver_fragment(
            self.bot.as_ref(),
            &self.messages,
            origin,
            fragment.to_string(),
        )
        .await
    }

    fn fragment_callback(&self, origin: &Message) -> FragmentCallback {
        let bot = self.bot.clone();
        let messages = self.messages.clone();
        let origin = origin.clone();
        Box::new(move |fragment: String| -> FragmentFuture {
            let bot = bot.clone();
            let messages = messages.clone();
            let origin = origin.clone();
            Box::pin(async move {
                deliver_fragment(bot.as_ref(), &messages, &origin, fragment).await
            })
        })
    }
}

async fn deliver_fragment(
    bot: &dyn Bot,
    messages: &MessageRepository,
    origin: &Message,
    fragment: String,
) -> Result<()> {
    let ids = send_segments(bot, &origin.chat, Some(origin), &fragment).await?;
    messages
        .append_bot_response(
            origin.user.id,
            origin.chat.id,
            ids.last().cloned(),
            &fragment,
        )
        .await?;
    Ok(())
}

#[async_trait]
impl TurnSink for TurnRelay {
    async fn submit_turn(&self, origin: &Message, turn: ConversationTurn) -> Result<()> {
        self.run(origin, turn).await.map(|_| ())
    }

    async fn media_unavailable(&self, origin: &Message) -> Result<()> {
        self.bot.reply_to(origin, RETRIEVAL_FAILURE_MESSAGE).await
    }
}
