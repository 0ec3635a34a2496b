//! Telegram adapter (teloxide).
//!
//! This crate implements the `hwb-core` MessagingPort over Telegram Bot API.

use async_trait::async_trait;

use teloxide::prelude::*;

use hwb_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(Bot::new(token))
    }

    /// Log the bot identity; a wrong token shows up here before the first notification.
    pub async fn log_identity(&self) {
        match self.bot.get_me().await {
            Ok(me) => tracing::info!("telegram bot ready: @{}", me.username()),
            Err(e) => tracing::warn!("telegram getMe failed: {e}"),
        }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_chat_ids_verbatim() {
        assert_eq!(
            TelegramMessenger::tg_chat(ChatId(-100_123)),
            teloxide::types::ChatId(-100_123)
        );
    }

    #[test]
    fn request_errors_become_external_errors() {
        let e = TelegramMessenger::map_err(teloxide::RequestError::RetryAfter(
            std::time::Duration::from_secs(3),
        ));
        assert!(matches!(e, Error::External(_)));
        assert!(e.to_string().starts_with("external error: telegram error:"));
    }

    #[test]
    fn advertises_telegram_message_limit() {
        let messenger = TelegramMessenger::from_token("123:abc");
        assert_eq!(messenger.capabilities().max_message_len, 4096);
    }
}
