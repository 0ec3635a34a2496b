use std::sync::Arc;

use tracing::{debug, error};

use crate::{domain::ChatId, errors::Error, messaging::port::MessagingPort, Result};

pub const SEND_FAILURE_MESSAGE: &str = "Сбой при отправке сообщения в Telegram";

/// Delivers notifications to the single configured chat.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, chat_id: ChatId) -> Self {
        Self { messenger, chat_id }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Send `text`, truncated to the messenger's limit.
    ///
    /// Any transport failure is logged with full detail and surfaces as
    /// `Error::SendMessage`.
    pub async fn send(&self, text: &str) -> Result<()> {
        let max_len = self.messenger.capabilities().max_message_len;
        let text = truncate_text(text, max_len);

        debug!(chat_id = self.chat_id.0, "sending message: {text}");
        match self.messenger.send_text(self.chat_id, &text).await {
            Ok(_) => {
                debug!(chat_id = self.chat_id.0, "message sent");
                Ok(())
            }
            Err(e) => {
                error!(chat_id = self.chat_id.0, error = ?e, "{SEND_FAILURE_MESSAGE}: {e}");
                Err(Error::SendMessage(format!("{SEND_FAILURE_MESSAGE}: {e}")))
            }
        }
    }
}

/// Cut `s` to at most `max_len` chars, marking the cut with `...`.
pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out = s.chars().take(keep).collect::<String>();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageId, MessageRef},
        messaging::types::MessagingCapabilities,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeMessenger {
        fail: bool,
        max_len: Option<usize>,
        sends: Mutex<Vec<(ChatId, String)>>,
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            match self.max_len {
                Some(max_message_len) => MessagingCapabilities { max_message_len },
                None => MessagingCapabilities::default(),
            }
        }

        async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
            if self.fail {
                return Err(Error::External("telegram error: chat not found".to_string()));
            }
            self.sends.lock().unwrap().push((chat_id, text.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }
    }

    #[tokio::test]
    async fn sends_to_configured_chat() {
        let messenger = Arc::new(FakeMessenger::default());
        let notifier = Notifier::new(messenger.clone(), ChatId(77));

        notifier.send("hello").await.unwrap();

        let sends = messenger.sends.lock().unwrap().clone();
        assert_eq!(sends, vec![(ChatId(77), "hello".to_string())]);
    }

    #[tokio::test]
    async fn transport_failure_becomes_send_message_error() {
        let messenger = Arc::new(FakeMessenger {
            fail: true,
            ..Default::default()
        });
        let notifier = Notifier::new(messenger, ChatId(1));
        let (logs, _guard) = crate::logging::capture::capture_logs();

        let err = notifier.send("hello").await.unwrap_err();
        assert!(err.is_send_failure());
        assert!(err.to_string().starts_with(SEND_FAILURE_MESSAGE));
        assert!(err.to_string().contains("chat not found"));

        let logged = logs.lines_with("ERROR", SEND_FAILURE_MESSAGE);
        assert_eq!(logged.len(), 1);
        assert!(logged[0].contains("chat not found"));
    }

    #[tokio::test]
    async fn long_messages_are_truncated_to_the_messenger_limit() {
        let messenger = Arc::new(FakeMessenger {
            max_len: Some(10),
            ..Default::default()
        });
        let notifier = Notifier::new(messenger.clone(), ChatId(1));

        notifier.send("абвгдеёжзийклмн").await.unwrap();

        let sends = messenger.sends.lock().unwrap().clone();
        assert_eq!(sends[0].1, "абвгдеё...");
        assert_eq!(sends[0].1.chars().count(), 10);
    }

    #[test]
    fn truncate_text_leaves_short_text_alone() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly10!", 10), "exactly10!");
    }
}
