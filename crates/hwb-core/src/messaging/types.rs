/// Capabilities / limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    /// Longest text (in chars) a single message may carry.
    pub max_message_len: usize,
}

impl Default for MessagingCapabilities {
    fn default() -> Self {
        // Telegram Bot API limit.
        Self {
            max_message_len: 4096,
        }
    }
}
