/// Core error type for the relay.
///
/// Display strings of the domain variants end up verbatim in the failure
/// notification sent to the user, so they are written for a human reader.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// The Practicum endpoint could not be reached or answered with a non-200 status.
    #[error("{0}")]
    ApiAnswer(String),

    /// The notification could not be delivered to the chat.
    #[error("{0}")]
    SendMessage(String),

    /// A value in the API payload has the wrong JSON type.
    #[error("{0}")]
    UnexpectedType(String),

    /// A required key is absent from the API payload.
    #[error("{0}")]
    MissingKey(String),

    /// A homework status outside the verdict table.
    #[error("{0}")]
    UnknownStatus(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Delivery failures are only logged by the poll loop, never reported
    /// through the chat they failed to reach.
    pub fn is_send_failure(&self) -> bool {
        matches!(self, Error::SendMessage(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_failures_are_discriminated() {
        assert!(Error::SendMessage("x".to_string()).is_send_failure());
        assert!(!Error::ApiAnswer("x".to_string()).is_send_failure());
        assert!(!Error::External("x".to_string()).is_send_failure());
    }

    #[test]
    fn domain_errors_display_their_message_verbatim() {
        let e = Error::ApiAnswer("Ответ от эндпоинта отличный от 200".to_string());
        assert_eq!(e.to_string(), "Ответ от эндпоинта отличный от 200");
    }
}
