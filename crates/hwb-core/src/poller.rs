//! Poll loop: fetch, validate, format and notify on a fixed period.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    homework,
    notifier::{Notifier, SEND_FAILURE_MESSAGE},
    practicum::HomeworkSource,
    Result,
};

/// Prefix of the notification sent when a cycle fails.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Drives the relay. Owns the query cursor and the last delivered message.
pub struct HomeworkPoller {
    source: Arc<dyn HomeworkSource>,
    notifier: Notifier,
    retry_period: Duration,
    /// Lower bound (Unix seconds) of the next query window.
    cursor: i64,
    /// Last message delivered; identical follow-ups are suppressed.
    prev_message: String,
}

impl HomeworkPoller {
    pub fn new(source: Arc<dyn HomeworkSource>, notifier: Notifier, retry_period: Duration) -> Self {
        Self {
            source,
            notifier,
            retry_period,
            cursor: Utc::now().timestamp(),
            prev_message: String::new(),
        }
    }

    /// Start from an explicit cursor instead of "now".
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_message(&self) -> &str {
        &self.prev_message
    }

    /// Poll until `cancel` fires.
    ///
    /// Every cycle is followed by the full retry period, whatever its outcome.
    /// The only error returned is a failure notification that could not be
    /// delivered.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!(
            retry_period = ?self.retry_period,
            cursor = self.cursor,
            chat_id = self.notifier.chat_id().0,
            "homework poller started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                res = self.poll_once() => res?,
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.retry_period) => {}
            }
        }

        info!("homework poller stopped");
        Ok(())
    }

    /// One cycle plus the loop-level failure policy.
    ///
    /// - delivery failures are logged and dropped;
    /// - any other failure is reported to the chat once per distinct message.
    pub async fn poll_once(&mut self) -> Result<()> {
        let err = match self.run_cycle().await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if err.is_send_failure() {
            error!("{SEND_FAILURE_MESSAGE}");
            return Ok(());
        }

        let message = format!("{FAILURE_PREFIX}: {err}");
        if message == self.prev_message {
            debug!("failure already reported: {message}");
            return Ok(());
        }

        error!("{message}");
        self.notifier.send(&message).await?;
        self.prev_message = message;
        Ok(())
    }

    /// Fetch, validate, advance the cursor, and notify about the most recent
    /// homework if its message changed.
    pub async fn run_cycle(&mut self) -> Result<()> {
        let response = self.source.fetch(self.cursor).await?;
        let homeworks = homework::check_response(&response)?;
        self.advance_cursor(homework::current_date(&response));

        let Some(latest) = homeworks.first() else {
            return Ok(());
        };

        let message = homework::parse_status(latest)?;
        if message == self.prev_message {
            debug!("homework status unchanged");
            return Ok(());
        }

        self.notifier.send(&message).await?;
        self.prev_message = message;
        Ok(())
    }

    fn advance_cursor(&mut self, server_date: Option<i64>) {
        match server_date {
            Some(ts) if ts >= self.cursor => {
                debug!(from = self.cursor, to = ts, "cursor advanced");
                self.cursor = ts;
            }
            Some(ts) => {
                warn!(cursor = self.cursor, current_date = ts, "ignoring current_date older than cursor");
            }
            None => {
                debug!(cursor = self.cursor, "response has no current_date; cursor kept");
            }
        }
    }
}
