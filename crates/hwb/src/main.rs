use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use hwb_core::{
    config::{self, Config},
    notifier::Notifier,
    poller::HomeworkPoller,
    practicum::PracticumClient,
};
use hwb_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = hwb_core::logging::init("hwb", &config::log_file_from_env())?;

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{e}");
            return Err(e.into());
        }
    };

    let source = Arc::new(
        PracticumClient::new(&cfg.endpoint, &cfg.practicum_token, cfg.request_timeout)
            .context("failed to build Practicum client")?,
    );
    let messenger = TelegramMessenger::from_token(cfg.telegram_bot_token.clone());
    messenger.log_identity().await;

    let notifier = Notifier::new(Arc::new(messenger), cfg.telegram_chat_id);
    let mut poller = HomeworkPoller::new(source, notifier, cfg.retry_period);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                cancel.cancel();
            }
        });
    }

    poller
        .run(cancel)
        .await
        .context("failure notification could not be delivered")?;

    Ok(())
}
