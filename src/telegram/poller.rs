use super::BotService;
use crate::stream::CancelToken;
use std::sync::Arc;
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-poll `getUpdates` until `shutdown` fires, handing every update to the bot.
///
/// Any registered webhook is removed first; Telegram refuses `getUpdates`
/// while one is set.
pub async fn run(bot: Arc<BotService>, timeout_secs: u64, shutdown: CancelToken) {
    if let Err(err) = bot.telegram().delete_webhook().await {
        tracing::warn!(error = %err, "Failed to remove webhook before polling");
    }
    tracing::info!(timeout_secs, "Telegram long polling started");

    let mut offset: Option<i64> = None;
    loop {
        let updates = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            updates = bot.telegram().get_updates(offset, timeout_secs) => updates,
        };

        match updates {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Err(err) = bot.handle_update(&update).await {
                        tracing::error!(update_id = update.update_id, error = %err, "Failed to handle update");
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "getUpdates failed, retrying in {:?}", RETRY_DELAY);
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }
    }

    tracing::info!("Telegram long polling stopped");
}
