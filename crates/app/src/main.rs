use std::sync::Arc;
use std::time::Duration;

use ledger::{ConnectOptions, LedgerStore};
use telegram_bot::WebhookConfig;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "money_savior={level},telegram_bot={level},ledger={level}",
            level = settings.log_level
        ))
        .init();

    // The webhook deployment handles invocations independently and puts
    // a hard deadline on every store call; long polling does not.
    let operation_deadline = settings.webhook.as_ref().map(|_| Duration::from_secs(10));
    let store = LedgerStore::connect(
        &settings.table_name,
        ConnectOptions { operation_deadline },
    )
    .await?;

    let bot = telegram_bot::Bot::builder()
        .token(&settings.telegram_bot_token)
        .ledger(Arc::new(store))
        .build()?;

    let result = match settings.webhook {
        Some(webhook) => {
            bot.run_webhook(WebhookConfig {
                url: webhook.url,
                port: webhook.port,
            })
            .await
        }
        None => bot.run().await,
    };

    if let Err(err) = result {
        tracing::error!("telegram bot failed: {err}");
        return Err(err.into());
    }

    Ok(())
}
