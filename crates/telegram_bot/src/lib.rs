//! Telegram front end for the expense ledger.
//!
//! The bot is a thin dispatcher: every update is either a slash command
//! or an inline-keyboard callback, routed to a handler that talks to
//! the [`ledger::Ledger`] store injected at startup.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;

use ledger::Ledger;

mod callbacks;
mod handlers;
mod parsing;
mod ui;

#[derive(Clone)]
pub struct ConfigParameters {
    ledger: Arc<dyn Ledger>,
}

/// Webhook deployment parameters: where Telegram delivers updates.
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: String,
    pub port: u16,
}

pub struct Bot {
    token: String,
    ledger: Arc<dyn Ledger>,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// Long-polling mode. Updates arrive on a single ordered stream and
    /// are processed one at a time.
    pub async fn run(&self) -> Result<(), String> {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        let me = authenticate(&bot).await?;
        tracing::info!("Authorized as @{}", me.username());

        self.dispatcher(bot).dispatch().await;
        Ok(())
    }

    /// Webhook mode. Telegram pushes updates over HTTPS to the given
    /// public URL; deliveries are independent of each other.
    pub async fn run_webhook(&self, config: WebhookConfig) -> Result<(), String> {
        tracing::info!("Starting telegram bot in webhook mode...");

        let bot = teloxide::Bot::new(&self.token);
        let me = authenticate(&bot).await?;
        tracing::info!("Authorized as @{}", me.username());

        let url = config
            .url
            .parse()
            .map_err(|err| format!("invalid webhook url: {err}"))?;
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let listener = webhooks::axum(bot.clone(), webhooks::Options::new(addr, url))
            .await
            .map_err(|err| format!("failed to register webhook: {err}"))?;

        self.dispatcher(bot)
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;
        Ok(())
    }

    fn dispatcher(
        &self,
        bot: teloxide::Bot,
    ) -> Dispatcher<teloxide::Bot, teloxide::RequestError, teloxide::dispatching::DefaultKey> {
        let parameters = ConfigParameters {
            ledger: self.ledger.clone(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
    }
}

async fn authenticate(bot: &teloxide::Bot) -> Result<teloxide::types::Me, String> {
    bot.get_me()
        .await
        .map_err(|err| format!("telegram authentication failed: {err}"))
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    ledger: Option<Arc<dyn Ledger>>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn Ledger>) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("bot token is empty".to_string());
        }
        let ledger = self
            .ledger
            .ok_or_else(|| "an expense store is required".to_string())?;

        Ok(Bot {
            token: self.token,
            ledger,
        })
    }
}
