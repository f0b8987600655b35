use nexus::configuration::{get_configuration, TelegramMode};
use nexus::startup::{run, Services};
use nexus::stream::CancelToken;
use nexus::telemetry::{get_subscriber, init_subscriber};
use nexus::{store, telegram};
use std::net::TcpListener;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("nexus".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration().expect("Failed to read configuration.");

    let store = store::init(&settings)
        .await
        .expect("Failed to initialize conversation store.");
    let services = Services::from_settings(&settings).expect("Failed to initialize connectors.");

    let shutdown = CancelToken::new();
    match (&settings.telegram.mode, &services.bot) {
        (TelegramMode::Polling, Some(bot)) => {
            tokio::spawn(telegram::poller::run(
                bot.clone(),
                settings.telegram.poll_timeout_secs,
                shutdown.clone(),
            ));
        }
        (TelegramMode::Polling, None) => {
            tracing::warn!("telegram.mode is polling but no bot token is configured");
        }
        (TelegramMode::Webhook, Some(_)) => {
            tracing::info!(
                "Expecting Telegram webhook deliveries at {}",
                settings
                    .telegram
                    .webhook_url()
                    .unwrap_or_else(|| "/telegram/webhook".to_string())
            );
        }
        (TelegramMode::Disabled, Some(_)) => {
            tracing::info!("telegram.mode is disabled - Telegram updates are not processed");
        }
        _ => {}
    }

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener =
        TcpListener::bind(&address).expect(&format!("failed to bind to {}", settings.app_port));

    let result = run(listener, store, services, settings).await?.await;
    shutdown.cancel();
    result
}
