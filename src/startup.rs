use crate::configuration::Settings;
use crate::connectors::{self, CompletionConnector, ConnectorError, HttpPageFetcher, PageFetcher, TelegramConnector};
use crate::errors::ChatError;
use crate::routes;
use crate::store::ConversationStore;
use crate::telegram::BotService;
use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, Server, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

/// Outbound integrations, built once from `Settings` and shared by every worker.
#[derive(Clone)]
pub struct Services {
    pub llm: Arc<dyn CompletionConnector>,
    pub pages: Arc<dyn PageFetcher>,
    pub telegram: Option<Arc<dyn TelegramConnector>>,
    pub bot: Option<Arc<BotService>>,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConnectorError> {
        let llm = connectors::init_llm(&settings.llm)?;
        let pages: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(&settings.browser)?);
        let telegram = connectors::init_telegram(&settings.telegram);

        let bot = telegram.clone().map(|telegram| {
            Arc::new(BotService::new(
                telegram,
                llm.clone(),
                pages.clone(),
                settings.telegram.allowed_user_id,
            ))
        });
        if bot.is_some() && settings.telegram.allowed_user_id.is_none() {
            tracing::warn!("TELEGRAM_USER_ID is not set - the bot answers everyone");
        }

        Ok(Self {
            llm,
            pages,
            telegram,
            bot,
        })
    }
}

/// Malformed or missing JSON bodies become a 400 failure envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ChatError::ClientInput(format!("Invalid request body: {}", err)).into()
    })
}

pub async fn run(
    listener: TcpListener,
    store: Arc<dyn ConversationStore>,
    services: Services,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let static_dir = Path::new(&settings.static_dir)
        .is_dir()
        .then(|| PathBuf::from(&settings.static_dir));
    match &static_dir {
        Some(dir) => tracing::info!("Serving static assets from {}", dir.display()),
        None => tracing::warn!(
            "Static directory {} not found - UI is not served",
            settings.static_dir
        ),
    }

    let settings = web::Data::new(settings);
    let store = web::Data::new(store);
    let llm = web::Data::new(services.llm);
    let pages = web::Data::new(services.pages);
    let telegram = services.telegram.map(web::Data::new);
    let bot = services.bot.map(web::Data::new);

    let server = HttpServer::new(move || {
        let telegram = telegram.clone();
        let bot = bot.clone();
        let static_dir = static_dir.clone();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(json_config())
            .app_data(settings.clone())
            .app_data(store.clone())
            .app_data(llm.clone())
            .app_data(pages.clone())
            .configure(move |cfg| {
                if let Some(telegram) = telegram {
                    cfg.app_data(telegram);
                }
                if let Some(bot) = bot {
                    cfg.app_data(bot);
                }
            })
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/api")
                    .service(routes::chat::complete_handler)
                    .service(routes::chat::stream_handler)
                    .service(routes::browse_handler)
                    .service(
                        web::scope("/conversations")
                            .service(routes::conversation::list_handler)
                            .service(routes::conversation::create_handler)
                            .service(routes::conversation::rename_handler)
                            .service(routes::conversation::delete_handler)
                            .service(routes::conversation::list_messages_handler)
                            .service(routes::conversation::append_message_handler),
                    ),
            )
            .service(
                web::scope("/telegram")
                    .service(routes::telegram::webhook_handler)
                    .service(routes::telegram::setup_handler),
            )
            .configure(move |cfg| {
                if let Some(dir) = static_dir {
                    cfg.service(static_files(dir));
                }
            })
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Files under `dir`; unknown paths get `index.html` so client-side routes resolve.
fn static_files(dir: PathBuf) -> Files {
    let index = dir.join("index.html");
    Files::new("/", dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(index).await?;
                let res = file.into_response(&req);
                Ok(ServiceResponse::new(req, res))
            }
        }))
}
