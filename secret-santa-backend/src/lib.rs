pub mod error;
pub mod lottery;
pub mod notify;
pub mod registration;
pub mod routes;
pub mod telemetry;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::Router;
use error::AppError;
use lottery::LotteryService;
use notify::{LogMailer, LogMessenger, Mailer, Messenger, SmtpMailer, WebhookMessenger};
use registration::RegistrationService;
use routes::gift::save_gift;
use routes::join::join;
use routes::lottery::run_lottery;
use routes::register::register;
use routes::ApiRouter;
use secret_santa_config::{Config, GiftConfig, LotteryConfig};
use secret_santa_database::{get_database_connection, run_migrations, ParticipantStore, PgStore};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone, FromRef)]
pub struct AppState {
    registration: Arc<RegistrationService>,
    lottery: Arc<LotteryService>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn ParticipantStore>,
        mailer: Arc<dyn Mailer>,
        messenger: Arc<dyn Messenger>,
        gift: GiftConfig,
        lottery: LotteryConfig,
    ) -> Self {
        Self {
            registration: Arc::new(RegistrationService::new(store.clone(), gift)),
            lottery: Arc::new(LotteryService::new(store, mailer, messenger, lottery)),
        }
    }
}

pub fn router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let app: Router<AppState> = ApiRouter::default()
        .post("/register", register)
        .post("/gift", save_gift)
        .post("/join", join)
        .post("/lottery", run_lottery)
        .into_router()
        .fallback_service(ServeDir::new(public_dir));

    // layers are in reverse order
    app.layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn mailer(config: &Config) -> Result<Arc<dyn Mailer>, AppError> {
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            warn!("no smtp server configured, emails will only be logged");
            Arc::new(LogMailer)
        }
    };
    Ok(mailer)
}

fn messenger(config: &Config) -> Arc<dyn Messenger> {
    match &config.messaging {
        Some(messaging) => Arc::new(WebhookMessenger::new(messaging)),
        None => {
            warn!("no messaging endpoint configured, messages will only be logged");
            Arc::new(LogMessenger)
        }
    }
}

pub async fn setup_server(config: &Config) -> Result<Router, AppError> {
    info!(environment = %config.environment, "starting up server...");

    let pool = get_database_connection(config.database_url()?)?;
    run_migrations(&pool).await?;

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        mailer(config)?,
        messenger(config),
        config.gift,
        config.lottery,
    );
    Ok(router(state, &config.public_dir))
}

pub async fn run_server(config: Config) -> Result<(), AppError> {
    let app = setup_server(&config).await?;

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(address).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

#[allow(clippy::redundant_pub_crate)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
