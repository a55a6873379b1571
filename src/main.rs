use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use vercul_onboarding::admin::{
    hash_password, AdminAuthService, AdminCredentialRepository, SettingsService,
};
use vercul_onboarding::config::AppConfig;
use vercul_onboarding::error::AppError;
use vercul_onboarding::http::{metrics_router, router, AppState};
use vercul_onboarding::infra::{
    InMemoryAdminCredentialRepository, InMemoryApplicationRepository,
    InMemoryPortalSettingsRepository, InMemorySmtpConfigRepository, InMemoryTemplateRepository,
    LoggingMailer,
};
use vercul_onboarding::telemetry;
use vercul_onboarding::workflows::onboarding::{NotificationDispatcher, OnboardingService};

#[derive(Parser, Debug)]
#[command(
    name = "vercul-onboarding",
    about = "Business-account onboarding portal API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let Command::Serve(args) = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));
    serve(args).await
}

async fn serve(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let applications = Arc::new(InMemoryApplicationRepository::default());
    let templates = Arc::new(InMemoryTemplateRepository::seeded());
    let smtp = Arc::new(InMemorySmtpConfigRepository::default());
    let portal_settings = Arc::new(InMemoryPortalSettingsRepository::default());
    let credentials = Arc::new(InMemoryAdminCredentialRepository::default());
    let mailer = Arc::new(LoggingMailer);

    // Bootstrap the admin account on first start only; a stored hash wins.
    if credentials.load_hash()?.is_none() {
        credentials.store_hash(&hash_password(&config.portal.bootstrap_admin_password))?;
    }

    let dispatcher = Arc::new(NotificationDispatcher::new(
        templates.clone(),
        smtp.clone(),
        mailer,
        config.portal.base_url.clone(),
    ));
    let onboarding = Arc::new(OnboardingService::new(
        applications,
        dispatcher.clone(),
        config.portal.admin_email.clone(),
    ));
    let auth = Arc::new(AdminAuthService::new(credentials));
    let settings = Arc::new(SettingsService::new(
        portal_settings,
        templates,
        smtp,
        dispatcher,
        config.portal.admin_email.clone(),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness = Arc::new(AtomicBool::new(false));
    let state = AppState {
        onboarding,
        auth,
        settings,
        readiness: readiness.clone(),
    };

    let app = router(state)
        .merge(metrics_router(Arc::new(prometheus_handle)))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);

    info!(%addr, "onboarding portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
