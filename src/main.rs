//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run server or UI.
//! No business logic here.

use doc_scanner::adapters::capture::DemoCapture;
use doc_scanner::adapters::dispatch::HttpDispatchClient;
use doc_scanner::adapters::http::{self, AppState};
use doc_scanner::adapters::mail::SmtpTransportFactory;
use doc_scanner::adapters::processing::FixedDelayProcessor;
use doc_scanner::adapters::ui::tui::TuiInputPort;
use doc_scanner::ports::{InputPort, MailSettingsPort, MailTransportFactory};
use doc_scanner::shared::config::{AppConfig, EnvMailSettings};
use doc_scanner::usecases::{CaptureSession, DispatchService};
use dotenv::dotenv;
use inquire::Select;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const MENU_SCAN: &str = "Scan documents";
const MENU_SERVE: &str = "Start dispatch server";
const MENU_EXIT: &str = "Exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config could not be loaded, using defaults");
        AppConfig::default()
    });

    // --- Headless server: `doc-scanner serve` ---
    if std::env::args().nth(1).as_deref() == Some("serve") {
        return run_server(&cfg).await;
    }

    doc_scanner::adapters::ui::init_ui();

    let choice = Select::new("What do you want to do?", vec![MENU_SCAN, MENU_SERVE, MENU_EXIT])
        .prompt()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    match choice {
        MENU_SCAN => run_scanner(&cfg).await,
        MENU_SERVE => run_server(&cfg).await,
        _ => Ok(()),
    }
}

/// Dispatch server: env-backed SMTP settings read per request, fresh lettre session per request.
async fn run_server(cfg: &AppConfig) -> anyhow::Result<()> {
    let settings: Arc<dyn MailSettingsPort> = Arc::new(EnvMailSettings::new());
    match settings.mail_settings() {
        Ok(s) => info!(host = %s.host, port = s.port, secure = s.secure(), "SMTP configured"),
        Err(e) => warn!(error = %e, "SMTP settings incomplete; dispatches will fail until fixed"),
    }
    let transports: Arc<dyn MailTransportFactory> = Arc::new(SmtpTransportFactory::new());
    let dispatch = Arc::new(DispatchService::new(settings, transports));

    let listen_addr = cfg.listen_addr_or_default();
    http::serve(&listen_addr, AppState { dispatch })
        .await
        .map_err(|e| anyhow::anyhow!("server on {} failed: {}", listen_addr, e))
}

/// Interactive scanner: demo camera, fixed-delay processing, HTTP dispatch to the configured server.
async fn run_scanner(cfg: &AppConfig) -> anyhow::Result<()> {
    let dispatch_url = cfg.dispatch_url_or_default();
    let delay_ms = cfg.processing_delay_ms_or_default();
    info!(url = %dispatch_url, processing_delay_ms = delay_ms, "scanner session started");

    let session = Arc::new(CaptureSession::new(
        Arc::new(DemoCapture::new()),
        Arc::new(FixedDelayProcessor::from_millis(delay_ms)),
        Arc::new(HttpDispatchClient::new(dispatch_url)),
    ));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(session));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
