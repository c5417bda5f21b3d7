use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};

use servitrak::config;
use servitrak::db;
use servitrak::routes;
use servitrak::services::{
    Notifier, RepairService, RepairStore, SmtpMailer, TrackingService, WhatsAppClient,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Starting Servitrak server on {}:{}", config.host, config.port);

    // Create database pool
    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Run migrations
    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Notification channels from startup config. A missing block leaves
    // that channel permanently unconfigured; transitions keep working and
    // every attempt through it is recorded as failed.
    if config.notify.whatsapp.is_none() {
        log::warn!("WhatsApp gateway not configured; WhatsApp notifications disabled");
    }
    if config.notify.smtp.is_none() {
        log::warn!("SMTP not configured; email notifications disabled");
    }

    let send_timeout = config.notify.send_timeout;
    let whatsapp = Arc::new(WhatsAppClient::new(config.notify.whatsapp.clone(), send_timeout));
    let mailer = Arc::new(SmtpMailer::new(config.notify.smtp.clone(), send_timeout));
    let notifier = Arc::new(Notifier::new(whatsapp, mailer));

    let store: Arc<dyn RepairStore> = Arc::new(db::PgRepairStore::new(db_pool.clone()));
    let repair_service = RepairService::new(Arc::clone(&store), notifier);
    let tracking_service = TrackingService::new(store);

    // Clone values for the closure
    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        App::new()
            // Share pool and services with all handlers
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(repair_service.clone()))
            .app_data(web::Data::new(tracking_service.clone()))
            // Middleware
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            // Health check routes
            .service(
                web::scope("/health")
                    .route("", web::get().to(routes::health::liveness))
                    .route("/ready", web::get().to(routes::health::readiness)),
            )
            // Public tracking (no auth, used by the customer-facing page)
            .configure(routes::tracking::configure)
            // Staff-facing repair routes
            .configure(routes::repairs::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
