use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use aggregator_service::db::SyncMetadataRepository;
use aggregator_service::handlers::{self, AppState};
use aggregator_service::notifier::CapashinoClient;
use aggregator_service::outbox::CapashinoOutboxNotifier;
use aggregator_service::provider::ProviderClient;
use aggregator_service::seats::SeatsCache;
use aggregator_service::sync::SyncScheduler;
use aggregator_service::Config;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transactional_outbox::{OutboxWorker, SqlxOutboxRepository};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    }
}

/// Event-Ticketing Aggregator
///
/// Mirrors a catalogue of events and venues from an upstream provider,
/// serves paginated catalogue queries, and brokers ticket
/// registration/cancellation with exactly-once client semantics and
/// at-least-once downstream notification.
#[actix_web::main]
async fn main() -> io::Result<()> {
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" || cmd == "healthcheck-http" {
                let url = "http://127.0.0.1:8080/api/health";
                match reqwest::Client::new().get(url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {}", e);
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"));
                    }
                }
            }
        }
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},actix_web=info,sqlx=warn", config.app.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting aggregator-service v{}", env!("CARGO_PKG_VERSION"));

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("database pool creation failed: {:#}", e);
            eprintln!("ERROR: failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("migration failed: {:#}", e);
        eprintln!("ERROR: failed to run migrations: {}", e);
        std::process::exit(1);
    }

    // Recover a sync lock left `in_progress` by a previous process crash.
    if let Err(e) = SyncMetadataRepository::force_reset(&pool).await {
        tracing::warn!("startup sync lock recovery check failed: {:#}", e);
    }

    let provider = Arc::new(ProviderClient::new(
        config.provider.base_url.clone(),
        &config.provider.api_key,
        config.provider.max_retries,
        config.provider.backoff_factor,
    ));
    let seats_cache = SeatsCache::new();
    let outbox_repo = Arc::new(SqlxOutboxRepository::new(pool.clone()));
    let notifier = Arc::new(CapashinoOutboxNotifier::new(CapashinoClient::new(
        config.notifier.base_url.clone(),
    )));

    let outbox_worker = Arc::new(
        OutboxWorker::new(
            outbox_repo.clone(),
            notifier,
            config.outbox.batch_size,
            Duration::from_secs(config.outbox.poll_interval_secs),
            config.outbox.max_retries,
            config.outbox.days_to_keep,
        )
        .with_metrics(transactional_outbox::metrics::OutboxMetrics::new("aggregator-service")),
    );

    let app_state = web::Data::new(AppState {
        pool: pool.clone(),
        provider: provider.clone(),
        seats_cache: seats_cache.clone(),
        outbox_repo: outbox_repo.clone(),
        config: config.clone(),
    });

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("binding HTTP server at {}", bind_address);

    let cors_origins = config.app.cors_allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(aggregator_service::metrics::serve_metrics))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health_summary))
                    .route("/health/ready", web::get().to(handlers::health_ready))
                    .route("/health/live", web::get().to(handlers::health_live))
                    .route("/sync/trigger", web::post().to(handlers::trigger_sync))
                    .service(
                        web::scope("/events")
                            .route("/", web::get().to(handlers::list_events))
                            .route("/{id}", web::get().to(handlers::get_event))
                            .route("/{id}/seats", web::get().to(handlers::get_event_seats)),
                    )
                    .service(
                        web::scope("/tickets")
                            .route("", web::post().to(handlers::create_ticket_handler))
                            .route("/{id}", web::delete().to(handlers::cancel_ticket_handler)),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run();

    let server_handle = server.handle();
    let (shutdown_tx, _) = broadcast::channel(1);

    let mut tasks: JoinSet<io::Result<()>> = JoinSet::new();

    tasks.spawn(async move {
        tracing::info!("HTTP server is running");
        server.await
    });

    let worker_for_spawn = outbox_worker.clone();
    let mut outbox_shutdown = shutdown_tx.subscribe();
    tasks.spawn(async move {
        tracing::info!("outbox worker is running");
        tokio::select! {
            _ = worker_for_spawn.start() => {}
            _ = outbox_shutdown.recv() => {
                worker_for_spawn.stop();
            }
        }
        Ok(())
    });

    let scheduler = SyncScheduler::new(
        pool.clone(),
        provider.clone(),
        Duration::from_secs(config.app.sync_interval_secs),
    );
    let mut scheduler_shutdown = shutdown_tx.subscribe();
    tasks.spawn(async move {
        tracing::info!("sync scheduler is running");
        tokio::select! {
            _ = scheduler.run() => {}
            _ = scheduler_shutdown.recv() => {}
        }
        Ok(())
    });

    let mut first_error: Option<io::Error> = None;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = tasks.join_next() => {
                match result {
                    Some(Ok(Ok(_))) => {
                        tracing::info!("background task completed");
                    }
                    Some(Ok(Err(e))) => {
                        tracing::error!("task returned error: {}", e);
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                        let _ = shutdown_tx.send(());
                        server_handle.stop(true).await;
                        tasks.shutdown().await;
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!("task join error: {}", e);
                        if first_error.is_none() {
                            first_error = Some(io::Error::new(io::ErrorKind::Other, e.to_string()));
                        }
                        let _ = shutdown_tx.send(());
                        server_handle.stop(true).await;
                        tasks.shutdown().await;
                        break;
                    }
                    None => break,
                }
            }
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received");
                let _ = shutdown_tx.send(());
                server_handle.stop(true).await;
                tasks.shutdown().await;
                break;
            }
        }
    }

    tracing::info!("aggregator-service shutting down");

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
