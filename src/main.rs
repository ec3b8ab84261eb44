use axum::{middleware::from_fn, Router};
use ecolink_core::core::config::Config;
use ecolink_core::core::openapi::{ApiDoc, SwaggerInfoModifier};
use ecolink_core::core::{database, middleware};
use ecolink_core::features::auth::{routes as auth_routes, AuthService};
use ecolink_core::features::dashboard::{routes as dashboard_routes, DashboardService};
use ecolink_core::features::geocoding::routes as geocoding_routes;
use ecolink_core::features::incidents::services::EvidenceService;
use ecolink_core::features::incidents::{
    routes as incidents_routes, PgIncidentRepository, SubmissionService,
};
use ecolink_core::modules::geocoding::{Geocoder, NominatimClient};
use ecolink_core::modules::storage::{EvidenceStorage, LocalEvidenceStorage, PUBLIC_PREFIX};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Evidence storage
    let local_storage = LocalEvidenceStorage::new(config.upload.upload_dir.clone());
    local_storage
        .ensure_root()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare upload directory: {}", e))?;
    tracing::info!(
        "Evidence storage ready at {}",
        local_storage.root().display()
    );
    let upload_root = local_storage.root().to_path_buf();
    let storage: Arc<dyn EvidenceStorage> = Arc::new(local_storage);

    // Report submission
    let repository = Arc::new(PgIncidentRepository::new(pool.clone()));
    let evidence_service = EvidenceService::new(
        storage,
        config.upload.max_file_size,
        config.upload.max_files,
    );
    let submission_service = Arc::new(SubmissionService::new(repository, evidence_service));
    tracing::info!(
        "Submission service initialized (max_file_size={}, max_files={})",
        config.upload.max_file_size,
        config.upload.max_files
    );

    let auth_service = Arc::new(AuthService::new(pool.clone(), config.auth.session_ttl));
    tracing::info!("Auth service initialized");

    let dashboard_service = Arc::new(DashboardService::new(pool.clone()));
    tracing::info!("Dashboard service initialized");

    let geocoder: Arc<dyn Geocoder> = Arc::new(
        NominatimClient::new(&config.geocoding)
            .map_err(|e| anyhow::anyhow!("Failed to initialize geocoder: {}", e))?,
    );
    tracing::info!("Geocoder initialized ({})", config.geocoding.base_url);

    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Every API route sees the session middleware; extractors decide access
    let api_routes = Router::new()
        .merge(auth_routes::routes(Arc::clone(&auth_service)))
        .merge(incidents_routes(
            submission_service,
            config.app.max_request_body_size,
        ))
        .merge(geocoding_routes(geocoder))
        .merge(dashboard_routes(dashboard_service))
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            middleware::session_middleware,
        ));

    let uploads = Router::new().nest_service(&format!("/{}", PUBLIC_PREFIX), ServeDir::new(upload_root));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(uploads)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(config.app.listen_backlog)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
