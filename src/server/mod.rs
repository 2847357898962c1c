use crate::{
    auth::{JwtService, JwtServiceImpl, admin_middleware},
    config::Config,
    database::{DatabaseManager, DatabaseManagerImpl, dao::UsageLogDraft},
    error::AppError,
    jobs::{JobScheduler, StatisticsJob},
    mcp::service::{scoped_mcp_handler, unscoped_mcp_handler},
    routes::{admin, health, providers},
    shutdown::ShutdownCoordinator,
    summarizer::SearchSummarizer,
    usage::{UsageRecorder, mcp_usage_middleware, spawn_usage_writer},
};
use axum::{
    Router,
    middleware,
    routing::{any, get, put},
};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info};

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub jwt_service: Arc<dyn JwtService>,
    pub database: Arc<dyn DatabaseManager>,
    pub summarizer: Arc<SearchSummarizer>,
    pub usage_recorder: UsageRecorder,
    pub session_manager: Arc<LocalSessionManager>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
    // Consumed once by run(); clones share the same slot.
    usage_rx: Arc<Mutex<Option<mpsc::Receiver<UsageLogDraft>>>>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let jwt_service: Arc<dyn JwtService> =
            Arc::new(JwtServiceImpl::new(&config.jwt.secret));

        let database_impl = Arc::new(
            DatabaseManagerImpl::new_from_config(&config)
                .await
                .map_err(AppError::Database)?,
        );
        let database: Arc<dyn DatabaseManager> = database_impl;

        let (usage_recorder, usage_rx) = UsageRecorder::channel(config.mcp.usage_queue_size);

        Ok(Self {
            config: Arc::new(config),
            jwt_service,
            database,
            summarizer: Arc::new(SearchSummarizer::new()),
            usage_recorder,
            session_manager: Arc::new(LocalSessionManager::default()),
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
            usage_rx: Arc::new(Mutex::new(Some(usage_rx))),
        })
    }

    /// Test constructor that reuses an already-connected database.
    pub fn with_database(config: Config, database: Arc<dyn DatabaseManager>) -> Self {
        let jwt_service: Arc<dyn JwtService> =
            Arc::new(JwtServiceImpl::new(&config.jwt.secret));
        let (usage_recorder, usage_rx) = UsageRecorder::channel(config.mcp.usage_queue_size);

        Self {
            config: Arc::new(config),
            jwt_service,
            database,
            summarizer: Arc::new(SearchSummarizer::new()),
            usage_recorder,
            session_manager: Arc::new(LocalSessionManager::default()),
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
            usage_rx: Arc::new(Mutex::new(Some(usage_rx))),
        }
    }

    /// Take the usage log receiver. Returns `None` after the first call.
    pub async fn take_usage_rx(&self) -> Option<mpsc::Receiver<UsageLogDraft>> {
        self.usage_rx.lock().await.take()
    }

    pub async fn run(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        self.database.migrate().await.map_err(AppError::Database)?;

        // Usage log writer
        let usage_writer = match self.take_usage_rx().await {
            Some(rx) => Some(spawn_usage_writer(
                self.database.clone(),
                rx,
                self.shutdown_coordinator.subscribe(),
            )),
            None => None,
        };

        // Background jobs
        let mut scheduler = JobScheduler::with_shutdown_coordinator(
            self.config.jobs.clone(),
            self.shutdown_coordinator.subscribe(),
        );
        scheduler
            .start(vec![Arc::new(StatisticsJob::new(self.database.clone()))])
            .await?;

        let app = self.create_app();

        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid listen address: {}", e)))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to address: {}", e)))?;

        info!("Server listening on http://{}", addr);

        let shutdown_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            shutdown_coordinator.wait_for_shutdown_signal().await;
        });

        let mut shutdown_rx = self.shutdown_coordinator.subscribe();
        let serve_future = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            info!("Graceful shutdown initiated");
        });

        if let Err(e) = serve_future.await {
            error!("Server error: {}", e);
        }

        scheduler.stop().await;
        if let Some(handle) = usage_writer {
            if let Err(e) = handle.await {
                error!("Usage writer failed during shutdown: {}", e);
            }
        }

        info!("Server shutdown complete");
        Ok(())
    }

    // Creates an application router
    pub fn create_app(&self) -> Router {
        Router::new()
            .route("/health", get(health::health_check))
            .route("/api/mcp-providers", get(providers::list_public_providers))
            .nest(&self.config.mcp.path_prefix, self.mcp_routes())
            .nest("/api/admin", self.admin_api_routes())
            .with_state(self.clone())
    }

    /// MCP transport routes with usage accounting layered on top.
    fn mcp_routes(&self) -> Router<Server> {
        Router::new()
            .route("/", any(unscoped_mcp_handler))
            .route("/{owner}/{repo}", any(scoped_mcp_handler))
            .layer(middleware::from_fn_with_state(
                self.clone(),
                mcp_usage_middleware,
            ))
    }

    fn admin_api_routes(&self) -> Router<Server> {
        Router::new()
            .route(
                "/mcp-providers",
                get(admin::list_providers).post(admin::create_provider),
            )
            .route("/mcp-providers/usage-logs", get(admin::list_usage_logs))
            .route("/mcp-providers/statistics", get(admin::usage_statistics))
            .route(
                "/mcp-providers/{id}",
                put(admin::update_provider).delete(admin::delete_provider),
            )
            .layer(middleware::from_fn_with_state(
                self.clone(),
                admin_middleware,
            ))
    }
}
