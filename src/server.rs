//! Reusable reservation service runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, store
//! backend and migrations, registry-backed collaborators, the REST API and
//! graceful shutdown. The CLI binary is a thin wrapper around it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::ReservationService;
use crate::config::{AppConfig, RegistryKind, StoreBackend};
use crate::domain::{ReservationRepository, ServiceRegistry};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    init_database, ConsulRegistry, HttpChargerDirectory, InMemoryReservationRepository, JwtIdentityResolver,
    SeaOrmReservationRepository, StaticRegistry, TimedReservationRepository,
};
use crate::interfaces::http::create_api_router;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running reservation service.
///
/// ```rust,no_run
/// use ev_reservations::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub service: Arc<ReservationService>,
    pub config: AppConfig,
    /// Address the API is actually bound to (port 0 resolves here).
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting EV reservation service...");

        let prometheus_handle = prometheus_handle();

        // ── Store ──────────────────────────────────────────────
        let (backend, db): (Arc<dyn ReservationRepository>, Option<DatabaseConnection>) =
            match app_cfg.database.backend {
                StoreBackend::Sql => {
                    let db_config = app_cfg.database.connection_config();
                    info!(url = %db_config.url, "Connecting to database");
                    let db = init_database(&db_config).await?;

                    if opts.auto_migrate {
                        info!("Running database migrations...");
                        Migrator::up(&db, None).await?;
                        info!("Migrations completed");
                    }
                    (Arc::new(SeaOrmReservationRepository::new(db.clone())), Some(db))
                }
                StoreBackend::Memory => {
                    warn!("Using in-memory reservation store; data is lost on restart");
                    (Arc::new(InMemoryReservationRepository::new()), None)
                }
            };

        let timeouts = app_cfg.store.timeouts();
        info!(
            single_secs = timeouts.single.as_secs(),
            listing_secs = timeouts.listing.as_secs(),
            "Store timeouts configured"
        );
        let store = Arc::new(TimedReservationRepository::new(backend, timeouts));

        // ── Registry-backed collaborators ──────────────────────
        let registry = build_registry(&app_cfg)?;
        let directory = Arc::new(HttpChargerDirectory::new(
            registry.clone(),
            app_cfg.directory.service_key.clone(),
            app_cfg.directory.timeout(),
        )?);
        let identity = Arc::new(JwtIdentityResolver::new(
            registry,
            app_cfg.security.jwt_secret_key.clone(),
        ));

        let service = Arc::new(ReservationService::new(store, directory, identity));

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(service.clone(), db.clone(), prometheus_handle);

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            service,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install SIGINT/SIGTERM listeners that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API server to stop, then release the database.
    pub async fn wait(self) {
        let Self {
            db, shutdown, api_task, ..
        } = self;

        match api_task.await {
            Ok(()) => info!("REST API server stopped"),
            Err(e) => error!("REST API server task panicked: {}", e),
        }

        let closed = shutdown
            .cleanup_within_timeout(|| async move {
                if let Some(db) = db {
                    match db.close().await {
                        Ok(()) => info!("Database connection closed"),
                        Err(e) => warn!("Error closing database connection: {}", e),
                    }
                }
            })
            .await;
        if !closed {
            warn!("Cleanup did not finish within the shutdown timeout");
        }

        info!("EV reservation service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down EV reservation service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can be installed once per process; restarts within
/// the same process reuse it. `None` when another recorder got there first.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
                None
            }
        })
        .clone()
}

fn build_registry(cfg: &AppConfig) -> Result<Arc<dyn ServiceRegistry>, Box<dyn std::error::Error>> {
    let registry: Arc<dyn ServiceRegistry> = match cfg.registry.kind {
        RegistryKind::Static => {
            info!(keys = cfg.registry.values.len(), "Using static service registry");
            Arc::new(StaticRegistry::new(cfg.registry.values.clone()))
        }
        RegistryKind::Consul => {
            info!(address = %cfg.registry.consul_address, "Using Consul service registry");
            Arc::new(ConsulRegistry::new(
                cfg.registry.consul_address.clone(),
                Duration::from_secs(cfg.registry.timeout_secs),
            )?)
        }
    };
    Ok(registry)
}

/// Install the global tracing subscriber. `RUST_LOG` overrides
/// `logging.level`. Call once, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
