use order_reconcile::api::{self, AppState};
use order_reconcile::config::StoreBackend;
use order_reconcile::db::ensure_schema;
use order_reconcile::{create_pool, AppConfig, DocumentStore, MemoryDocumentStore, PgDocumentStore};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式, RUST_LOG 控制级别
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 存储句柄在此创建, 之后按引用注入
    let store: Arc<dyn DocumentStore> = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database)?;
            if let Err(e) = ensure_schema(&pool).await {
                warn!("Schema bootstrap failed, store will report unavailable until the database is reachable: {}", e);
            }
            info!("Database pool created");
            Arc::new(PgDocumentStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory document store, data is lost on exit");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let state = AppState::new(
        store,
        config.maintenance.max_batch_size,
        config.maintenance.strict_availability,
    );
    let app = api::router(state).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/stats                       - aggregate supplied orders/ledger");
    info!("  GET  /api/dashboard?duration=...      - aggregate stored orders/ledger");
    info!("  GET  /api/reports/profit.csv          - per-order profit report");
    info!("  POST /api/maintenance/clear-financials - batched financial reset");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
