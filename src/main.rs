use axum::{
    routing::{get, post, put},
    Router,
};
use firstaid_inventory_rust::{api, create_pool, AppConfig, InventoryService, PgInventoryStore};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database.url).await?;
    info!("Database pool created");

    // 创建存储与看板服务
    let store = Arc::new(PgInventoryStore::new(pool));
    let service = Arc::new(InventoryService::new(store));

    // 启动时加载一次库存; 失败不阻断启动, 可通过 reload 重试
    match service.load().await {
        Ok(count) => info!("加载巡检记录 {} 条", count),
        Err(e) => warn!("初始加载失败: {}", e),
    }

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/inspections", get(api::list_inspections))
        .route("/api/inspections/reload", post(api::reload_inspections))
        .route(
            "/api/inspections/:inspection_id/request-amount",
            put(api::set_request_amount),
        )
        .route("/api/editor", get(api::editor_state))
        .route("/api/editor/select", post(api::select_record))
        .route("/api/editor/working", put(api::update_working))
        .route("/api/editor/save", post(api::save_edit))
        .route("/api/editor/cancel", post(api::cancel_edit))
        .route("/api/editor/close", post(api::close_edit))
        .route("/api/requests/preview", post(api::preview_request))
        .route("/api/requests/submit", post(api::submit_request))
        .with_state(service)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/inspections             - 列表/搜索");
    info!("  PUT  /api/inspections/:id/request-amount - 行内请领数量");
    info!("  POST /api/requests/preview        - Phase 1 预览");
    info!("  POST /api/requests/submit         - Phase 2 提交");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
