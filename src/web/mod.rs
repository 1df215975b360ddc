pub mod handlers;
pub mod middleware;

use crate::{models::ModelManager, utils::error::ClassifierError, Config, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// 处理器共享状态，只读
#[derive(Clone)]
pub struct AppState {
    pub manager: ModelManager,
    pub config: Config,
}

impl AppState {
    pub fn new(manager: ModelManager, config: Config) -> Self {
        Self { manager, config }
    }
}

pub async fn serve(config: Config) -> Result<()> {
    // 启动前同步加载模型，失败时以空模型继续
    let manager = ModelManager::load(&config);
    if !manager.is_loaded() {
        tracing::warn!("Serving without a model; /predict will return 500 until restarted");
    }

    let app = create_app(AppState::new(manager, config.clone()));

    // 解析绑定地址
    let addr: SocketAddr = config.bind_addr.parse().map_err(|e| {
        ClassifierError::Config(format!("Invalid bind address {}: {}", config.bind_addr, e))
    })?;

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /        - Liveness");
    tracing::info!("  GET  /health  - Model status");
    tracing::info!("  POST /predict - Multipart image classification");

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        ClassifierError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ClassifierError::Internal(format!("Server failed to start: {}", e)))?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let max_request_size = state.config.server_config.max_request_size;

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/predict", post(handlers::predict_handler))
        // 超限在multipart读取时报错，由处理器转换为JSON错误
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(CorsLayer::permissive()) // 开发环境使用宽松CORS
        .with_state(state)
}
