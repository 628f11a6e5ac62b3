use product_catalog::{
    build_app,
    config::load_config,
    infrastructure::{connect_store, logger::init_logging},
    ProductRepository,
};
use tokio::{net::TcpListener, signal};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    config.validate()?;

    let _guard = init_logging(&config.logging)?;
    info!("启动产品目录服务...");

    let repository = ProductRepository::new(connect_store(&config.storage).await?);
    info!("存储后端: {}", repository.backend());

    let app = build_app(repository);

    let addr = config.http.listen_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 产品服务运行在 http://{}", addr);
    info!("📖 API 端点:");
    info!("   GET    /api/products      - 获取所有产品");
    info!("   POST   /api/products      - 创建产品");
    info!("   GET    /api/products/:id  - 获取特定产品");
    info!("   PUT    /api/products/:id  - 更新产品");
    info!("   DELETE /api/products/:id  - 删除产品");
    info!("   GET    /health            - 健康检查");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("监听 Ctrl+C 失败: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("监听 SIGTERM 失败: {}", e);
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

    info!("收到停止信号，正在关闭...");
}
