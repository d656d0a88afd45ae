use anyhow::Result;
use tracing::error;

use download_popular_books::orchestrator::App;
use download_popular_books::utils::logging;
use download_popular_books::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let mut app = App::initialize(config).await?;

    if let Err(e) = app.run().await {
        // 顶层只报告一次，会话留给收尾逻辑处置
        error!("❌ 程序执行过程中出错: {}", e);
    }

    app.shutdown().await?;

    Ok(())
}
