use anyhow::Context;
use sakaisync_lib::logging::init_logging;
use sakaisync_lib::{AppConfig, SyncEngine, WebDavConnector, CONFIG_FILE_NAME};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(Path::new(CONFIG_FILE_NAME))
        .with_context(|| format!("加载 {} 失败", CONFIG_FILE_NAME))?;

    // 初始化日志系统，guard 持有到进程结束
    let _log_guard = init_logging(&config.log);

    info!("服务器: {}, 用户: {}", config.server, config.username);

    let connector = Arc::new(WebDavConnector::new(&config.server));
    let engine = SyncEngine::new(connector, config.credentials());
    let report = engine.run(&config.resources).await?;

    info!(
        "同步完成: {} 个映射, 远程 {} 个文件, 本地 {} 个文件, 下载 {} 个 ({} 字节), 耗时 {:.1}s",
        report.mappings,
        report.remote_files,
        report.local_files,
        report.items,
        report.bytes_transferred,
        report.duration.as_secs_f64()
    );
    Ok(())
}
