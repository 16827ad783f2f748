//! 单个文件的下载

use crate::core::model::SyncItem;
use crate::error::{Result, SyncError};
use crate::storage::RemoteTree;
use futures::StreamExt;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 下载远程文件并写入目标路径，返回写入的字节数
///
/// 目标文件被截断后覆盖写入，不使用临时文件，中途失败会留下不完整的文件。
pub async fn fetch(remote: &dyn RemoteTree, item: &SyncItem) -> Result<u64> {
    let mut stream = remote.open_read(&item.source_uri).await?;

    if let Some(parent) = item.destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::filesystem(parent, e))?;
        }
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&item.destination)
        .await
        .map_err(|e| SyncError::filesystem(&item.destination, e))?;

    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| SyncError::fetch(&item.source_uri, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| SyncError::filesystem(&item.destination, e))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| SyncError::filesystem(&item.destination, e))?;

    debug!("写入完成: {} ({} 字节)", item.destination.display(), written);
    Ok(written)
}
