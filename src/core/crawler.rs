use crate::core::model::{has_dot_segment, remote_to_relative, RemoteFileDescriptor, ResourceMapping};
use crate::error::{Result, SyncError};
use crate::storage::RemoteTree;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// 广度优先遍历远程目录，返回所有未被排除的文件
///
/// 排除规则在区分文件和目录之前检查，被排除的目录不会入队。
/// 任何一次列表请求失败都会让整个爬取失败。
pub async fn crawl(
    remote: &dyn RemoteTree,
    mapping: &ResourceMapping,
) -> Result<Vec<RemoteFileDescriptor>> {
    let root = mapping.remote_root();
    info!("开始爬取远程目录: {}{}", remote.name(), root);

    let mut files = Vec::new();
    let mut queue = VecDeque::from([root.clone()]);
    let mut excluded_count = 0;

    while let Some(dir) = queue.pop_front() {
        let entries = remote.list_children(&dir).await?;
        debug!("{}: {} 个条目", dir, entries.len());

        for entry in entries {
            let path = urlencoding::decode(&entry.href)
                .map_err(|e| SyncError::list(&dir, format!("无法解码 {}: {}", entry.href, e)))?;

            // 跳过目录自身
            if path.trim_end_matches('/') == dir.trim_end_matches('/') {
                continue;
            }

            let Some(relative) = path.strip_prefix(root.as_str()) else {
                warn!("条目不在远程根目录下，跳过: {}", path);
                continue;
            };

            // 解码后的 `.`/`..` 段会让目标路径逃出本地根目录
            if has_dot_segment(relative) {
                warn!("条目包含 . 或 .. 路径段，跳过: {}", path);
                continue;
            }

            if mapping.is_excluded(relative) {
                debug!("排除: {}", relative);
                excluded_count += 1;
                continue;
            }

            if entry.is_collection {
                let mut child = path.into_owned();
                if !child.ends_with('/') {
                    child.push('/');
                }
                queue.push_back(child);
            } else {
                files.push(RemoteFileDescriptor {
                    relative_path: remote_to_relative(relative),
                    uri: path.into_owned(),
                    last_modified: entry.last_modified.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                });
            }
        }
    }

    info!(
        "爬取完成: {} 个文件, {} 个被排除",
        files.len(),
        excluded_count
    );
    Ok(files)
}
